use crate::bus::{Bus, TransferKind};

#[test]
fn idle_bus_starts_request_immediately() {
    let mut bus = Bus::new(100);
    assert!(!bus.is_busy());
    bus.request(0, 32, TransferKind::Fetch, 5);
    assert_eq!(bus.completes_at(), Some(105));
    assert_eq!(bus.advance(104), None);
    let done = bus.advance(105).unwrap();
    assert_eq!(done.requester, 0);
    assert_eq!(done.kind, TransferKind::Fetch);
    assert!(!bus.is_busy());
    assert_eq!(bus.pending(), 0);
}

#[test]
fn requests_complete_in_order() {
    let mut bus = Bus::new(100);
    bus.request(0, 32, TransferKind::Writeback, 1);
    bus.request(1, 32, TransferKind::Fetch, 1);
    bus.request(2, 32, TransferKind::Fetch, 50);
    // Queued requests don't move the in-flight deadline
    assert_eq!(bus.completes_at(), Some(101));
    assert_eq!(bus.pending(), 3);

    assert_eq!(bus.advance(101).map(|r| r.requester), Some(0));
    assert_eq!(bus.completes_at(), Some(201));
    assert_eq!(bus.advance(200), None);
    assert_eq!(bus.advance(201).map(|r| r.requester), Some(1));
    assert_eq!(bus.advance(301).map(|r| r.requester), Some(2));
    assert!(!bus.is_busy());
}

#[test]
fn counts_traffic() {
    let mut bus = Bus::new(10);
    bus.request(0, 64, TransferKind::Writeback, 1);
    bus.request(0, 64, TransferKind::Fetch, 1);
    let stats = bus.stats();
    assert_eq!(stats.traffic_bytes, 128);
    assert_eq!(stats.writebacks, 1);
    assert_eq!(stats.fetches, 1);
    assert_eq!(stats.invalidations, 0);
}

#[test]
fn deadline_saturates() {
    let mut bus = Bus::new(u64::MAX);
    bus.request(0, 32, TransferKind::Fetch, 1);
    assert_eq!(bus.completes_at(), Some(u64::MAX));
    assert_eq!(bus.advance(2), None);
    assert!(bus.is_busy());
}
