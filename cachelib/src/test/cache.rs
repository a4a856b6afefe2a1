use crate::cache::{AccessOutcome, Cache, CacheGeometry};
use crate::error::ConfigError;

const MISS: AccessOutcome = AccessOutcome { hit: false, evicted_dirty: false };
const HIT: AccessOutcome = AccessOutcome { hit: true, evicted_dirty: false };
const DIRTY_MISS: AccessOutcome = AccessOutcome { hit: false, evicted_dirty: true };

fn cache(cache_size: u64, associativity: u64, block_size: u64) -> Cache {
    Cache::new(0, CacheGeometry::new(cache_size, associativity, block_size).unwrap())
}

#[test]
fn decomposes_addresses() {
    let geometry = CacheGeometry::new(4096, 2, 32).unwrap();
    assert_eq!(geometry.num_sets(), 64);
    let parts = geometry.decompose(0x817ae8);
    assert_eq!(parts.tag, 0x102f);
    assert_eq!(parts.index, 0x17);
    assert_eq!(parts.offset, 0x8);
}

#[test]
fn decomposes_without_powers_of_two() {
    let geometry = CacheGeometry::new(96, 1, 32).unwrap();
    assert_eq!(geometry.num_sets(), 3);
    let parts = geometry.decompose(0x60);
    assert_eq!((parts.tag, parts.index, parts.offset), (1, 0, 0));
    let parts = geometry.decompose(0x45);
    assert_eq!((parts.tag, parts.index, parts.offset), (0, 2, 5));
}

#[test]
fn rejects_bad_geometry() {
    assert_eq!(CacheGeometry::new(4096, 2, 0), Err(ConfigError::ZeroBlockSize));
    assert_eq!(CacheGeometry::new(4096, 0, 32), Err(ConfigError::ZeroAssociativity));
    assert_eq!(CacheGeometry::new(0, 2, 32), Err(ConfigError::ZeroCacheSize));
    assert_eq!(
        CacheGeometry::new(100, 2, 32),
        Err(ConfigError::IndivisibleCacheSize { cache_size: 100, block_size: 32, associativity: 2 })
    );
    // Smaller than a single set would leave zero sets
    assert!(matches!(CacheGeometry::new(32, 2, 32), Err(ConfigError::IndivisibleCacheSize { .. })));
}

#[test]
fn load_hit_and_conflict_miss() {
    let mut cache = cache(32, 1, 32);
    assert_eq!(cache.load(0x0), MISS);
    assert_eq!(cache.load(0x0), HIT);
    assert_eq!(cache.load(0x20), MISS);
    assert!(!cache.contains(0x0));
    assert!(cache.contains(0x20));
}

#[test]
fn dirty_block_reported_on_eviction() {
    let mut cache = cache(32, 1, 32);
    assert_eq!(cache.store(0x0), MISS);
    assert!(cache.is_dirty(0x0));
    assert_eq!(cache.load(0x20), DIRTY_MISS);
    // The block that replaced it is clean
    assert_eq!(cache.load(0x0), MISS);
}

#[test]
fn two_ways_keep_both_blocks() {
    let mut cache = cache(64, 2, 32);
    assert_eq!(cache.load(0x0), MISS);
    assert_eq!(cache.load(0x20), MISS);
    assert_eq!(cache.load(0x0), HIT);
    assert_eq!(cache.set(0).unwrap().len(), 2);
}

#[test]
fn evicts_least_recently_used() {
    let mut cache = cache(64, 2, 32);
    cache.load(0x0);
    cache.load(0x20);
    // 0x0 is now the most recently used
    cache.load(0x0);
    assert_eq!(cache.load(0x40), MISS);
    assert!(cache.contains(0x0));
    assert!(!cache.contains(0x20));
    assert!(cache.contains(0x40));
    assert!(cache.set(0).unwrap().blocks().iter().all(|block| !block.dirty));
    // And now 0x0 is the oldest
    cache.load(0x20);
    assert!(!cache.contains(0x0));
}

#[test]
fn store_hit_marks_dirty() {
    let mut cache = cache(64, 2, 32);
    cache.load(0x4);
    assert!(!cache.is_dirty(0x0));
    assert_eq!(cache.store(0x1c), HIT);
    assert!(cache.is_dirty(0x0));
}

#[test]
fn writeback_only_after_store_since_fill() {
    let mut cache = cache(32, 1, 32);
    cache.store(0x0);
    assert_eq!(cache.load(0x20), DIRTY_MISS);
    // Refilled clean, the old dirty bit doesn't carry over
    cache.load(0x0);
    assert_eq!(cache.load(0x20), MISS);
}

#[test]
fn mark_dirty_ignores_absent_blocks() {
    let mut cache = cache(64, 2, 32);
    cache.mark_dirty(0x100);
    assert!(!cache.contains(0x100));
    assert!(!cache.is_dirty(0x100));
    assert_eq!(cache.resident_blocks(), 0);
}

#[test]
fn direct_mapped_alternating_always_misses() {
    let mut cache = cache(64, 1, 32);
    // Blocks 0 and 2 both land in set 0 of 2
    for _ in 0..10 {
        assert!(!cache.load(0x0).hit);
        assert!(!cache.load(0x40).hit);
    }
    assert_eq!(cache.set(1).unwrap().len(), 0);
}

#[test]
fn enough_ways_means_no_evictions() {
    let mut cache = cache(128, 4, 32);
    let addresses = [0x0, 0x20, 0x40, 0x60];
    let mut misses = 0;
    for _ in 0..5 {
        for address in addresses {
            let outcome = cache.store(address);
            assert!(!outcome.evicted_dirty);
            if !outcome.hit {
                misses += 1;
            }
        }
    }
    assert_eq!(misses, addresses.len());
}

#[test]
fn sets_never_exceed_associativity() {
    let mut cache = cache(4096, 2, 32);
    let mut address: u64 = 12345;
    for i in 0..10_000u64 {
        address = address.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let target = (address >> 33) % 0x10000;
        if i % 3 == 0 {
            cache.store(target);
        } else {
            cache.load(target);
        }
    }
    for index in 0..cache.geometry().num_sets() {
        assert!(cache.set(index).unwrap().len() <= 2);
    }
    assert!(cache.resident_blocks() <= 128);
}

#[test]
fn wide_sets_fill_on_demand() {
    // One set with 2^57 ways, far more than could ever be reserved up front
    let mut cache = cache(1 << 62, 1 << 57, 32);
    assert_eq!(cache.geometry().num_sets(), 1);
    assert_eq!(cache.load(0x0), MISS);
    assert_eq!(cache.load(0x20), MISS);
    assert_eq!(cache.load(0x0), HIT);
    assert_eq!(cache.resident_blocks(), 2);
}
