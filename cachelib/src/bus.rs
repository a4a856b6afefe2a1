use std::collections::VecDeque;
use log::trace;
use crate::monitor::BusStats;

/// What a bus transfer moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// A block read from memory into a cache on a miss
    Fetch,
    /// A dirty block written back to memory on eviction
    Writeback,
}

/// A transfer waiting for, or occupying, the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRequest {
    /// The core whose cache issued the request, and which is notified on completion
    pub requester: usize,
    pub bytes: u64,
    pub kind: TransferKind,
}

/// A shared, non-pipelined memory bus
///
/// Requests are serviced strictly in the order they arrive and only one is in flight at a time,
/// taking a fixed number of cycles. The front of the queue is the in-flight request whenever
/// `completes_at` is set
#[derive(Debug)]
pub struct Bus {
    latency: u64,
    queue: VecDeque<MemoryRequest>,
    completes_at: Option<u64>,
    stats: BusStats,
}

impl Bus {
    pub fn new(latency: u64) -> Self {
        Self {
            latency,
            queue: VecDeque::new(),
            completes_at: None,
            stats: BusStats::default(),
        }
    }

    /// Queues a transfer. If the bus is idle it starts immediately and completes `latency` cycles
    /// after `current_cycle`
    pub fn request(&mut self, requester: usize, bytes: u64, kind: TransferKind, current_cycle: u64) {
        self.stats.traffic_bytes += bytes;
        match kind {
            TransferKind::Fetch => self.stats.fetches += 1,
            TransferKind::Writeback => self.stats.writebacks += 1,
        }
        self.queue.push_back(MemoryRequest { requester, bytes, kind });
        if self.completes_at.is_none() {
            self.start_next(current_cycle);
        }
    }

    /// Advances the bus to `current_cycle`. Must be called once per cycle before any core steps
    ///
    /// Returns the request which completed this cycle, if any, so its requester can be notified. The
    /// next queued request, if there is one, is started straight away
    pub fn advance(&mut self, current_cycle: u64) -> Option<MemoryRequest> {
        if self.completes_at != Some(current_cycle) {
            return None;
        }
        self.completes_at = None;
        let finished = self.queue.pop_front();
        if let Some(request) = &finished {
            trace!("bus: {:?} for core {} completed at cycle {current_cycle}", request.kind, request.requester);
        }
        if !self.queue.is_empty() {
            self.start_next(current_cycle);
        }
        finished
    }

    fn start_next(&mut self, current_cycle: u64) {
        let deadline = current_cycle.saturating_add(self.latency);
        if let Some(request) = self.queue.front() {
            trace!("bus: {:?} for core {} in flight until cycle {deadline}", request.kind, request.requester);
        }
        self.completes_at = Some(deadline);
    }

    /// Whether a transfer is occupying the bus
    pub fn is_busy(&self) -> bool {
        self.completes_at.is_some()
    }

    /// The cycle the in-flight transfer completes on
    pub fn completes_at(&self) -> Option<u64> {
        self.completes_at
    }

    /// Number of requests queued, including the one in flight
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> &BusStats {
        &self.stats
    }
}
