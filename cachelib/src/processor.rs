use std::collections::VecDeque;
use log::trace;
use crate::bus::Bus;
use crate::cache::Cache;
use crate::monitor::CoreStats;
use crate::trace::Instruction;

/// What a core reports back to the scheduler after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreStatus {
    Running,
    Done,
}

/// A processor replaying one trace against its private cache
///
/// Each cycle the core is in one of four states, checked in this order: computing until
/// `blocked_until`, waiting for its cache to settle a miss, ready to issue, or done once the trace
/// runs out
#[derive(Debug)]
pub struct Core {
    id: usize,
    cache: Cache,
    instructions: VecDeque<Instruction>,
    blocked_until: Option<u64>,
    waiting_for_io: bool,
    done: bool,
    stats: CoreStats,
}

impl Core {
    pub fn new(id: usize, cache: Cache, instructions: impl IntoIterator<Item = Instruction>) -> Self {
        Self {
            id,
            cache,
            instructions: instructions.into_iter().collect(),
            blocked_until: None,
            waiting_for_io: false,
            done: false,
            stats: CoreStats::default(),
        }
    }

    /// Takes one decision for `cycle`
    pub fn step(&mut self, cycle: u64, bus: &mut Bus) -> CoreStatus {
        if self.done {
            return CoreStatus::Done;
        }
        // Computing counts as busy, not idle
        if self.blocked_until.map_or(false, |until| until > cycle) {
            return CoreStatus::Running;
        }
        if self.waiting_for_io {
            self.stats.idle_cycles += 1;
            return CoreStatus::Running;
        }
        match self.instructions.pop_front() {
            Some(instruction) => {
                self.issue(instruction, cycle, bus);
                CoreStatus::Running
            }
            None => {
                trace!("core {}: trace exhausted at cycle {cycle}", self.id);
                self.done = true;
                CoreStatus::Done
            }
        }
    }

    fn issue(&mut self, instruction: Instruction, cycle: u64, bus: &mut Bus) {
        let outcome = match instruction {
            Instruction::Load(address) => {
                self.stats.loads += 1;
                self.cache.load(address)
            }
            Instruction::Store(address) => {
                self.stats.stores += 1;
                self.cache.store(address)
            }
            Instruction::Compute(cycles) => {
                // Saturates, an operand this large just keeps the core busy for the rest of time
                self.blocked_until = Some(cycle.saturating_add(cycles));
                self.stats.compute_cycles = self.stats.compute_cycles.saturating_add(cycles);
                return;
            }
        };
        self.stats.private_accesses += 1;
        if outcome.hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            trace!("core {}: {instruction:?} missed at cycle {cycle}", self.id);
            self.waiting_for_io = true;
            self.cache.request_fill(outcome.evicted_dirty, bus, cycle);
        }
    }

    /// Delivers the completion of this core's in-flight bus transfer
    pub fn on_transfer_complete(&mut self, bus: &mut Bus, cycle: u64) {
        if self.cache.complete_transfer(bus, cycle) {
            trace!("core {}: memory access resolved at cycle {cycle}", self.id);
            self.waiting_for_io = false;
        }
    }

    /// Finished means the trace is exhausted and nothing is outstanding
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_waiting_for_io(&self) -> bool {
        self.waiting_for_io
    }

    pub fn blocked_until(&self) -> Option<u64> {
        self.blocked_until
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn stats(&self) -> &CoreStats {
        &self.stats
    }

    /// Instructions not yet issued
    pub fn remaining(&self) -> usize {
        self.instructions.len()
    }
}
