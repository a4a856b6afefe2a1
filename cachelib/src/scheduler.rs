use log::trace;
use crate::bus::Bus;
use crate::processor::{Core, CoreStatus};

/// The first simulated cycle. Counting from one makes the cycle an instruction is issued in part
/// of its cost, so a lone `COMPUTE n` takes exactly `n` cycles
pub const FIRST_CYCLE: u64 = 1;

/// Drives the bus and every core in lockstep, one cycle at a time
///
/// Each cycle the bus is advanced first and any transfer it completes is handed to the core that
/// asked for it, then every core takes one step in id order. The run ends on the first cycle in
/// which all cores report done
#[derive(Debug)]
pub struct Scheduler {
    cycle: u64,
    cores: Vec<Core>,
    bus: Bus,
    total_cycles: Option<u64>,
}

impl Scheduler {
    /// Cores must be numbered `0..cores.len()` in order, bus completions are routed by that id
    pub fn new(cores: Vec<Core>, bus: Bus) -> Self {
        debug_assert!(cores.iter().enumerate().all(|(i, core)| core.id() == i));
        Self {
            cycle: FIRST_CYCLE,
            cores,
            bus,
            total_cycles: None,
        }
    }

    /// Simulates a single cycle. Returns false once every core has finished, after which further
    /// calls do nothing
    pub fn step(&mut self) -> bool {
        if self.total_cycles.is_some() {
            return false;
        }
        let cycle = self.cycle;
        if let Some(completed) = self.bus.advance(cycle) {
            if let Some(core) = self.cores.get_mut(completed.requester) {
                core.on_transfer_complete(&mut self.bus, cycle);
            }
        }
        let mut all_done = true;
        for core in self.cores.iter_mut() {
            if core.step(cycle, &mut self.bus) == CoreStatus::Running {
                all_done = false;
            }
        }
        if all_done {
            // This cycle only confirmed there was nothing left to do
            self.total_cycles = Some(cycle - 1);
            trace!("all cores finished at cycle {cycle}");
            return false;
        }
        self.cycle += 1;
        true
    }

    /// Runs until every core has finished and returns the total number of cycles taken
    pub fn run(&mut self) -> u64 {
        while self.step() {}
        self.total_cycles.unwrap_or(0)
    }

    /// The cycle currently being, or about to be, simulated
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Total cycles, once the run has finished
    pub fn total_cycles(&self) -> Option<u64> {
        self.total_cycles
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}
