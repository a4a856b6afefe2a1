use std::time::{Duration, Instant};
use log::info;
use crate::bus::Bus;
use crate::cache::Cache;
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::monitor::SimulationReport;
use crate::processor::Core;
use crate::scheduler::Scheduler;
use crate::trace::{core_trace_path, Instruction, Trace};

/// The simulator wires caches, cores and the bus together from a configuration and collects the
/// results.
///
/// Everything that can fail happens in the constructors. Once built, a simulation always runs to
/// completion
#[derive(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    scheduler: Scheduler,
    report: Option<SimulationReport>,
    simulation_time: Duration,
}

impl Simulator {
    /// Creates a new simulator for a given configuration, reading one trace file per core
    ///
    /// # Arguments
    ///
    /// * `config`: The run configuration, usually built from command line arguments
    ///
    /// returns: Result<Simulator, SimError>, failing on invalid geometry, missing trace files or
    /// malformed trace entries
    pub fn new(config: &SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let traces = (0..config.num_cores)
            .map(|core| Trace::open(core_trace_path(&config.input_file, core, config.num_cores)))
            .map(|trace| trace.map(Trace::into_instructions))
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(config.clone(), traces)
    }

    /// Creates a simulator from instruction streams which are already in memory, one per core
    ///
    /// The number of cores is taken from `traces`, overriding `config.num_cores`
    pub fn from_traces(config: &SimulationConfig, traces: Vec<Vec<Instruction>>) -> Result<Self, SimError> {
        let config = SimulationConfig {
            num_cores: traces.len(),
            ..config.clone()
        };
        Self::build(config, traces)
    }

    fn build(config: SimulationConfig, traces: Vec<Vec<Instruction>>) -> Result<Self, SimError> {
        let geometry = config.validate()?;
        let cores = traces
            .into_iter()
            .enumerate()
            .map(|(id, instructions)| Core::new(id, Cache::new(id, geometry), instructions))
            .collect();
        let bus = Bus::new(config.memory_latency);
        Ok(Self {
            config,
            scheduler: Scheduler::new(cores, bus),
            report: None,
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Runs the simulation to completion and returns the collected statistics
    ///
    /// Calling this again returns the same report without simulating anything further
    pub fn simulate(&mut self) -> &SimulationReport {
        let scheduler = &mut self.scheduler;
        let config = &self.config;
        let simulation_time = &mut self.simulation_time;
        self.report.get_or_insert_with(|| {
            info!(
                "simulating {} core(s): {}B cache, {}-way, {}B blocks, protocol {:?}",
                config.num_cores, config.cache_size, config.associativity, config.block_size, config.protocol
            );
            let start = Instant::now();
            let total_cycles = scheduler.run();
            *simulation_time += start.elapsed();
            info!("simulation finished after {total_cycles} cycles");
            SimulationReport::collect(config, total_cycles, scheduler.cores(), scheduler.bus())
        })
    }

    /// Gets the wall-clock execution time for simulating
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of resident blocks in each core's cache
    pub fn get_resident_block_counts(&self) -> Vec<usize> {
        self.scheduler.cores().iter().map(|core| core.cache().resident_blocks()).collect()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
