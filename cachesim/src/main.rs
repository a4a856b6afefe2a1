use std::time::Instant;
use clap::Parser;
use env_logger::Env;
use log::warn;
use cachelib::config::{DEFAULT_ASSOCIATIVITY, DEFAULT_BLOCK_SIZE, DEFAULT_CACHE_SIZE, DEFAULT_MEMORY_LATENCY, DEFAULT_NUM_CORES, SimulationConfig};
use cachelib::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Cycle-driven cache and memory bus simulator"))]
struct Args {
    /// Coherence protocol name. Recorded in the report, no coherence is simulated
    protocol: String,
    /// Trace file, or the prefix of per-core trace files named <INPUT_FILE>_<core>.data
    input_file: String,
    /// Cache size in bytes
    #[arg(default_value_t = DEFAULT_CACHE_SIZE)]
    cache_size: u64,
    /// Blocks per set
    #[arg(default_value_t = DEFAULT_ASSOCIATIVITY)]
    associativity: u64,
    /// Block size in bytes
    #[arg(default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u64,

    #[arg(short, long, default_value_t = DEFAULT_NUM_CORES)]
    num_cores: usize,

    /// Cycles per bus transfer to or from memory
    #[arg(short = 'l', long, default_value_t = DEFAULT_MEMORY_LATENCY)]
    memory_latency: u64,

    /// Print the report as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

impl Args {
    fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            protocol: self.protocol.clone(),
            input_file: self.input_file.clone(),
            cache_size: self.cache_size,
            associativity: self.associativity,
            block_size: self.block_size,
            num_cores: self.num_cores,
            memory_latency: self.memory_latency,
        }
    }
}

fn main() -> Result<(), String> {
    let env = Env::default()
        .filter_or("CACHESIM_LOG", "warn")
        .write_style_or("CACHESIM_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    let start = Instant::now();
    let args = Args::parse();
    let config = args.to_config();
    if !matches!(config.protocol.as_str(), "MESI" | "Dragon") {
        warn!("unknown protocol {:?}, it is recorded but has no effect", config.protocol);
    }
    let mut simulator = Simulator::new(&config).map_err(|e| format!("Couldn't set up the simulation: {e}"))?;
    let result = simulator.simulate();
    if args.json {
        println!("{}", serde_json::to_string_pretty(result).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        println!("{result}");
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes trace parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {:?}", simulator.config());
        let formatted = simulator.get_resident_block_counts()
            .iter()
            .enumerate()
            .map(|(core, count)| format!("core {core}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Resident cache blocks by core: ({formatted})");
    }
    Ok(())
}
