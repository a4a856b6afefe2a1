use std::fmt;
use serde::{Deserialize, Serialize};
use crate::bus::Bus;
use crate::config::SimulationConfig;
use crate::processor::Core;

/// Counters kept by each core while it runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStats {
    pub compute_cycles: u64,
    pub idle_cycles: u64,
    pub loads: u64,
    pub stores: u64,
    pub hits: u64,
    pub misses: u64,
    pub private_accesses: u64,
    /// Always zero, nothing is shared without a coherence protocol
    pub shared_accesses: u64,
}

impl CoreStats {
    /// Hits as a percentage of all loads and stores, 0 when there were none
    pub fn hit_rate(&self) -> f64 {
        let accesses = self.hits + self.misses;
        if accesses == 0 {
            0.0
        } else {
            100.0 * self.hits as f64 / accesses as f64
        }
    }
}

/// Counters kept by the bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStats {
    pub traffic_bytes: u64,
    pub fetches: u64,
    pub writebacks: u64,
    /// Invalidations and updates broadcast on the bus. Stays zero, no coherence protocol is modelled
    pub invalidations: u64,
}

/// The result for an individual core. Can be serialised for machine-readable output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreReport {
    pub id: usize,
    #[serde(flatten)]
    pub stats: CoreStats,
    pub hit_rate: f64,
}

/// The result of a whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub protocol: String,
    pub cache_size: u64,
    pub associativity: u64,
    pub block_size: u64,
    pub total_cycles: u64,
    pub cores: Vec<CoreReport>,
    pub bus: BusStats,
}

impl SimulationReport {
    /// Gathers the counters of a finished run
    pub fn collect(config: &SimulationConfig, total_cycles: u64, cores: &[Core], bus: &Bus) -> Self {
        Self {
            protocol: config.protocol.clone(),
            cache_size: config.cache_size,
            associativity: config.associativity,
            block_size: config.block_size,
            total_cycles,
            cores: cores.iter().map(|core| CoreReport {
                id: core.id(),
                stats: *core.stats(),
                hit_rate: core.stats().hit_rate(),
            }).collect(),
            bus: *bus.stats(),
        }
    }

    pub fn total_compute_cycles(&self) -> u64 {
        self.cores.iter().map(|c| c.stats.compute_cycles).sum()
    }

    pub fn private_accesses(&self) -> u64 {
        self.cores.iter().map(|c| c.stats.private_accesses).sum()
    }

    pub fn shared_accesses(&self) -> u64 {
        self.cores.iter().map(|c| c.stats.shared_accesses).sum()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str = "========================================";
        writeln!(f, "{RULE}")?;
        writeln!(f, "        SIMULATION RESULTS")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Protocol: {}, cache size: {}B, associativity: {}, block size: {}B",
                 self.protocol, self.cache_size, self.associativity, self.block_size)?;
        writeln!(f)?;
        writeln!(f, "1. Overall Execution Cycles: {}", self.total_cycles)?;
        writeln!(f)?;
        writeln!(f, "2. Compute Cycles:")?;
        for core in &self.cores {
            writeln!(f, "   Core {}: {}", core.id, core.stats.compute_cycles)?;
        }
        if self.cores.len() > 1 {
            writeln!(f, "   Total: {}", self.total_compute_cycles())?;
        }
        writeln!(f)?;
        writeln!(f, "3. Load/Store Instructions:")?;
        for core in &self.cores {
            writeln!(f, "   Core {}: {} ({} loads, {} stores)", core.id,
                     core.stats.loads + core.stats.stores, core.stats.loads, core.stats.stores)?;
        }
        writeln!(f)?;
        writeln!(f, "4. Idle Cycles:")?;
        for core in &self.cores {
            writeln!(f, "   Core {}: {}", core.id, core.stats.idle_cycles)?;
        }
        writeln!(f)?;
        writeln!(f, "5. Cache Statistics:")?;
        for core in &self.cores {
            writeln!(f, "   Core {}:", core.id)?;
            writeln!(f, "      Hits:     {}", core.stats.hits)?;
            writeln!(f, "      Misses:   {}", core.stats.misses)?;
            writeln!(f, "      Hit Rate: {:.2}%", core.hit_rate)?;
        }
        writeln!(f)?;
        writeln!(f, "6. Bus Data Traffic: {} bytes", self.bus.traffic_bytes)?;
        writeln!(f)?;
        writeln!(f, "7. Bus Writebacks: {}, Invalidations/Updates: {}", self.bus.writebacks, self.bus.invalidations)?;
        writeln!(f)?;
        writeln!(f, "8. Data Access Distribution:")?;
        writeln!(f, "   Private: {}", self.private_accesses())?;
        writeln!(f, "   Shared:  {}", self.shared_accesses())?;
        write!(f, "{RULE}")
    }
}
