use serde::{Deserialize, Serialize};
use crate::cache::CacheGeometry;
use crate::error::ConfigError;

pub const DEFAULT_CACHE_SIZE: u64 = 4096;
pub const DEFAULT_ASSOCIATIVITY: u64 = 2;
pub const DEFAULT_BLOCK_SIZE: u64 = 32;
pub const DEFAULT_NUM_CORES: usize = 1;
/// Cycles a single bus transfer to or from main memory takes
pub const DEFAULT_MEMORY_LATENCY: u64 = 100;
/// Upper bound on the memory latency, keeps bus deadlines far from overflowing
pub const MAX_MEMORY_LATENCY: u64 = u32::MAX as u64;

/// The configuration for a whole simulation run
///
/// `protocol` is recorded and reported but not consulted, there is no coherence model behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub protocol: String,
    pub input_file: String,
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
    #[serde(default = "default_associativity")]
    pub associativity: u64,
    #[serde(default = "default_block_size")]
    pub block_size: u64,
    #[serde(default = "default_num_cores")]
    pub num_cores: usize,
    #[serde(default = "default_memory_latency")]
    pub memory_latency: u64,
}

fn default_cache_size() -> u64 {
    DEFAULT_CACHE_SIZE
}

fn default_associativity() -> u64 {
    DEFAULT_ASSOCIATIVITY
}

fn default_block_size() -> u64 {
    DEFAULT_BLOCK_SIZE
}

fn default_num_cores() -> usize {
    DEFAULT_NUM_CORES
}

fn default_memory_latency() -> u64 {
    DEFAULT_MEMORY_LATENCY
}

impl SimulationConfig {
    /// Creates a configuration with the default geometry for the given protocol and trace prefix
    pub fn new(protocol: impl Into<String>, input_file: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            input_file: input_file.into(),
            cache_size: DEFAULT_CACHE_SIZE,
            associativity: DEFAULT_ASSOCIATIVITY,
            block_size: DEFAULT_BLOCK_SIZE,
            num_cores: DEFAULT_NUM_CORES,
            memory_latency: DEFAULT_MEMORY_LATENCY,
        }
    }

    /// Validates the cache parameters and derives the geometry every cache in the run shares
    pub fn geometry(&self) -> Result<CacheGeometry, ConfigError> {
        CacheGeometry::new(self.cache_size, self.associativity, self.block_size)
    }

    /// Checks everything that must hold before the simulator is built
    pub fn validate(&self) -> Result<CacheGeometry, ConfigError> {
        if self.num_cores == 0 {
            return Err(ConfigError::ZeroCores);
        }
        if self.memory_latency == 0 {
            return Err(ConfigError::ZeroMemoryLatency);
        }
        if self.memory_latency > MAX_MEMORY_LATENCY {
            return Err(ConfigError::ExcessiveMemoryLatency {
                latency: self.memory_latency,
                max: MAX_MEMORY_LATENCY,
            });
        }
        self.geometry()
    }
}
