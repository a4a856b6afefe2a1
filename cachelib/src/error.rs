use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with the cache geometry or run parameters, rejected before anything is built
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("block size must be at least 1 byte")]
    ZeroBlockSize,
    #[error("associativity must be at least 1 block per set")]
    ZeroAssociativity,
    #[error("cache size must be at least 1 byte")]
    ZeroCacheSize,
    #[error("at least one core is required")]
    ZeroCores,
    #[error("memory latency must be at least 1 cycle")]
    ZeroMemoryLatency,
    #[error("memory latency {latency} exceeds the maximum of {max} cycles")]
    ExcessiveMemoryLatency {
        latency: u64,
        max: u64,
    },
    #[error("cache size {cache_size} is not a multiple of block size {block_size} x associativity {associativity}")]
    IndivisibleCacheSize {
        cache_size: u64,
        block_size: u64,
        associativity: u64,
    },
}

/// Everything that can stop a simulation from starting
///
/// Once the cycle loop is running nothing can fail, so all of these are raised while building
/// the simulator
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("couldn't open the trace file at path {}: {source}", path.display())]
    MissingTraceSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file could be opened but reading it failed part way. Lines which aren't valid UTF-8 are
    /// a [`SimError::MalformedTraceEntry`] instead
    #[error("couldn't read the trace file at path {}: {source}", path.display())]
    TraceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed trace entry in {} at line {line}: {content:?}", path.display())]
    MalformedTraceEntry {
        path: PathBuf,
        line: usize,
        content: String,
    },
}
