//! # CacheLib
//!
//! Cachelib is a cycle-driven simulator for private set-associative caches sharing one memory bus
//!
//! Each core replays a trace of loads, stores and compute instructions against its own LRU,
//! write-back cache. Misses, and writebacks of dirty victims, queue on a single bus which services
//! one transfer at a time at a fixed latency. A scheduler advances the bus and every core in
//! lockstep and the counters they keep are collected into a report
//!
//! Runs are fully deterministic: the same traces and configuration always produce the same report

/// Contains the bus model and the transfers queued on it
pub mod bus;

/// Contains the set-associative cache, its geometry, and address decomposition
pub mod cache;

/// Contains the run configuration and its defaults
pub mod config;

/// Contains the errors raised while setting up a simulation
pub mod error;

/// Contains the trace file reader
pub mod io;

/// Contains the counters kept during a run and the report built from them
pub mod monitor;

/// Contains the per-core state machine
pub mod processor;

/// Contains the cycle loop
pub mod scheduler;

/// Contains the simulator used to simulate a set of traces with a given cache configuration
pub mod simulator;

/// Contains the trace format and parser
pub mod trace;

#[cfg(test)]
mod test;
