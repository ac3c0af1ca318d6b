//! Process-wide processing statistics.
//!
//! # Responsibilities
//! - Count requests, responses, bytes and content modifications
//! - Track cache hits/misses and their mean latencies
//! - Derive hit rate and estimated time saved
//!
//! # Design Decisions
//! - One owned aggregator behind a mutex, shared via Arc; no global state
//! - Latency averages are true incremental means, not smoothed
//! - Every update is mirrored into the metrics facade

pub mod aggregator;

pub use aggregator::{StatsAggregator, StatsSnapshot};
