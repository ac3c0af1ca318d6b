//! Monotonic counters and derived rates.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::observability::metrics;

/// Assumed cost of one avoided remote transformation, in seconds.
pub const ASSUMED_REMOTE_CALL_SECS: f64 = 2.0;

/// Raw counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_requests: u64,
    pub total_responses: u64,
    pub total_bytes_processed: u64,
    pub content_modifications: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Remote pipeline runs avoided by serving from cache.
    pub wcf_calls_saved: u64,
    pub total_pages_cached: u64,
    pub avg_cache_hit_time_ms: f64,
    pub avg_cache_miss_time_ms: f64,
}

impl Stats {
    /// Share of cache lookups that hit; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Seconds saved by cache hits against the fixed remote-call baseline.
    pub fn estimated_time_saved_seconds(&self) -> f64 {
        let hits = self.cache_hits as f64;
        hits * ASSUMED_REMOTE_CALL_SECS - hits * (self.avg_cache_hit_time_ms / 1000.0)
    }
}

/// Serializable view of the counters plus derived values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(flatten)]
    pub stats: Stats,
    pub hit_rate: f64,
    pub estimated_time_saved_seconds: f64,
}

impl From<Stats> for StatsSnapshot {
    fn from(stats: Stats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            estimated_time_saved_seconds: stats.estimated_time_saved_seconds(),
            stats,
        }
    }
}

/// Shared owner of the process stats.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    inner: Mutex<Stats>,
}

fn incremental_mean(old_avg: f64, old_count: u64, sample: f64) -> f64 {
    (old_avg * old_count as f64 + sample) / (old_count as f64 + 1.0)
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Stats> {
        // Counters stay usable even if a holder panicked mid-update.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_request(&self) {
        self.lock().total_requests += 1;
        metrics::record_request();
    }

    pub fn record_response(&self, body_bytes: usize) {
        {
            let mut stats = self.lock();
            stats.total_responses += 1;
            stats.total_bytes_processed += body_bytes as u64;
        }
        metrics::record_response(body_bytes);
    }

    pub fn record_content_modification(&self) {
        self.lock().content_modifications += 1;
        metrics::record_content_modification();
    }

    pub fn record_cache_hit(&self, elapsed: Duration) {
        {
            let mut stats = self.lock();
            let sample = elapsed.as_secs_f64() * 1000.0;
            stats.avg_cache_hit_time_ms =
                incremental_mean(stats.avg_cache_hit_time_ms, stats.cache_hits, sample);
            stats.cache_hits += 1;
            stats.wcf_calls_saved += 1;
        }
        metrics::record_cache_lookup(true, elapsed);
    }

    pub fn record_cache_miss(&self, elapsed: Duration) {
        {
            let mut stats = self.lock();
            let sample = elapsed.as_secs_f64() * 1000.0;
            stats.avg_cache_miss_time_ms =
                incremental_mean(stats.avg_cache_miss_time_ms, stats.cache_misses, sample);
            stats.cache_misses += 1;
        }
        metrics::record_cache_lookup(false, elapsed);
    }

    pub fn record_page_cached(&self) {
        self.lock().total_pages_cached += 1;
        metrics::record_page_cached();
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().clone().into()
    }

    /// Zero every counter and return the values held before the reset.
    pub fn reset(&self) -> StatsSnapshot {
        let previous = std::mem::take(&mut *self.lock());
        tracing::info!(
            total_requests = previous.total_requests,
            total_responses = previous.total_responses,
            "Stats reset"
        );
        previous.into()
    }
}
