use crate::latency::LatencySummary;
use crate::stats::MemoryEfficiency;
use crate::BenchConfig;
use collatz_engine::LongestTrajectory;
use collatz_memory::MemoryPressure;
use serde::{Deserialize, Serialize};

/// Result of [`crate::BenchmarkHarness::compare_implementations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub range: RangeSummary,
    pub settings: BenchConfig,
    pub cache_size: usize,
    pub cached: ConfigurationReport,
    pub uncached: ConfigurationReport,
    pub improvement: Improvement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub start: u64,
    pub end: u64,
    pub batch_count: u64,
    pub numbers: u64,
}

/// Aggregates for one side of the comparison.
///
/// Times and memory figures are per-batch averages over `sample_size` runs;
/// totals sum those averages across batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationReport {
    pub total_time_ms: f64,
    /// Mean time per batch.
    pub average_time_ms: f64,
    pub average_memory_bytes: f64,
    pub peak_memory_bytes: u64,
    /// Highest pressure level reached by any sample against the engine's threshold.
    pub peak_pressure: MemoryPressure,
    pub cache_hits: f64,
    /// `cache_hits / numbers * 100`.
    pub cache_hit_rate: f64,
    pub max_steps: u64,
    pub longest: Option<LongestTrajectory>,
    pub memory_efficiency: MemoryEfficiency,
    pub latency: LatencySummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    /// Uncached total time divided by cached total time; `None` when the
    /// cached total is zero.
    pub speedup: Option<f64>,
    /// Uncached average memory minus cached average memory, in bytes. Negative
    /// when the cache costs memory.
    pub memory_reduction_bytes: f64,
}

impl Improvement {
    pub fn between(cached: &ConfigurationReport, uncached: &ConfigurationReport) -> Self {
        let speedup =
            (cached.total_time_ms > 0.0).then(|| uncached.total_time_ms / cached.total_time_ms);
        Self {
            speedup,
            memory_reduction_bytes: uncached.average_memory_bytes - cached.average_memory_bytes,
        }
    }
}
