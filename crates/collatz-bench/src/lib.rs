//! Benchmark harness for the memoized Collatz engine.
//!
//! [`BenchmarkHarness::compare_implementations`] warms the engine up, then for
//! every batch of the requested range measures `sample_size` isolated runs with
//! and without the cache, and folds the per-batch averages into a
//! [`BenchmarkReport`].

mod config;
mod error;
mod harness;
mod latency;
mod report;
mod stats;

pub use config::BenchConfig;
pub use error::{BenchError, CacheMode};
pub use harness::{BatchAggregate, BenchmarkHarness, SampleMetrics, WARMUP_SPAN};
pub use latency::{LatencyRecorder, LatencySummary};
pub use report::{BenchmarkReport, ConfigurationReport, Improvement, RangeSummary};
pub use stats::MemoryEfficiency;
