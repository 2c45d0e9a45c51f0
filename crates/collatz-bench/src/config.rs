use crate::error::BenchError;
use serde::{Deserialize, Serialize};

/// Measurement settings for a [`crate::BenchmarkHarness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Batch size used to split the benchmarked range.
    pub batch_size: u64,
    /// Measured repetitions per batch and configuration.
    pub sample_size: u32,
    /// Discarded priming passes before measurement starts.
    pub warmup_runs: u32,
}

impl BenchConfig {
    pub const DEFAULT_BATCH_SIZE: u64 = 40_000;
    pub const DEFAULT_SAMPLE_SIZE: u32 = 3;
    pub const DEFAULT_WARMUP_RUNS: u32 = 1;

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.batch_size == 0 {
            return Err(BenchError::InvalidConfig {
                field: "batch_size",
                message: "must be >= 1".to_string(),
            });
        }
        if self.sample_size == 0 {
            return Err(BenchError::InvalidConfig {
                field: "sample_size",
                message: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            sample_size: Self::DEFAULT_SAMPLE_SIZE,
            warmup_runs: Self::DEFAULT_WARMUP_RUNS,
        }
    }
}
