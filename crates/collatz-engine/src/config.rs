use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for a [`crate::SequenceEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the trajectory cache.
    pub cache_size: usize,
    /// Process memory (in MB) above which the cache is force-cleared.
    pub memory_threshold_mb: u64,
    /// Steps between two memory monitor polls inside one trajectory.
    pub memory_check_frequency: u64,
    /// Minimum spacing between two real memory samples.
    pub memory_check_interval: Duration,
    /// Length of the backpressure pause taken by `process_batch` under pressure.
    pub pressure_pause: Duration,
}

impl EngineConfig {
    pub const DEFAULT_CACHE_SIZE: usize = 80_000;
    pub const DEFAULT_MEMORY_THRESHOLD_MB: u64 = 400;
    pub const DEFAULT_MEMORY_CHECK_FREQUENCY: u64 = 1_000;
    pub const DEFAULT_MEMORY_CHECK_INTERVAL: Duration = collatz_memory::DEFAULT_CHECK_INTERVAL;
    pub const DEFAULT_PRESSURE_PAUSE: Duration = Duration::from_millis(1);

    pub fn validate(&self) -> Result<()> {
        if self.cache_size == 0 {
            return Err(EngineError::InvalidCapacity);
        }
        if self.memory_threshold_mb == 0 {
            return Err(EngineError::InvalidConfig {
                field: "memory_threshold_mb",
                message: "must be >= 1".to_string(),
            });
        }
        if self.memory_check_frequency == 0 {
            return Err(EngineError::InvalidConfig {
                field: "memory_check_frequency",
                message: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_size: Self::DEFAULT_CACHE_SIZE,
            memory_threshold_mb: Self::DEFAULT_MEMORY_THRESHOLD_MB,
            memory_check_frequency: Self::DEFAULT_MEMORY_CHECK_FREQUENCY,
            memory_check_interval: Self::DEFAULT_MEMORY_CHECK_INTERVAL,
            pressure_pause: Self::DEFAULT_PRESSURE_PAUSE,
        }
    }
}
