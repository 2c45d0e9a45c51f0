pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Errors produced by the sequence engine and its building blocks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid input {value}: collatz trajectories start at a positive integer")]
    InvalidInput { value: u64 },

    #[error("arithmetic overflow at value {value} after {steps} steps")]
    Overflow { value: u64, steps: u64 },

    #[error("cache capacity must be at least 1")]
    InvalidCapacity,

    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error("invalid engine config `{field}`: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
}

impl EngineError {
    /// Per-number failures that a batch records and skips, as opposed to
    /// construction-time misconfiguration.
    pub fn is_computation_failure(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::Overflow { .. })
    }
}
