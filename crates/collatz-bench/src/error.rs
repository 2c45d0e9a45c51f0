use collatz_engine::EngineError;
use std::fmt;

/// Fatal benchmark failures. A report is only produced when every batch of
/// every sample completed.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid benchmark range {start}..={end}: expected 1 <= start <= end")]
    InvalidRange { start: u64, end: u64 },

    #[error("invalid benchmark config `{field}`: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{mode} batch {start}..={end} failed at {number} ({failed} of {total} numbers failed): {source}")]
    Batch {
        start: u64,
        end: u64,
        mode: CacheMode,
        /// First failing number.
        number: u64,
        failed: usize,
        total: u64,
        #[source]
        source: EngineError,
    },
}

/// Which side of the comparison a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Cached,
    Uncached,
}

impl CacheMode {
    pub fn uses_cache(self) -> bool {
        matches!(self, Self::Cached)
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cached => "cached",
            Self::Uncached => "uncached",
        })
    }
}
