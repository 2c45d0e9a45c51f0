//! Memoized Collatz trajectory engine.
//!
//! [`SequenceEngine`] owns an [`EvictionCache`] and a
//! [`collatz_memory::MemoryMonitor`]; nothing is process-global, so independent
//! engines can coexist (tests rely on this). [`RangeBatcher`] splits large
//! ranges into bounded batches for [`SequenceEngine::process_batch`].

mod batch;
mod cache;
mod config;
mod engine;
mod error;
mod trajectory;

pub use batch::{Batch, Batches, RangeBatcher};
pub use cache::{CacheStats, EvictionCache};
pub use config::EngineConfig;
pub use engine::{BatchOutcome, SequenceEngine};
pub use error::{EngineError, Result};
pub use trajectory::{LongestTrajectory, NumberResult, Trajectory};
