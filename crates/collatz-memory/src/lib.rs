//! Memory sampling and pressure detection for the Collatz engine.
//!
//! Everything here is best-effort:
//! - Process usage is sampled from the OS and may be unavailable (`None`).
//!   Unknown usage never counts as pressure.
//! - Reclamation hints may be a no-op on the current platform.
//! - Pressure checks are rate-limited so hot loops can poll them freely.

mod monitor;
mod pressure;
mod process;
mod reclaim;
mod units;

pub use monitor::{MemoryMonitor, MemorySampler, ProcessSampler, DEFAULT_CHECK_INTERVAL};
pub use pressure::{MemoryPressure, MemoryPressureThresholds};
pub use process::current_rss_bytes;
pub use reclaim::request_reclaim;
pub use units::{parse_byte_size, GB, KB, MB};
