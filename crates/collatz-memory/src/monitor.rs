use crate::pressure::{MemoryPressure, MemoryPressureThresholds};
use crate::{process, reclaim, units::MB};
use std::fmt;
use std::time::{Duration, Instant};

/// Default minimum spacing between two real memory samples.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Source of process memory usage samples.
pub trait MemorySampler: Send {
    /// Current memory usage in bytes, or `None` when unknown.
    fn sample(&mut self) -> Option<u64>;

    /// Best-effort request to release memory back to the OS.
    fn reclaim(&mut self) -> bool {
        false
    }
}

/// Samples the resident set size of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSampler;

impl MemorySampler for ProcessSampler {
    fn sample(&mut self) -> Option<u64> {
        process::current_rss_bytes()
    }

    fn reclaim(&mut self) -> bool {
        reclaim::request_reclaim()
    }
}

/// Rate-limited check of process memory against a fixed threshold.
///
/// [`MemoryMonitor::check_memory`] samples at most once per `interval`. Calls
/// inside the interval return `true` without touching the OS, so the monitor
/// can be polled from tight loops.
pub struct MemoryMonitor {
    threshold_bytes: u64,
    interval: Duration,
    thresholds: MemoryPressureThresholds,
    sampler: Box<dyn MemorySampler>,
    last_sample_at: Option<Instant>,
    last_usage: Option<u64>,
    peak_observed: u64,
    checks: u64,
    samples: u64,
}

impl MemoryMonitor {
    /// Monitor the current process against `threshold_mb` megabytes.
    pub fn new(threshold_mb: u64) -> Self {
        Self::with_sampler(threshold_mb, DEFAULT_CHECK_INTERVAL, Box::new(ProcessSampler))
    }

    pub fn with_sampler(
        threshold_mb: u64,
        interval: Duration,
        sampler: Box<dyn MemorySampler>,
    ) -> Self {
        Self {
            threshold_bytes: threshold_mb.saturating_mul(MB),
            interval,
            thresholds: MemoryPressureThresholds::default(),
            sampler,
            last_sample_at: None,
            last_usage: None,
            peak_observed: 0,
            checks: 0,
            samples: 0,
        }
    }

    pub fn threshold_bytes(&self) -> u64 {
        self.threshold_bytes
    }

    /// Returns `false` when memory usage exceeds the threshold.
    ///
    /// On pressure a reclamation hint is issued; what else to do (clear caches,
    /// throttle) is up to the caller.
    pub fn check_memory(&mut self) -> bool {
        self.checks = self.checks.saturating_add(1);

        let now = Instant::now();
        if let Some(last) = self.last_sample_at {
            if now.saturating_duration_since(last) < self.interval {
                return true;
            }
        }
        self.last_sample_at = Some(now);

        let Some(usage) = self.sample_usage() else {
            return true;
        };

        if usage <= self.threshold_bytes {
            return true;
        }

        tracing::warn!(
            target = "collatz.memory",
            usage_bytes = usage,
            threshold_bytes = self.threshold_bytes,
            pressure = ?self.pressure_for(usage),
            "memory usage above threshold"
        );
        self.sampler.reclaim();
        false
    }

    /// Pressure level derived from a fresh (unthrottled) sample.
    pub fn pressure(&mut self) -> MemoryPressure {
        match self.sample_usage() {
            Some(usage) => self.pressure_for(usage),
            None => MemoryPressure::Low,
        }
    }

    /// Pressure level `usage_bytes` would map to under this monitor's threshold.
    pub fn pressure_for(&self, usage_bytes: u64) -> MemoryPressure {
        self.thresholds.level_for_usage(usage_bytes, self.threshold_bytes)
    }

    /// Fresh, unthrottled usage sample.
    pub fn current_usage(&mut self) -> Option<u64> {
        self.sample_usage()
    }

    /// Usage reported by the most recent sample, if any.
    pub fn last_usage(&self) -> Option<u64> {
        self.last_usage
    }

    /// Highest usage sampled since construction or the last [`Self::reset_peak`].
    pub fn peak_observed(&self) -> u64 {
        self.peak_observed
    }

    pub fn reset_peak(&mut self) {
        self.peak_observed = 0;
    }

    /// Best-effort reclamation hint. Never required for correctness.
    pub fn request_reclaim(&mut self) -> bool {
        self.sampler.reclaim()
    }

    /// Number of `check_memory` calls.
    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Number of real samples taken.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    fn sample_usage(&mut self) -> Option<u64> {
        self.samples = self.samples.saturating_add(1);
        let usage = self.sampler.sample();
        if let Some(bytes) = usage {
            self.peak_observed = self.peak_observed.max(bytes);
        }
        self.last_usage = usage;
        usage
    }
}

impl fmt::Debug for MemoryMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryMonitor")
            .field("threshold_bytes", &self.threshold_bytes)
            .field("interval", &self.interval)
            .field("last_usage", &self.last_usage)
            .field("peak_observed", &self.peak_observed)
            .field("checks", &self.checks)
            .field("samples", &self.samples)
            .finish()
    }
}
