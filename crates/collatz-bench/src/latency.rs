use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

// Sample latencies are recorded in microseconds.
const LATENCY_SIGFIG: u8 = 3;
// One hour per sample is far beyond any realistic batch; larger values are clamped.
const MAX_LATENCY_US: u64 = 60 * 60 * 1_000_000;

/// Histogram of per-sample execution times for one configuration.
#[derive(Debug)]
pub struct LatencyRecorder {
    histogram: Option<Histogram<u64>>,
}

/// Percentiles of the recorded sample latencies, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub samples: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub max_us: u64,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        static HISTOGRAM_BOUNDS_ERROR_LOGGED: OnceLock<()> = OnceLock::new();

        let histogram = Histogram::<u64>::new_with_bounds(1, MAX_LATENCY_US, LATENCY_SIGFIG)
            .or_else(|err| {
                if HISTOGRAM_BOUNDS_ERROR_LOGGED.set(()).is_ok() {
                    tracing::debug!(
                        target = "collatz.bench",
                        error = %err,
                        "failed to construct bounded latency histogram; falling back to unbounded histogram"
                    );
                }
                Histogram::<u64>::new(LATENCY_SIGFIG)
            })
            .ok();
        Self { histogram }
    }

    pub fn record(&mut self, duration: Duration) {
        static HISTOGRAM_RECORD_ERROR_LOGGED: OnceLock<()> = OnceLock::new();

        let Some(histogram) = self.histogram.as_mut() else {
            return;
        };
        let micros = duration.as_micros().min(u128::from(MAX_LATENCY_US)) as u64;
        let micros = micros.max(1);
        if let Err(err) = histogram.record(micros) {
            if HISTOGRAM_RECORD_ERROR_LOGGED.set(()).is_ok() {
                tracing::debug!(
                    target = "collatz.bench",
                    micros,
                    error = %err,
                    "failed to record latency sample"
                );
            }
        }
    }

    pub fn summary(&self) -> LatencySummary {
        match &self.histogram {
            Some(histogram) if !histogram.is_empty() => LatencySummary {
                samples: histogram.len(),
                p50_us: histogram.value_at_quantile(0.50),
                p95_us: histogram.value_at_quantile(0.95),
                max_us: histogram.max(),
            },
            _ => LatencySummary::default(),
        }
    }
}

impl Default for LatencyRecorder {
    fn default() -> Self {
        Self::new()
    }
}
