use crate::config::BenchConfig;
use crate::error::{BenchError, CacheMode};
use crate::latency::LatencyRecorder;
use crate::report::{BenchmarkReport, ConfigurationReport, Improvement, RangeSummary};
use crate::stats::{mean, MemoryEfficiency};
use collatz_engine::{
    Batch, BatchOutcome, LongestTrajectory, NumberResult, RangeBatcher, SequenceEngine,
};
use collatz_memory::MemoryPressure;
use std::time::{Duration, Instant};

/// Numbers past `start` covered by each warmup pass.
pub const WARMUP_SPAN: u64 = 100;

/// Drives cached and uncached runs of a [`SequenceEngine`] over a range.
#[derive(Debug, Clone)]
pub struct BenchmarkHarness {
    config: BenchConfig,
    batcher: RangeBatcher,
}

/// Measurements of one isolated `process_batch` run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMetrics {
    pub execution_time: Duration,
    /// Growth of process memory over the run, in bytes.
    pub memory_used: u64,
    /// Highest memory seen during the run above the starting point, in bytes.
    ///
    /// Only samples the rate-limited monitor actually took count, plus the
    /// final read. When the check interval outlasts the run this equals
    /// `memory_used`.
    pub peak_memory_used: u64,
    /// Pressure level of the highest absolute usage seen during the run.
    pub peak_pressure: MemoryPressure,
    pub cache_hit_count: u64,
    pub results: Vec<NumberResult>,
}

/// Per-batch averages across `sample_size` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAggregate {
    pub batch: Batch,
    pub average_time: Duration,
    pub average_memory: f64,
    /// Largest single-sample peak.
    pub peak_memory: u64,
    pub peak_pressure: MemoryPressure,
    pub average_cache_hits: f64,
    pub longest: Option<LongestTrajectory>,
}

#[derive(Debug, Default)]
struct Totals {
    total_time: Duration,
    memory_profile: Vec<f64>,
    peak_memory: u64,
    peak_pressure: MemoryPressure,
    cache_hits: f64,
    longest: Option<LongestTrajectory>,
    latency: LatencyRecorder,
}

impl Totals {
    fn add(&mut self, aggregate: &BatchAggregate) {
        self.total_time += aggregate.average_time;
        self.memory_profile.push(aggregate.average_memory);
        self.peak_memory = self.peak_memory.max(aggregate.peak_memory);
        self.peak_pressure = self.peak_pressure.max(aggregate.peak_pressure);
        self.cache_hits += aggregate.average_cache_hits;
        if let Some(candidate) = aggregate.longest {
            self.longest = Some(LongestTrajectory::merge(self.longest, candidate));
        }
    }

    fn into_report(self, batch_count: u64, numbers: u64) -> ConfigurationReport {
        let total_time_ms = duration_ms(self.total_time);
        let average_time_ms = if batch_count == 0 {
            0.0
        } else {
            total_time_ms / batch_count as f64
        };
        let cache_hit_rate = if numbers == 0 {
            0.0
        } else {
            self.cache_hits / numbers as f64 * 100.0
        };

        ConfigurationReport {
            total_time_ms,
            average_time_ms,
            average_memory_bytes: mean(&self.memory_profile),
            peak_memory_bytes: self.peak_memory,
            peak_pressure: self.peak_pressure,
            cache_hits: self.cache_hits,
            cache_hit_rate,
            max_steps: self.longest.map_or(0, |longest| longest.steps),
            longest: self.longest,
            memory_efficiency: MemoryEfficiency::from_samples(&self.memory_profile),
            latency: self.latency.summary(),
        }
    }
}

impl BenchmarkHarness {
    pub fn new(config: BenchConfig) -> Result<Self, BenchError> {
        config.validate()?;
        let batcher = RangeBatcher::new(config.batch_size)?;
        Ok(Self { config, batcher })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Benchmark `start..=end` with and without the engine's cache.
    ///
    /// Any failing batch aborts the whole run.
    pub fn compare_implementations(
        &self,
        engine: &mut SequenceEngine,
        start: u64,
        end: u64,
    ) -> Result<BenchmarkReport, BenchError> {
        if start == 0 || start > end {
            return Err(BenchError::InvalidRange { start, end });
        }

        tracing::info!(
            target = "collatz.bench",
            start,
            end,
            batch_size = self.config.batch_size,
            sample_size = self.config.sample_size,
            warmup_runs = self.config.warmup_runs,
            cache_size = engine.config().cache_size,
            "starting benchmark"
        );

        self.warmup(engine, start, end)?;

        let mut cached = Totals::default();
        let mut uncached = Totals::default();
        let mut batch_count = 0u64;
        let mut numbers = 0u64;

        for batch in self.batcher.generate_range(start, end) {
            let with_cache = self.measure_batch(engine, batch, CacheMode::Cached, &mut cached)?;
            let without_cache =
                self.measure_batch(engine, batch, CacheMode::Uncached, &mut uncached)?;
            cached.add(&with_cache);
            uncached.add(&without_cache);

            batch_count += 1;
            numbers = numbers.saturating_add(batch.len());

            tracing::debug!(
                target = "collatz.bench",
                start = batch.start,
                end = batch.end,
                cached_ms = duration_ms(with_cache.average_time),
                uncached_ms = duration_ms(without_cache.average_time),
                cached_hits = with_cache.average_cache_hits,
                "batch measured"
            );
        }

        let cached = cached.into_report(batch_count, numbers);
        let uncached = uncached.into_report(batch_count, numbers);
        let improvement = Improvement::between(&cached, &uncached);

        tracing::info!(
            target = "collatz.bench",
            batches = batch_count,
            numbers,
            cached_ms = cached.total_time_ms,
            uncached_ms = uncached.total_time_ms,
            speedup = improvement.speedup,
            "benchmark finished"
        );

        Ok(BenchmarkReport {
            range: RangeSummary {
                start,
                end,
                batch_count,
                numbers,
            },
            settings: self.config,
            cache_size: engine.config().cache_size,
            cached,
            uncached,
            improvement,
        })
    }

    /// One isolated run: cache cleared, reclamation requested, then timed.
    pub fn measure_sample(
        &self,
        engine: &mut SequenceEngine,
        batch: Batch,
        mode: CacheMode,
    ) -> Result<SampleMetrics, BenchError> {
        engine.clear_cache();
        engine.monitor_mut().request_reclaim();

        let baseline = engine.monitor_mut().current_usage().unwrap_or(0);
        engine.monitor_mut().reset_peak();

        let started = Instant::now();
        let outcome = engine.process_batch(batch.start, batch.end, mode.uses_cache());
        let execution_time = started.elapsed();

        let after = engine.monitor_mut().current_usage().unwrap_or(baseline);
        let peak = engine.monitor().peak_observed().max(after);

        let cache_hit_count = outcome.cache_hits();
        check_outcome(&outcome, batch, mode)?;

        Ok(SampleMetrics {
            execution_time,
            memory_used: after.saturating_sub(baseline),
            peak_memory_used: peak.saturating_sub(baseline),
            peak_pressure: engine.monitor().pressure_for(peak),
            cache_hit_count,
            results: outcome.results,
        })
    }

    fn measure_batch(
        &self,
        engine: &mut SequenceEngine,
        batch: Batch,
        mode: CacheMode,
        totals: &mut Totals,
    ) -> Result<BatchAggregate, BenchError> {
        let samples = self.config.sample_size.max(1);
        let mut total_time = Duration::ZERO;
        let mut total_memory = 0f64;
        let mut total_hits = 0f64;
        let mut peak_memory = 0u64;
        let mut peak_pressure = MemoryPressure::Low;
        let mut longest = None;

        for _ in 0..samples {
            let sample = self.measure_sample(engine, batch, mode)?;
            totals.latency.record(sample.execution_time);
            total_time += sample.execution_time;
            total_memory += sample.memory_used as f64;
            total_hits += sample.cache_hit_count as f64;
            peak_memory = peak_memory.max(sample.peak_memory_used);
            peak_pressure = peak_pressure.max(sample.peak_pressure);
            for result in &sample.results {
                longest = Some(LongestTrajectory::merge(
                    longest,
                    LongestTrajectory {
                        number: result.number,
                        steps: result.trajectory.steps,
                    },
                ));
            }
        }

        Ok(BatchAggregate {
            batch,
            average_time: total_time / samples,
            average_memory: total_memory / f64::from(samples),
            peak_memory,
            peak_pressure,
            average_cache_hits: total_hits / f64::from(samples),
            longest,
        })
    }

    fn warmup(&self, engine: &mut SequenceEngine, start: u64, end: u64) -> Result<(), BenchError> {
        if self.config.warmup_runs == 0 {
            return Ok(());
        }

        let warm_end = start.saturating_add(WARMUP_SPAN).min(end);
        let warm_batch = Batch {
            start,
            end: warm_end,
        };
        tracing::debug!(
            target = "collatz.bench",
            start,
            end = warm_end,
            runs = self.config.warmup_runs,
            "warming up"
        );

        for _ in 0..self.config.warmup_runs {
            for mode in [CacheMode::Cached, CacheMode::Uncached] {
                let outcome = engine.process_batch(start, warm_end, mode.uses_cache());
                check_outcome(&outcome, warm_batch, mode)?;
            }
        }

        engine.clear_cache();
        Ok(())
    }
}

// Skipped numbers would make the two configurations incomparable, so any
// failure recorded by the engine aborts the run.
fn check_outcome(outcome: &BatchOutcome, batch: Batch, mode: CacheMode) -> Result<(), BenchError> {
    let Some((number, source)) = outcome.first_failure() else {
        return Ok(());
    };
    Err(BenchError::Batch {
        start: batch.start,
        end: batch.end,
        mode,
        number: *number,
        failed: outcome.failures.len(),
        total: batch.len(),
        source: source.clone(),
    })
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}
