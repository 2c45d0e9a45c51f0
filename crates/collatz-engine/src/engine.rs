use crate::cache::EvictionCache;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::trajectory::{LongestTrajectory, NumberResult, Trajectory};
use collatz_memory::{MemoryMonitor, ProcessSampler};
use std::sync::Arc;

// Upper bound on the up-front allocation for a batch's result vector.
const MAX_PREALLOCATED_RESULTS: u64 = 1 << 16;

/// Computes Collatz trajectories, memoizing completed ones in an
/// [`EvictionCache`] and clearing that cache when the [`MemoryMonitor`]
/// reports pressure.
#[derive(Debug)]
pub struct SequenceEngine {
    config: EngineConfig,
    cache: EvictionCache,
    monitor: MemoryMonitor,
}

/// Result of [`SequenceEngine::process_batch`].
///
/// Numbers whose computation fails are skipped and listed in `failures`;
/// `results` holds every number that succeeded, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub start: u64,
    pub end: u64,
    pub results: Vec<NumberResult>,
    /// Backpressure pauses taken while processing.
    pub pauses: u64,
    pub failures: Vec<(u64, EngineError)>,
}

impl BatchOutcome {
    fn empty(start: u64, end: u64) -> Self {
        let expected = end.saturating_sub(start).saturating_add(1);
        let capacity = if start > end {
            0
        } else {
            expected.min(MAX_PREALLOCATED_RESULTS) as usize
        };
        Self {
            start,
            end,
            results: Vec::with_capacity(capacity),
            pauses: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Earliest failing number and its error.
    pub fn first_failure(&self) -> Option<&(u64, EngineError)> {
        self.failures.first()
    }

    /// Number of results served at least partially from the cache.
    pub fn cache_hits(&self) -> u64 {
        self.results
            .iter()
            .filter(|result| result.trajectory.cache_hit)
            .count() as u64
    }

    pub fn longest(&self) -> Option<LongestTrajectory> {
        self.results.iter().fold(None, |best, result| {
            Some(LongestTrajectory::merge(
                best,
                LongestTrajectory {
                    number: result.number,
                    steps: result.trajectory.steps,
                },
            ))
        })
    }

    /// All results, or the first failure if any number failed.
    pub fn into_results(self) -> Result<Vec<NumberResult>> {
        match self.failures.into_iter().next() {
            None => Ok(self.results),
            Some((_, err)) => Err(err),
        }
    }
}

impl SequenceEngine {
    /// Build an engine that monitors the memory of the current process.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let monitor = MemoryMonitor::with_sampler(
            config.memory_threshold_mb,
            config.memory_check_interval,
            Box::new(ProcessSampler),
        );
        Self::with_monitor(config, monitor)
    }

    pub fn with_monitor(config: EngineConfig, monitor: MemoryMonitor) -> Result<Self> {
        config.validate()?;
        let cache = EvictionCache::new(config.cache_size)?;
        Ok(Self {
            config,
            cache,
            monitor,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &EvictionCache {
        &self.cache
    }

    pub fn monitor(&self) -> &MemoryMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut MemoryMonitor {
        &mut self.monitor
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Trajectory of `n` down to 1.
    ///
    /// With `use_cache`, a cached entry for `n` is returned as is, and a cached
    /// entry for any value reached on the way ends the walk early. Completed
    /// trajectories are stored under `n` only.
    pub fn calculate_sequence(&mut self, n: u64, use_cache: bool) -> Result<Trajectory> {
        if n == 0 {
            return Err(EngineError::InvalidInput { value: n });
        }

        if use_cache {
            if let Some(cached) = self.cache.get(n) {
                return Ok(Trajectory {
                    steps: cached.steps,
                    sequence: cached.sequence.clone(),
                    cache_hit: true,
                });
            }
        }

        let mut current = n;
        let mut steps = 0u64;
        let mut sequence = vec![n];
        let mut cache_hit = false;

        while current != 1 {
            if steps % self.config.memory_check_frequency == 0 && !self.monitor.check_memory() {
                self.clear_cache_under_pressure(n, steps);
            }

            if use_cache && current != n {
                if let Some(tail) = self.cache.get(current) {
                    steps = steps
                        .checked_add(tail.steps)
                        .ok_or(EngineError::Overflow {
                            value: current,
                            steps,
                        })?;
                    sequence.extend_from_slice(tail.sequence.get(1..).unwrap_or(&[]));
                    cache_hit = true;
                    break;
                }
            }

            current = next_value(current).ok_or(EngineError::Overflow {
                value: current,
                steps,
            })?;
            steps = steps.checked_add(1).ok_or(EngineError::Overflow {
                value: current,
                steps,
            })?;
            sequence.push(current);
        }

        if use_cache {
            self.cache.set(
                n,
                Arc::new(Trajectory {
                    steps,
                    sequence: sequence.clone(),
                    cache_hit: false,
                }),
            );
        }

        Ok(Trajectory {
            steps,
            sequence,
            cache_hit,
        })
    }

    /// Trajectories for every number in `start..=end`, in order.
    ///
    /// Under memory pressure the cache is cleared and the batch pauses briefly
    /// before the next number. Numbers that fail to compute are recorded and
    /// skipped; any other error ends the batch. See [`BatchOutcome`].
    pub fn process_batch(&mut self, start: u64, end: u64, use_cache: bool) -> BatchOutcome {
        let mut outcome = BatchOutcome::empty(start, end);
        if start > end {
            return outcome;
        }

        for number in start..=end {
            if !self.monitor.check_memory() {
                self.clear_cache_under_pressure(number, 0);
                self.pause_for_backpressure();
                outcome.pauses = outcome.pauses.saturating_add(1);
            }

            match self.calculate_sequence(number, use_cache) {
                Ok(trajectory) => outcome.results.push(NumberResult { number, trajectory }),
                Err(err) if err.is_computation_failure() => {
                    tracing::warn!(
                        target = "collatz.engine",
                        number,
                        start,
                        end,
                        error = %err,
                        "skipping number that failed to compute"
                    );
                    outcome.failures.push((number, err));
                }
                Err(err) => {
                    tracing::warn!(
                        target = "collatz.engine",
                        number,
                        start,
                        end,
                        completed = outcome.results.len(),
                        error = %err,
                        "batch aborted; returning partial results"
                    );
                    outcome.failures.push((number, err));
                    break;
                }
            }
        }

        outcome
    }

    /// The number in `start..=end` with the most steps (smallest number on ties).
    pub fn longest_in_range(&mut self, start: u64, end: u64) -> Result<Option<LongestTrajectory>> {
        if start == 0 {
            return Err(EngineError::InvalidInput { value: start });
        }
        if start > end {
            return Ok(None);
        }

        let mut best = None;
        for number in start..=end {
            let trajectory = self.calculate_sequence(number, true)?;
            best = Some(LongestTrajectory::merge(
                best,
                LongestTrajectory {
                    number,
                    steps: trajectory.steps,
                },
            ));
        }
        Ok(best)
    }

    fn clear_cache_under_pressure(&mut self, number: u64, steps: u64) {
        tracing::warn!(
            target = "collatz.engine",
            number,
            steps,
            entries = self.cache.len(),
            usage_bytes = self.monitor.last_usage(),
            "memory pressure; clearing trajectory cache"
        );
        self.cache.clear();
    }

    // Named backpressure step of `process_batch`; only timing changes.
    fn pause_for_backpressure(&self) {
        if !self.config.pressure_pause.is_zero() {
            std::thread::sleep(self.config.pressure_pause);
        }
    }
}

fn next_value(current: u64) -> Option<u64> {
    if current % 2 == 0 {
        Some(current / 2)
    } else {
        current.checked_mul(3)?.checked_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_value_halves_even_and_triples_odd() {
        assert_eq!(next_value(10), Some(5));
        assert_eq!(next_value(5), Some(16));
        assert_eq!(next_value(u64::MAX), None);
        assert_eq!(next_value(u64::MAX - 1), Some(u64::MAX / 2));
    }

    #[test]
    fn empty_outcome_for_reversed_range() {
        let outcome = BatchOutcome::empty(5, 4);
        assert!(outcome.results.is_empty());
        assert!(outcome.is_complete());
        assert_eq!(outcome.longest(), None);
    }
}
