use collatz_memory::{MemoryMonitor, MemoryPressure, MemorySampler, MB};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
struct FakeSampler {
    usage: Arc<AtomicU64>,
    samples: Arc<AtomicUsize>,
    reclaims: Arc<AtomicUsize>,
}

impl FakeSampler {
    fn set_usage(&self, bytes: u64) {
        self.usage.store(bytes, Ordering::Relaxed);
    }
}

impl MemorySampler for FakeSampler {
    fn sample(&mut self) -> Option<u64> {
        self.samples.fetch_add(1, Ordering::Relaxed);
        Some(self.usage.load(Ordering::Relaxed))
    }

    fn reclaim(&mut self) -> bool {
        self.reclaims.fetch_add(1, Ordering::Relaxed);
        true
    }
}

struct BlindSampler;

impl MemorySampler for BlindSampler {
    fn sample(&mut self) -> Option<u64> {
        None
    }
}

#[test]
fn reports_pressure_above_threshold_and_requests_reclaim() {
    let sampler = FakeSampler::default();
    let mut monitor = MemoryMonitor::with_sampler(10, Duration::ZERO, Box::new(sampler.clone()));
    assert_eq!(monitor.threshold_bytes(), 10 * MB);

    sampler.set_usage(5 * MB);
    assert!(monitor.check_memory());
    assert_eq!(sampler.reclaims.load(Ordering::Relaxed), 0);

    sampler.set_usage(10 * MB);
    assert!(monitor.check_memory(), "usage equal to the threshold is not pressure");

    sampler.set_usage(11 * MB);
    assert!(!monitor.check_memory());
    assert_eq!(sampler.reclaims.load(Ordering::Relaxed), 1);
    assert_eq!(monitor.last_usage(), Some(11 * MB));
}

#[test]
fn checks_inside_interval_do_not_resample() {
    let sampler = FakeSampler::default();
    sampler.set_usage(100 * MB);
    let mut monitor =
        MemoryMonitor::with_sampler(10, Duration::from_secs(3600), Box::new(sampler.clone()));

    assert!(!monitor.check_memory());
    for _ in 0..100 {
        assert!(monitor.check_memory());
    }

    assert_eq!(sampler.samples.load(Ordering::Relaxed), 1);
    assert_eq!(monitor.samples(), 1);
    assert_eq!(monitor.checks(), 101);
}

#[test]
fn unknown_usage_is_never_pressure() {
    let mut monitor = MemoryMonitor::with_sampler(1, Duration::ZERO, Box::new(BlindSampler));
    assert!(monitor.check_memory());
    assert_eq!(monitor.pressure(), MemoryPressure::Low);
    assert_eq!(monitor.current_usage(), None);
    assert!(!monitor.request_reclaim());
}

#[test]
fn tracks_peak_until_reset() {
    let sampler = FakeSampler::default();
    let mut monitor = MemoryMonitor::with_sampler(100, Duration::ZERO, Box::new(sampler.clone()));

    sampler.set_usage(30 * MB);
    monitor.check_memory();
    sampler.set_usage(20 * MB);
    monitor.check_memory();
    assert_eq!(monitor.peak_observed(), 30 * MB);

    monitor.reset_peak();
    assert_eq!(monitor.peak_observed(), 0);
    assert_eq!(monitor.current_usage(), Some(20 * MB));
    assert_eq!(monitor.peak_observed(), 20 * MB);
}

#[test]
fn pressure_levels_follow_usage_ratio() {
    let sampler = FakeSampler::default();
    let mut monitor = MemoryMonitor::with_sampler(100, Duration::ZERO, Box::new(sampler.clone()));

    sampler.set_usage(10 * MB);
    assert_eq!(monitor.pressure(), MemoryPressure::Low);
    sampler.set_usage(90 * MB);
    assert_eq!(monitor.pressure(), MemoryPressure::High);
    sampler.set_usage(150 * MB);
    assert_eq!(monitor.pressure(), MemoryPressure::Critical);
}

#[test]
fn process_monitor_with_huge_threshold_reports_ok() {
    let mut monitor = MemoryMonitor::new(u64::MAX / MB);
    assert!(monitor.check_memory());
}

#[test]
fn pressure_for_does_not_sample() {
    let sampler = FakeSampler::default();
    let monitor = MemoryMonitor::with_sampler(100, Duration::ZERO, Box::new(sampler.clone()));

    assert_eq!(monitor.pressure_for(50 * MB), MemoryPressure::Low);
    assert_eq!(monitor.pressure_for(75 * MB), MemoryPressure::Medium);
    assert_eq!(monitor.pressure_for(100 * MB), MemoryPressure::High);
    assert_eq!(monitor.pressure_for(101 * MB), MemoryPressure::Critical);
    assert_eq!(sampler.samples.load(Ordering::Relaxed), 0);
    assert_eq!(monitor.samples(), 0);
}
