use serde::{Deserialize, Serialize};

/// Spread of the per-batch memory profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryEfficiency {
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// `(1 - std_dev / median) * 100`; `None` when the median is zero.
    pub stability_score: Option<f64>,
}

impl MemoryEfficiency {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let std_dev = std_dev(samples);
        let median = median(samples);
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let stability_score = (median != 0.0).then(|| (1.0 - std_dev / median) * 100.0);

        Self {
            median,
            std_dev,
            min,
            max,
            stability_score,
        }
    }
}

pub(crate) fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

pub(crate) fn median(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub(crate) fn std_dev(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean = mean(samples);
    let variance =
        samples.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}
