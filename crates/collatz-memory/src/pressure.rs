use serde::{Deserialize, Serialize};

/// Coarse-grained memory pressure levels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPressure {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Thresholds for computing [`MemoryPressure`] from `usage / threshold`.
///
/// `Critical` is the level at which [`crate::MemoryMonitor::check_memory`]
/// reports pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryPressureThresholds {
    /// Enter `Medium` when `usage / threshold >= medium`.
    pub medium: f64,
    /// Enter `High` when `usage / threshold >= high`.
    pub high: f64,
    /// Enter `Critical` when `usage / threshold > critical`.
    pub critical: f64,
}

impl Default for MemoryPressureThresholds {
    fn default() -> Self {
        Self {
            medium: 0.70,
            high: 0.85,
            critical: 1.0,
        }
    }
}

impl MemoryPressureThresholds {
    pub fn level_for_ratio(self, ratio: f64) -> MemoryPressure {
        if ratio > self.critical {
            MemoryPressure::Critical
        } else if ratio >= self.high {
            MemoryPressure::High
        } else if ratio >= self.medium {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }

    pub fn level_for_usage(self, usage_bytes: u64, threshold_bytes: u64) -> MemoryPressure {
        let ratio = (usage_bytes as f64) / (threshold_bytes.max(1) as f64);
        self.level_for_ratio(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_only_strictly_above_threshold() {
        let thresholds = MemoryPressureThresholds::default();
        assert_eq!(thresholds.level_for_usage(100, 100), MemoryPressure::High);
        assert_eq!(thresholds.level_for_usage(101, 100), MemoryPressure::Critical);
        assert_eq!(thresholds.level_for_usage(70, 100), MemoryPressure::Medium);
        assert_eq!(thresholds.level_for_usage(0, 100), MemoryPressure::Low);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&MemoryPressure::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn as_str_matches_serialized_name() {
        for level in [
            MemoryPressure::Low,
            MemoryPressure::Medium,
            MemoryPressure::High,
            MemoryPressure::Critical,
        ] {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
    }
}
