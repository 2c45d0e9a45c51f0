use serde::{Deserialize, Serialize};

/// A Collatz trajectory from some start value down to 1.
///
/// `sequence.len() == steps + 1`, `sequence[0]` is the start value and the
/// last element is always 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    pub steps: u64,
    pub sequence: Vec<u64>,
    /// Whether any part of the trajectory was served from the cache.
    pub cache_hit: bool,
}

impl Trajectory {
    pub fn start(&self) -> Option<u64> {
        self.sequence.first().copied()
    }

    /// Highest value reached along the trajectory.
    pub fn peak(&self) -> u64 {
        self.sequence.iter().copied().max().unwrap_or(0)
    }

    pub fn is_well_formed(&self) -> bool {
        self.sequence.last() == Some(&1)
            && u64::try_from(self.sequence.len()).ok() == self.steps.checked_add(1)
    }
}

/// One entry of a processed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberResult {
    pub number: u64,
    #[serde(flatten)]
    pub trajectory: Trajectory,
}

/// The number with the longest trajectory seen in a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestTrajectory {
    pub number: u64,
    pub steps: u64,
}

impl LongestTrajectory {
    /// Keep the longer trajectory; on equal steps the smaller number wins.
    pub fn merge(current: Option<Self>, candidate: Self) -> Self {
        match current {
            Some(best)
                if best.steps > candidate.steps
                    || (best.steps == candidate.steps && best.number <= candidate.number) =>
            {
                best
            }
            _ => candidate,
        }
    }
}
