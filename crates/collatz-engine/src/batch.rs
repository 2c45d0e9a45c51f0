use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// An inclusive, contiguous sub-range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub start: u64,
    pub end: u64,
}

impl Batch {
    /// Number of integers covered by the batch.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    /// A batch always covers at least one number.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Splits integer ranges into batches of at most `batch_size` numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBatcher {
    batch_size: u64,
}

impl RangeBatcher {
    pub fn new(batch_size: u64) -> Result<Self> {
        if batch_size == 0 {
            return Err(EngineError::InvalidBatchSize);
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Lazily tile `[start, end]`. Each call starts a fresh iterator; an empty
    /// range (`start > end`) yields nothing.
    pub fn generate_range(&self, start: u64, end: u64) -> Batches {
        Batches {
            next: (start <= end).then_some(start),
            end,
            batch_size: self.batch_size,
        }
    }
}

/// Iterator returned by [`RangeBatcher::generate_range`].
#[derive(Debug, Clone)]
pub struct Batches {
    next: Option<u64>,
    end: u64,
    batch_size: u64,
}

impl Iterator for Batches {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let start = self.next?;
        let end = start
            .saturating_add(self.batch_size - 1)
            .min(self.end);
        self.next = if end < self.end { Some(end + 1) } else { None };
        Some(Batch { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            None => 0,
            Some(start) => {
                let numbers = u128::from(self.end - start) + 1;
                let batches = numbers.div_ceil(u128::from(self.batch_size));
                usize::try_from(batches).unwrap_or(usize::MAX)
            }
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches {}

impl FusedIterator for Batches {}
