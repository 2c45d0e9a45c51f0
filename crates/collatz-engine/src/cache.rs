use crate::error::{EngineError, Result};
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Fixed-capacity trajectory cache with least-frequently-used eviction.
///
/// Every hit and every write bumps the key's usage counter. When a new key is
/// inserted into a full cache, the entry with the lowest counter is evicted;
/// among equal counters the one inserted first goes.
#[derive(Debug)]
pub struct EvictionCache {
    capacity: usize,
    map: HashMap<u64, CacheEntry>,
    // (usage count, insertion sequence, key); the first element is the next victim.
    ranking: BTreeSet<(u64, u64, u64)>,
    next_seq: u64,
    stats: CacheStats,
}

#[derive(Debug)]
struct CacheEntry {
    value: Arc<Trajectory>,
    uses: u64,
    seq: u64,
}

/// Lifetime counters for an [`EvictionCache`]. Not reset by `clear`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
    pub clears: u64,
}

impl EvictionCache {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EngineError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            map: HashMap::new(),
            ranking: BTreeSet::new(),
            next_seq: 0,
            stats: CacheStats::default(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Membership test that does not count as a use.
    pub fn contains(&self, key: u64) -> bool {
        self.map.contains_key(&key)
    }

    /// Current usage counter for `key`.
    pub fn uses(&self, key: u64) -> Option<u64> {
        self.map.get(&key).map(|entry| entry.uses)
    }

    pub fn get(&mut self, key: u64) -> Option<Arc<Trajectory>> {
        let Some(entry) = self.map.get_mut(&key) else {
            self.stats.misses = self.stats.misses.saturating_add(1);
            return None;
        };

        self.ranking.remove(&(entry.uses, entry.seq, key));
        entry.uses = entry.uses.saturating_add(1);
        self.ranking.insert((entry.uses, entry.seq, key));
        self.stats.hits = self.stats.hits.saturating_add(1);
        Some(entry.value.clone())
    }

    pub fn set(&mut self, key: u64, value: Arc<Trajectory>) {
        if let Some(entry) = self.map.get_mut(&key) {
            self.ranking.remove(&(entry.uses, entry.seq, key));
            entry.uses = entry.uses.saturating_add(1);
            entry.value = value;
            self.ranking.insert((entry.uses, entry.seq, key));
            return;
        }

        if self.map.len() >= self.capacity {
            self.evict_one();
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.map.insert(key, CacheEntry { value, uses: 1, seq });
        self.ranking.insert((1, seq, key));
        self.stats.inserts = self.stats.inserts.saturating_add(1);
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.ranking.clear();
        self.next_seq = 0;
        self.stats.clears = self.stats.clears.saturating_add(1);
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn evict_one(&mut self) {
        let Some((uses, _seq, key)) = self.ranking.pop_first() else {
            return;
        };
        self.map.remove(&key);
        self.stats.evictions = self.stats.evictions.saturating_add(1);
        tracing::trace!(target = "collatz.engine", key, uses, "evicted cache entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(start: u64) -> Arc<Trajectory> {
        Arc::new(Trajectory {
            steps: 0,
            sequence: vec![start],
            cache_hit: false,
        })
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(EvictionCache::new(0).unwrap_err(), EngineError::InvalidCapacity);
    }

    #[test]
    fn equal_counters_evict_earliest_insert() {
        let mut cache = EvictionCache::new(2).unwrap();
        cache.set(1, trajectory(1));
        cache.set(2, trajectory(2));
        cache.set(3, trajectory(3));

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert!(cache.contains(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn frequently_read_entries_survive() {
        let mut cache = EvictionCache::new(2).unwrap();
        cache.set(1, trajectory(1));
        cache.set(2, trajectory(2));
        assert!(cache.get(1).is_some());
        assert!(cache.get(1).is_some());

        cache.set(3, trajectory(3));
        assert!(cache.contains(1));
        assert!(!cache.contains(2));

        // 3 has one use, 1 has three; 3 goes next.
        cache.set(4, trajectory(4));
        assert!(cache.contains(1));
        assert!(!cache.contains(3));
        assert!(cache.contains(4));
    }

    #[test]
    fn overwriting_existing_key_bumps_counter_without_eviction() {
        let mut cache = EvictionCache::new(2).unwrap();
        cache.set(1, trajectory(1));
        cache.set(2, trajectory(2));
        cache.set(1, trajectory(1));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.uses(1), Some(2));
        assert_eq!(cache.stats().evictions, 0);

        cache.set(3, trajectory(3));
        assert!(cache.contains(1));
        assert!(!cache.contains(2));
    }

    #[test]
    fn miss_does_not_create_counter() {
        let mut cache = EvictionCache::new(4).unwrap();
        assert!(cache.get(42).is_none());
        assert_eq!(cache.uses(42), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn clear_drops_entries_and_counters() {
        let mut cache = EvictionCache::new(3).unwrap();
        cache.set(1, trajectory(1));
        cache.get(1);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.uses(1), None);
        cache.set(1, trajectory(1));
        assert_eq!(cache.uses(1), Some(1));
        assert_eq!(cache.stats().clears, 1);
    }

    #[test]
    fn tie_break_restarts_from_insertions_after_clear() {
        let mut cache = EvictionCache::new(2).unwrap();
        cache.set(1, trajectory(1));
        cache.set(2, trajectory(2));
        for _ in 0..3 {
            assert!(cache.get(1).is_some());
        }
        cache.clear();

        // Re-inserted in the opposite order; 1 no longer carries its old reads.
        cache.set(2, trajectory(2));
        cache.set(1, trajectory(1));
        assert_eq!(cache.uses(1), Some(1));
        assert_eq!(cache.uses(2), Some(1));

        cache.set(3, trajectory(3));
        assert!(!cache.contains(2));
        assert!(cache.contains(1));
        assert!(cache.contains(3));

        // 1 was inserted before 3 since the clear, so it goes next.
        cache.set(4, trajectory(4));
        assert!(!cache.contains(1));
        assert!(cache.contains(3));
        assert!(cache.contains(4));
        assert_eq!(cache.stats().evictions, 2);
    }
}
