//! Fitness memoization for large candidates within one search episode.
//!
//! Entries are valid only while the working grid is unchanged; the engine
//! clears the cache on every executed commit. The key keeps corner order as
//! stored, so two spellings of the same box cache separately.

use std::collections::HashMap;

use super::command::Command;

/// Corners as stored (not min/max-normalized) plus the fill block.
type CacheKey = ([i32; 3], [i32; 3], u8);

/// Memoized fitness-by-geometry map.
#[derive(Debug, Default)]
pub struct FitnessCache {
    entries: HashMap<CacheKey, i64>,
}

impl FitnessCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(command: &Command) -> CacheKey {
        (command.corner1, command.corner2, command.block)
    }

    /// Cached fitness for this command's geometry, if present.
    pub fn get(&self, command: &Command) -> Option<i64> {
        self.entries.get(&Self::key(command)).copied()
    }

    /// Store a freshly computed fitness under this command's geometry.
    pub fn put(&mut self, command: &Command, fitness: i64) {
        self.entries.insert(Self::key(command), fitness);
    }

    /// Drop every entry. Must be called whenever a command is committed.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grid::VoxelGrid;

    #[test]
    fn test_hit_and_clear() {
        let mut cache = FitnessCache::new();
        let cmd = Command::new(0, 1, [1, 1, 1], [3, 3, 3]);

        assert_eq!(cache.get(&cmd), None);
        cache.put(&cmd, 27);
        assert_eq!(cache.get(&cmd), Some(27));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&cmd), None);
    }

    #[test]
    fn test_key_is_corner_order_sensitive() {
        let mut cache = FitnessCache::new();
        let a = Command::new(0, 1, [1, 1, 1], [3, 3, 3]);
        let b = Command::new(1, 1, [3, 3, 3], [1, 1, 1]);

        cache.put(&a, 27);
        // Same box, swapped corners: cached separately.
        assert_eq!(cache.get(&b), None);
        cache.put(&b, 27);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_key_includes_block() {
        let mut cache = FitnessCache::new();
        let solid = Command::new(0, 1, [1, 1, 1], [3, 3, 3]);
        let air = Command::new(1, 0, [1, 1, 1], [3, 3, 3]);

        cache.put(&solid, 27);
        assert_eq!(cache.get(&air), None);
    }

    #[test]
    fn test_cached_and_recomputed_agree() {
        let current = VoxelGrid::new(8);
        let mut target = VoxelGrid::new(8);
        target.fill_box([2, 2, 2], [4, 4, 4], 1);

        let mut cache = FitnessCache::new();
        // Threshold below the volume so both evaluations take the cache path.
        let mut first = Command::new(0, 1, [2, 2, 2], [4, 4, 4]);
        first.evaluate(&current, &target, &mut cache, 1);
        let mut second = Command::new(1, 1, [2, 2, 2], [4, 4, 4]);
        second.evaluate(&current, &target, &mut cache, 1);

        assert_eq!(first.fitness, 27);
        assert_eq!(second.fitness, first.fitness);
        assert_eq!(cache.len(), 1);
    }
}
