//! Candidate paint operations and the randomness that breeds them.
//!
//! A [`Command`] is one axis-aligned box fill: two unordered corners and a
//! block id. Commands never hold grid references; the grids are passed into
//! every operation that needs them.

use rand::prelude::*;

use crate::schema::CommandSnapshot;

use super::cache::FitnessCache;
use super::grid::{BoundingBox, VoxelGrid, normalize_corners};

/// A candidate (or committed) box-fill operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Monotonic identifier, assigned by the engine. Identity/debugging only.
    pub id: u64,
    /// Lineage depth.
    pub generation: u32,
    /// Fill block id.
    pub block: u8,
    /// First corner (unordered; min/max taken at use time).
    pub corner1: [i32; 3],
    /// Second corner.
    pub corner2: [i32; 3],
    /// Net change in matched-voxel count this command would produce if
    /// committed. Stale after mutation until re-evaluated.
    pub fitness: i64,
}

impl Command {
    pub fn new(id: u64, block: u8, corner1: [i32; 3], corner2: [i32; 3]) -> Self {
        Self {
            id,
            generation: 0,
            block,
            corner1,
            corner2,
            fitness: 0,
        }
    }

    /// Number of voxels in the inclusive box.
    pub fn volume(&self) -> u64 {
        (0..3)
            .map(|axis| (self.corner2[axis] - self.corner1[axis]).unsigned_abs() as u64 + 1)
            .product()
    }

    /// Spawn an independent copy of this command's geometry and block.
    ///
    /// Bumps this parent's generation counter and gives the child the
    /// pre-increment value. The lineage bookkeeping lives entirely in this
    /// method.
    pub fn reproduce(&mut self, id: u64) -> Command {
        let child_generation = self.generation;
        self.generation += 1;
        Command {
            id,
            generation: child_generation,
            block: self.block,
            corner1: self.corner1,
            corner2: self.corner2,
            fitness: 0,
        }
    }

    /// Apply this command's fill to a grid. The sole mechanism by which
    /// search results become permanent.
    pub fn execute(&self, grid: &mut VoxelGrid) {
        grid.fill_box(self.corner1, self.corner2, self.block);
    }

    /// Incremental fitness: the net change in matched-voxel count committing
    /// this command would produce, relative to `current`.
    ///
    /// O(volume) in the candidate's own footprint, never an O(size³) rescan.
    pub fn score(&self, current: &VoxelGrid, target: &VoxelGrid) -> i64 {
        let (min, max) = normalize_corners(self.corner1, self.corner2);
        let mut fitness = 0i64;
        for x in min[0]..=max[0] {
            for y in min[1]..=max[1] {
                for z in min[2]..=max[2] {
                    let tgt = target.get(x, y, z);
                    if self.block != tgt {
                        fitness -= 1;
                    } else if current.get(x, y, z) != tgt {
                        fitness += 1;
                    }
                }
            }
        }
        fitness
    }

    /// Score this command against `(current, target)`, memoizing through the
    /// cache when the box exceeds `large_volume_threshold` voxels.
    pub fn evaluate(
        &mut self,
        current: &VoxelGrid,
        target: &VoxelGrid,
        cache: &mut FitnessCache,
        large_volume_threshold: u64,
    ) {
        if self.volume() > large_volume_threshold {
            if let Some(hit) = cache.get(self) {
                self.fitness = hit;
                return;
            }
            let fitness = self.score(current, target);
            cache.put(self, fitness);
            self.fitness = fitness;
        } else {
            self.fitness = self.score(current, target);
        }
    }

    /// Serializable view for telemetry and the committed log.
    pub fn to_snapshot(&self) -> CommandSnapshot {
        CommandSnapshot {
            id: self.id,
            generation: self.generation,
            block: self.block,
            corner1: self.corner1,
            corner2: self.corner2,
            fitness: self.fitness,
            volume: self.volume(),
        }
    }
}

/// Random number generator wrapper owning all search randomness.
#[derive(Debug)]
pub struct SearchRng {
    rng: StdRng,
}

impl SearchRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with entropy seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed one candidate from the target grid inside the bounding box.
    ///
    /// Picks a uniformly random voxel in `bounds` as corner1, extends each
    /// axis by an edge length in `[1, max_seed_size]` (clamped back onto the
    /// box), and fills with the target's actual block at corner1 so seeds
    /// start as plausible fixes rather than pure noise.
    pub fn random_command(
        &mut self,
        id: u64,
        target: &VoxelGrid,
        bounds: &BoundingBox,
        max_seed_size: u32,
    ) -> Command {
        let mut corner1 = [0i32; 3];
        let mut corner2 = [0i32; 3];
        for axis in 0..3 {
            corner1[axis] = self.rng.gen_range(bounds.min[axis]..=bounds.max[axis]);
            let edge = self.rng.gen_range(1..=max_seed_size.max(1) as i32);
            corner2[axis] = bounds.clamp(axis, corner1[axis] + edge - 1);
        }
        let block = target.get(corner1[0] as usize, corner1[1] as usize, corner1[2] as usize);
        Command::new(id, block, corner1, corner2)
    }

    /// Mutate each of the six coordinates independently with probability
    /// `rate`, perturbing by `uniform(-amount, +amount)` rounded to the
    /// nearest integer and clamped onto `bounds`. Fitness is stale afterwards.
    pub fn mutate(&mut self, command: &mut Command, rate: f64, amount: f64, bounds: &BoundingBox) {
        for corner in [&mut command.corner1, &mut command.corner2] {
            for axis in 0..3 {
                if self.rng.r#gen::<f64>() < rate {
                    let jitter = self.rng.gen_range(-amount..=amount);
                    let moved = (corner[axis] as f64 + jitter).round() as i32;
                    corner[axis] = bounds.clamp(axis, moved);
                }
            }
        }
    }
}
