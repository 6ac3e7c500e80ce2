//! The search-and-commit engine.
//!
//! Two nested loops: an episode loop that commits one command per iteration,
//! and a generation loop that evolves one population toward the next commit.
//! The engine is driven cooperatively: the host calls [`SearchEngine::step_for`]
//! with a wall-clock slice, and a generation or commit always runs to
//! completion once started.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::schema::{
    ConfigError, SearchConfig, SearchPhase, SearchProgress, SearchResult, SearchStats, StopReason,
};

use super::cache::FitnessCache;
use super::command::{Command, SearchRng};
use super::grid::{BoundingBox, VoxelGrid};
use super::population::Population;

/// Rolling history length used by the convergence check.
pub const HISTORY_WINDOW: usize = 50;

/// Default wall-clock slice per cooperative step (~one frame).
pub const DEFAULT_SLICE: Duration = Duration::from_millis(16);

/// Population-based search that approximates `target` by committing box
/// fills into `current`.
#[derive(Debug)]
pub struct SearchEngine {
    config: SearchConfig,
    rng: SearchRng,
    current: VoxelGrid,
    target: VoxelGrid,
    bounds: BoundingBox,
    population: Population,
    cache: FitnessCache,

    avg_history: VecDeque<f64>,
    best_history: VecDeque<i64>,
    likeness_history: Vec<f64>,

    generation: u64,
    episode_generation: u32,
    episodes: u64,
    executed: Vec<Command>,
    executed_cost: f64,
    likeness: f64,
    commits_since_likeness: u32,
    stalled_episodes: u32,
    next_id: u64,

    paused: bool,
    stop_reason: Option<StopReason>,
}

impl SearchEngine {
    /// Build an engine over an existing working grid.
    ///
    /// Fails fast on an invalid configuration, a non-power-of-two or
    /// malformed grid, or mismatched grid sizes.
    pub fn new(
        config: SearchConfig,
        target: VoxelGrid,
        current: VoxelGrid,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        check_grid(&target)?;
        check_grid(&current)?;
        if current.size() != target.size() {
            return Err(ConfigError::GridSizeMismatch {
                current: current.size(),
                target: target.size(),
            });
        }

        // All-air targets have no non-air box; fall back to the whole grid so
        // air paints can still erase a non-empty working grid.
        let bounds = target
            .bounding_box()
            .unwrap_or_else(|| BoundingBox::full(target.size()));

        let rng = match config.random_seed {
            Some(seed) => SearchRng::new(seed),
            None => SearchRng::random(),
        };

        let likeness = current.likeness(&target);

        let mut engine = Self {
            config,
            rng,
            current,
            target,
            bounds,
            population: Population::default(),
            cache: FitnessCache::new(),
            avg_history: VecDeque::with_capacity(HISTORY_WINDOW),
            best_history: VecDeque::with_capacity(HISTORY_WINDOW),
            likeness_history: vec![likeness],
            generation: 0,
            episode_generation: 0,
            episodes: 0,
            executed: Vec::new(),
            executed_cost: 0.0,
            likeness,
            commits_since_likeness: 0,
            stalled_episodes: 0,
            next_id: 0,
            paused: false,
            stop_reason: None,
        };

        // An already-solved target halts at the first check, before any
        // population is seeded or any command committed.
        if engine.likeness * 100.0 >= engine.config.stop_likeness {
            engine.halt(StopReason::LikenessReached);
        } else {
            engine.reseed();
        }
        Ok(engine)
    }

    /// Build an engine with a fresh all-air working grid.
    pub fn from_target(config: SearchConfig, target: VoxelGrid) -> Result<Self, ConfigError> {
        check_grid(&target)?;
        let current = VoxelGrid::new(target.size());
        Self::new(config, target, current)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn current(&self) -> &VoxelGrid {
        &self.current
    }

    pub fn target(&self) -> &VoxelGrid {
        &self.target
    }

    /// Append-only log of committed commands, in commit order.
    pub fn executed_log(&self) -> &[Command] {
        &self.executed
    }

    /// Last computed whole-grid likeness, as a fraction.
    pub fn likeness(&self) -> f64 {
        self.likeness
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn phase(&self) -> SearchPhase {
        if self.stop_reason.is_some() {
            SearchPhase::Halted
        } else if self.paused {
            SearchPhase::Paused
        } else {
            SearchPhase::Searching
        }
    }

    /// Suspend the search between steps.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Run whole generation iterations until the slice is exhausted or the
    /// engine leaves the searching phase. Never preempts mid-generation.
    pub fn step_for(&mut self, slice: Duration) -> SearchPhase {
        let start = Instant::now();
        while self.phase() == SearchPhase::Searching {
            self.step_generation();
            if start.elapsed() >= slice {
                break;
            }
        }
        self.phase()
    }

    /// Drive the engine to a halt, invoking `callback` after every slice.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> SearchResult
    where
        F: FnMut(&SearchProgress),
    {
        let start = Instant::now();
        callback(&self.progress());
        while self.phase() == SearchPhase::Searching {
            self.step_for(DEFAULT_SLICE);
            callback(&self.progress());
        }
        self.result(start.elapsed().as_secs_f64())
    }

    /// Run to a halt without progress reporting.
    pub fn run(&mut self) -> SearchResult {
        self.run_with_callback(|_| {})
    }

    /// Current progress snapshot for polling display layers.
    pub fn progress(&self) -> SearchProgress {
        SearchProgress {
            generation: self.generation,
            episode: self.episodes,
            commits: self.executed.len(),
            average_fitness: self.population.average_fitness(),
            best: self.population.best().map(Command::to_snapshot),
            likeness: self.likeness,
            executed_cost: self.executed_cost,
            stalled_episodes: self.stalled_episodes,
            best_history: self.best_history.iter().copied().collect(),
            avg_history: self.avg_history.iter().copied().collect(),
            likeness_history: self.likeness_history.clone(),
            phase: self.phase(),
            stop_reason: self.stop_reason,
        }
    }

    /// Final summary plus the committed log.
    pub fn result(&self, elapsed_seconds: f64) -> SearchResult {
        SearchResult {
            stats: SearchStats {
                commits: self.executed.len(),
                generations: self.generation,
                episodes: self.episodes,
                final_likeness: self.likeness,
                executed_cost: self.executed_cost,
                elapsed_seconds,
                stop_reason: self.stop_reason,
            },
            log: self.executed.iter().map(Command::to_snapshot).collect(),
        }
    }

    /// One generation-loop iteration: history bookkeeping, convergence and
    /// size-cap checks, then either a commit checkpoint or a new generation.
    fn step_generation(&mut self) {
        if self.population.is_empty() {
            warn!("empty population at generation {}; reseeding", self.generation);
            self.reseed();
            return;
        }

        self.generation += 1;
        self.episode_generation += 1;

        let average = self.population.average_fitness();
        let (best_fitness, best_volume) = self
            .population
            .best()
            .map(|b| (b.fitness, b.volume()))
            .unwrap_or((0, 0));

        if self.best_history.len() == HISTORY_WINDOW {
            self.best_history.pop_front();
            self.avg_history.pop_front();
        }
        self.best_history.push_back(best_fitness);
        self.avg_history.push_back(average);

        let converged = self.best_history.len() == HISTORY_WINDOW
            && self
                .best_history
                .iter()
                .all(|&f| f == self.best_history[0]);
        let oversized = best_volume > self.config.max_commit_volume;
        let capped = self.episode_generation >= self.config.generations;

        if converged || oversized || capped {
            self.commit_checkpoint();
        } else {
            self.breed();
        }
    }

    /// End of an episode: commit the best command if it improves the grid,
    /// otherwise record the stall; then reseed for the next episode.
    fn commit_checkpoint(&mut self) {
        let best = self.population.best().cloned();

        match best.filter(|b| b.fitness > 0) {
            Some(best) => {
                debug!(
                    "commit #{}: block {} {:?}..{:?} fitness {} volume {}",
                    self.executed.len(),
                    best.block,
                    best.corner1,
                    best.corner2,
                    best.fitness,
                    best.volume()
                );
                best.execute(&mut self.current);
                self.cache.clear();
                self.executed_cost += self.config.command_cost;
                self.executed.push(best);
                self.stalled_episodes = 0;

                self.commits_since_likeness += 1;
                if self.commits_since_likeness >= self.config.likeness_check_interval {
                    self.refresh_likeness();
                }
                self.check_stop();
            }
            None => {
                // No improving edit this episode; the grid is untouched, so
                // cache entries stay valid across the reseed.
                self.stalled_episodes += 1;
                warn!(
                    "no improving edit found (episode {}, {} consecutive)",
                    self.episodes, self.stalled_episodes
                );
                if self.stalled_episodes >= self.config.max_stalled_episodes {
                    self.halt(StopReason::NoImprovingEdit);
                }
            }
        }

        self.episodes += 1;
        if self.stop_reason.is_none() {
            self.reseed();
        }
    }

    /// Seed a fresh population from the target inside the bounding box.
    fn reseed(&mut self) {
        self.episode_generation = 0;
        self.avg_history.clear();
        self.best_history.clear();

        let mut population = Population::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            let id = self.alloc_id();
            population.push(self.rng.random_command(
                id,
                &self.target,
                &self.bounds,
                self.config.max_seed_size,
            ));
        }
        self.population = population;
        self.evaluate_population();
        self.population.sort();
    }

    /// Breed the next generation: the leading parent fraction survives, and
    /// children are bred round-robin from it until the population is back to
    /// size (conserved for any survivor rate).
    fn breed(&mut self) {
        let size = self.population.len();
        let parent_count = self.population.parent_count(self.config.survivor_rate);
        let mut parents = self.population.members()[..parent_count].to_vec();

        let mut children = Vec::with_capacity(size - parent_count);
        let mut slot = 0usize;
        while parents.len() + children.len() < size {
            let id = self.alloc_id();
            let mut child = parents[slot % parent_count].reproduce(id);
            self.rng.mutate(
                &mut child,
                self.config.mutation_rate,
                self.config.mutation_amount,
                &self.bounds,
            );
            children.push(child);
            slot += 1;
        }

        parents.extend(children);
        self.population = Population::from_members(parents);
        self.evaluate_population();
        self.population.sort();
    }

    /// Score the whole population. Large candidates are served from the
    /// cache; misses are scored in parallel (pure, so deterministic for a
    /// fixed seed) and large-volume results stored back.
    fn evaluate_population(&mut self) {
        let threshold = self.config.large_volume_threshold;

        let mut pending = Vec::with_capacity(self.population.len());
        for (i, command) in self.population.members_mut().iter_mut().enumerate() {
            if command.volume() > threshold {
                if let Some(hit) = self.cache.get(command) {
                    command.fitness = hit;
                    continue;
                }
            }
            pending.push(i);
        }

        let current = &self.current;
        let target = &self.target;
        let members = self.population.members();
        let scored: Vec<(usize, i64)> = pending
            .par_iter()
            .map(|&i| (i, members[i].score(current, target)))
            .collect();

        for (i, fitness) in scored {
            self.population.members_mut()[i].fitness = fitness;
            let command = &self.population.members()[i];
            if command.volume() > threshold {
                self.cache.put(command, fitness);
            }
        }
    }

    fn refresh_likeness(&mut self) {
        self.likeness = self.current.likeness(&self.target);
        self.likeness_history.push(self.likeness);
        self.commits_since_likeness = 0;
    }

    /// Global stop conditions, checked after each commit.
    fn check_stop(&mut self) {
        if self.likeness * 100.0 >= self.config.stop_likeness {
            self.halt(StopReason::LikenessReached);
        } else if self.executed_cost >= self.config.stop_time_budget {
            self.halt(StopReason::BudgetExhausted);
        }
    }

    fn halt(&mut self, reason: StopReason) {
        info!(
            "halting: {:?} (likeness {:.2}%, {} commits, cost {:.2}s)",
            reason,
            self.likeness * 100.0,
            self.executed.len(),
            self.executed_cost
        );
        self.stop_reason = Some(reason);
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn check_grid(grid: &VoxelGrid) -> Result<(), ConfigError> {
    if grid.size() == 0 || !grid.size().is_power_of_two() {
        return Err(ConfigError::SizeNotPowerOfTwo(grid.size()));
    }
    let expected = grid.size() * grid.size() * grid.size();
    if grid.blocks().len() != expected {
        return Err(ConfigError::GridDataLength {
            expected,
            actual: grid.blocks().len(),
        });
    }
    Ok(())
}
