//! Run configuration for the paint search.
//!
//! One immutable [`SearchConfig`] is constructed per run and passed by
//! reference into the engine; every tunable lives here, none on the engine.

use serde::{Deserialize, Serialize};

/// Tunables for one search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Candidates per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Per-coordinate mutation probability (0..1).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Maximum absolute coordinate perturbation per mutation.
    #[serde(default = "default_mutation_amount")]
    pub mutation_amount: f64,
    /// Leading fraction of the sorted population kept as parents (0..1].
    #[serde(default = "default_survivor_rate")]
    pub survivor_rate: f64,
    /// Per-episode generation cap; reaching it forces a commit checkpoint.
    #[serde(default = "default_generations")]
    pub generations: u32,
    /// Global halt threshold for grid likeness, in percent (0..100].
    #[serde(default = "default_stop_likeness")]
    pub stop_likeness: f64,
    /// Budget for cumulative executed-command cost, in seconds.
    #[serde(default = "default_stop_time_budget")]
    pub stop_time_budget: f64,
    /// Fixed execution-time weight charged per committed command, in seconds.
    #[serde(default = "default_command_cost")]
    pub command_cost: f64,
    /// A best candidate larger than this many voxels forces a commit.
    #[serde(default = "default_max_commit_volume")]
    pub max_commit_volume: u64,
    /// Candidates above this many voxels go through the fitness cache.
    #[serde(default = "default_large_volume_threshold")]
    pub large_volume_threshold: u64,
    /// Maximum per-axis edge length of freshly seeded candidates.
    #[serde(default = "default_max_seed_size")]
    pub max_seed_size: u32,
    /// Recompute whole-grid likeness every this many commits.
    #[serde(default = "default_likeness_check_interval")]
    pub likeness_check_interval: u32,
    /// Consecutive no-progress episodes before halting with
    /// [`StopReason::NoImprovingEdit`](crate::schema::StopReason::NoImprovingEdit).
    #[serde(default = "default_max_stalled_episodes")]
    pub max_stalled_episodes: u32,
    /// Random seed for reproducibility; `None` seeds from entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            mutation_amount: default_mutation_amount(),
            survivor_rate: default_survivor_rate(),
            generations: default_generations(),
            stop_likeness: default_stop_likeness(),
            stop_time_budget: default_stop_time_budget(),
            command_cost: default_command_cost(),
            max_commit_volume: default_max_commit_volume(),
            large_volume_threshold: default_large_volume_threshold(),
            max_seed_size: default_max_seed_size(),
            likeness_check_interval: default_likeness_check_interval(),
            max_stalled_episodes: default_max_stalled_episodes(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    64
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_mutation_amount() -> f64 {
    8.0
}
fn default_survivor_rate() -> f64 {
    0.5
}
fn default_generations() -> u32 {
    200
}
fn default_stop_likeness() -> f64 {
    99.5
}
fn default_stop_time_budget() -> f64 {
    60.0
}
fn default_command_cost() -> f64 {
    0.05
}
fn default_max_commit_volume() -> u64 {
    100_000
}
fn default_large_volume_threshold() -> u64 {
    1000
}
fn default_max_seed_size() -> u32 {
    2
}
fn default_likeness_check_interval() -> u32 {
    10
}
fn default_max_stalled_episodes() -> u32 {
    16
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Mutation rate must be within [0, 1], got {0}")]
    InvalidMutationRate(f64),
    #[error("Mutation amount must be non-negative and finite, got {0}")]
    InvalidMutationAmount(f64),
    #[error("Survivor rate must be within (0, 1], got {0}")]
    InvalidSurvivorRate(f64),
    #[error("Per-episode generation cap must be non-zero")]
    InvalidGenerations,
    #[error("Stop likeness must be within (0, 100], got {0}")]
    InvalidStopLikeness(f64),
    #[error("Time budget and per-command cost must be positive")]
    InvalidBudget,
    #[error("Commit volume cap and large-volume threshold must be non-zero")]
    InvalidVolumeLimits,
    #[error("Seed box edge length must be at least 1")]
    InvalidSeedSize,
    #[error("Likeness check interval must be non-zero")]
    InvalidLikenessInterval,
    #[error("Stalled episode limit must be non-zero")]
    InvalidStallLimit,
    #[error("Grid edge length {0} is not a power of two")]
    SizeNotPowerOfTwo(usize),
    #[error("Current grid size {current} does not match target grid size {target}")]
    GridSizeMismatch { current: usize, target: usize },
    #[error("Grid block data has {actual} entries, expected size³ = {expected}")]
    GridDataLength { expected: usize, actual: usize },
}

impl SearchConfig {
    /// Validate every knob. Checked once at engine construction; invalid
    /// configurations fail fast and are never coerced.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if !self.mutation_amount.is_finite() || self.mutation_amount < 0.0 {
            return Err(ConfigError::InvalidMutationAmount(self.mutation_amount));
        }
        if !(self.survivor_rate > 0.0 && self.survivor_rate <= 1.0) {
            return Err(ConfigError::InvalidSurvivorRate(self.survivor_rate));
        }
        if self.generations == 0 {
            return Err(ConfigError::InvalidGenerations);
        }
        if !(self.stop_likeness > 0.0 && self.stop_likeness <= 100.0) {
            return Err(ConfigError::InvalidStopLikeness(self.stop_likeness));
        }
        if self.stop_time_budget <= 0.0 || self.command_cost <= 0.0 {
            return Err(ConfigError::InvalidBudget);
        }
        if self.max_commit_volume == 0 || self.large_volume_threshold == 0 {
            return Err(ConfigError::InvalidVolumeLimits);
        }
        if self.max_seed_size == 0 {
            return Err(ConfigError::InvalidSeedSize);
        }
        if self.likeness_check_interval == 0 {
            return Err(ConfigError::InvalidLikenessInterval);
        }
        if self.max_stalled_episodes == 0 {
            return Err(ConfigError::InvalidStallLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let config = SearchConfig {
            population_size: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PopulationTooSmall)
        ));

        let config = SearchConfig {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMutationRate(_))
        ));

        let config = SearchConfig {
            survivor_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSurvivorRate(_))
        ));

        let config = SearchConfig {
            stop_likeness: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStopLikeness(_))
        ));
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let parsed: SearchConfig = serde_json::from_str(r#"{"population_size": 10}"#).unwrap();
        assert_eq!(parsed.population_size, 10);
        assert_eq!(parsed.generations, SearchConfig::default().generations);
        assert_eq!(parsed.random_seed, None);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = SearchConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.population_size, config.population_size);
        assert_eq!(parsed.stop_likeness, config.stop_likeness);
    }
}
