//! Telemetry types polled by display layers and returned from runs.

use serde::{Deserialize, Serialize};

/// Serializable view of a command, for progress snapshots and the
/// committed log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandSnapshot {
    pub id: u64,
    pub generation: u32,
    pub block: u8,
    pub corner1: [i32; 3],
    pub corner2: [i32; 3],
    pub fitness: i64,
    pub volume: u64,
}

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchPhase {
    /// Actively evolving and committing.
    Searching,
    /// Suspended by the caller; resumable.
    Paused,
    /// A stop condition fired; resumable only by raising the budget.
    Halted,
}

/// Why the engine halted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Whole-grid likeness reached the configured threshold.
    LikenessReached,
    /// Cumulative executed-command cost exhausted the time budget.
    BudgetExhausted,
    /// Too many consecutive episodes produced no improving edit.
    NoImprovingEdit,
}

/// Polled progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProgress {
    /// Total generations across all episodes.
    pub generation: u64,
    /// Episodes completed (commit checkpoints passed).
    pub episode: u64,
    /// Commands committed so far.
    pub commits: usize,
    /// Mean fitness of the current population. Diagnostic only.
    pub average_fitness: f64,
    /// Current best candidate, if a population exists.
    pub best: Option<CommandSnapshot>,
    /// Last computed whole-grid likeness, as a fraction.
    pub likeness: f64,
    /// Cumulative executed-command cost in seconds.
    pub executed_cost: f64,
    /// Consecutive episodes that ended without an improving edit.
    pub stalled_episodes: u32,
    /// Rolling best-fitness history for the current episode.
    pub best_history: Vec<i64>,
    /// Rolling average-fitness history for the current episode.
    pub avg_history: Vec<f64>,
    /// Likeness values recorded at each periodic check.
    pub likeness_history: Vec<f64>,
    pub phase: SearchPhase,
    pub stop_reason: Option<StopReason>,
}

/// Final statistics for a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStats {
    pub commits: usize,
    pub generations: u64,
    pub episodes: u64,
    pub final_likeness: f64,
    pub executed_cost: f64,
    pub elapsed_seconds: f64,
    pub stop_reason: Option<StopReason>,
}

/// Everything a caller needs after a run: summary stats plus the
/// append-only log of committed commands, in commit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub stats: SearchStats,
    pub log: Vec<CommandSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serialization_roundtrip() {
        let result = SearchResult {
            stats: SearchStats {
                commits: 3,
                generations: 120,
                episodes: 4,
                final_likeness: 0.997,
                executed_cost: 0.15,
                elapsed_seconds: 1.25,
                stop_reason: Some(StopReason::LikenessReached),
            },
            log: vec![CommandSnapshot {
                id: 0,
                generation: 2,
                block: 1,
                corner1: [1, 2, 3],
                corner2: [4, 5, 6],
                fitness: 27,
                volume: 64,
            }],
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.stats.commits, 3);
        assert_eq!(parsed.stats.stop_reason, Some(StopReason::LikenessReached));
        assert_eq!(parsed.log[0].volume, 64);
    }
}
