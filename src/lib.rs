//! Voxpaint - evolutionary box-fill approximation of 3D voxel structures.
//!
//! This crate approximates a target voxel grid by repeatedly discovering and
//! committing single axis-aligned paint operations (fill a box with one block
//! type) into a working grid. Each operation is picked by a population-based
//! stochastic search: candidates are seeded from the target inside its
//! bounding box, mutated asexually, scored by the net change in matched
//! voxels they would produce, and committed once the population converges.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and telemetry types
//! - `search`: The voxel grid model and the search-and-commit engine
//!
//! # Example
//!
//! ```rust,no_run
//! use voxpaint::{
//!     schema::SearchConfig,
//!     search::{SearchEngine, VoxelGrid},
//! };
//!
//! // Target: a solid 4x4x4 block inside a 16^3 world.
//! let mut target = VoxelGrid::new(16);
//! target.fill_box([4, 4, 4], [7, 7, 7], 1);
//!
//! let config = SearchConfig {
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//! let mut engine = SearchEngine::from_target(config, target).unwrap();
//!
//! let result = engine.run_with_callback(|p| {
//!     println!(
//!         "gen {}: {} commits, likeness {:.2}%",
//!         p.generation,
//!         p.commits,
//!         p.likeness * 100.0
//!     );
//! });
//!
//! println!("done: {} commands committed", result.stats.commits);
//! ```

pub mod schema;
pub mod search;

// Re-export commonly used types
pub use schema::{SearchConfig, SearchProgress, SearchResult, StopReason};
pub use search::{Command, SearchEngine, VoxelGrid};
