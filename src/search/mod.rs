//! Search module - the voxel grid model and the evolutionary paint engine.

mod cache;
mod command;
mod engine;
mod grid;
mod population;

pub use cache::*;
pub use command::*;
pub use engine::*;
pub use grid::*;
pub use population::*;
