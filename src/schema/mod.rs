//! Schema module - configuration and telemetry types for the paint search.

mod config;
mod telemetry;

pub use config::*;
pub use telemetry::*;
