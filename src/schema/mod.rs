//! Schema module - Configuration types for behavior-search experiments.

mod config;
mod scheduler;
mod search;
mod world;

pub use config::*;
pub use scheduler::*;
pub use search::*;
pub use world::*;
