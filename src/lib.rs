//! Hill Rover - Evolutionary behavior search for rover exploration.
//!
//! A single-candidate hill climber searches over three-gene differential
//! drive controllers, scored by a deterministic exploration simulation.
//! Independent runs fan out across a recycling worker pool that respects
//! CPU, memory and thermal budgets.
//!
//! # Architecture
//!
//! The crate is split into four modules:
//!
//! - `schema`: Configuration types, validation and serde defaults
//! - `sched`: Thread caps, worker budget, the recycling batch pool
//! - `search`: Genome, hill climber, multi-run orchestration, reports
//! - `sim`: The built-in exploration evaluator
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! use hill_rover::{ExperimentConfig, ExplorationEvaluator, run_experiment};
//!
//! let config = ExperimentConfig::default();
//! let evaluator = ExplorationEvaluator::new(config.world.clone());
//! let cancel = Arc::new(AtomicBool::new(false));
//!
//! let report = run_experiment(&config, evaluator, cancel).unwrap();
//! for run in &report.results {
//!     println!("run {}: fitness {} with {}", run.run_id, run.best_fitness, run.best_genome);
//! }
//! ```

pub mod sched;
pub mod schema;
pub mod search;
pub mod sim;

// Re-export commonly used types
pub use schema::ExperimentConfig;
pub use search::{
    ExperimentReport, HillClimber, ReportWriter, RunOutcome, RunResult, run_experiment,
};
pub use sim::ExplorationEvaluator;
