//! Top-level experiment configuration.

use serde::{Deserialize, Serialize};

use super::{
    SchedulerConfig, SchedulerConfigError, SearchConfig, SearchConfigError, WorldConfig,
    WorldConfigError,
};

/// Top-level configuration for a behavior-search experiment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExperimentConfig {
    /// Hill climber and run settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Worker pool settings for parallel runs.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Exploration world settings for the built-in evaluator.
    #[serde(default)]
    pub world: WorldConfig,
    /// Master seed for reproducibility; entropy when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Directory for per-run JSON artifacts; nothing is written when absent.
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl ExperimentConfig {
    /// Validate the whole configuration before any work is scheduled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        self.scheduler.validate()?;
        self.world.validate()?;
        Ok(())
    }
}

/// Experiment configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Search config invalid: {0}")]
    Search(#[from] SearchConfigError),
    #[error("Scheduler config invalid: {0}")]
    Scheduler(#[from] SchedulerConfigError),
    #[error("World config invalid: {0}")]
    World(#[from] WorldConfigError),
}
