//! Search configuration for the hill-climbing behavior search.

use serde::{Deserialize, Serialize};

/// Configuration for the single-candidate hill climber and its runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of independent runs to perform.
    #[serde(default = "default_num_runs")]
    pub num_runs: usize,
    /// Run trajectories through the worker pool instead of sequentially.
    #[serde(default)]
    pub parallel: bool,
    /// Number of mutate-evaluate generations per run.
    #[serde(default = "default_num_generations")]
    pub num_generations: usize,
    /// Mutation probability per genome component (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Mutation strength (standard deviation for Gaussian noise).
    #[serde(default = "default_mutation_strength")]
    pub mutation_strength: f64,
    /// Genome parameter bounds.
    #[serde(default)]
    pub bounds: GenomeBounds,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_runs: default_num_runs(),
            parallel: false,
            num_generations: default_num_generations(),
            mutation_rate: default_mutation_rate(),
            mutation_strength: default_mutation_strength(),
            bounds: GenomeBounds::default(),
        }
    }
}

fn default_num_runs() -> usize {
    3
}
fn default_num_generations() -> usize {
    50
}
fn default_mutation_rate() -> f64 {
    0.3
}
fn default_mutation_strength() -> f64 {
    0.8
}

/// Genome parameter bounds.
///
/// Mutation clamps into the `slope`/`intercept` ranges; initialization draws
/// from the narrower `init_*` ranges, with intercepts biased positive so
/// fresh genomes tend to drive forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeBounds {
    /// Clamp range for gene slopes.
    #[serde(default = "default_slope_bounds")]
    pub slope: (f64, f64),
    /// Clamp range for gene intercepts.
    #[serde(default = "default_intercept_bounds")]
    pub intercept: (f64, f64),
    /// Initialization range for slopes.
    #[serde(default = "default_init_slope_bounds")]
    pub init_slope: (f64, f64),
    /// Initialization range for intercepts.
    #[serde(default = "default_init_intercept_bounds")]
    pub init_intercept: (f64, f64),
}

impl Default for GenomeBounds {
    fn default() -> Self {
        Self {
            slope: default_slope_bounds(),
            intercept: default_intercept_bounds(),
            init_slope: default_init_slope_bounds(),
            init_intercept: default_init_intercept_bounds(),
        }
    }
}

fn default_slope_bounds() -> (f64, f64) {
    (-10.0, 10.0)
}
fn default_intercept_bounds() -> (f64, f64) {
    (-3.0, 5.0)
}
fn default_init_slope_bounds() -> (f64, f64) {
    (-5.0, 5.0)
}
fn default_init_intercept_bounds() -> (f64, f64) {
    (0.5, 3.0)
}

/// Search configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchConfigError {
    #[error("Number of runs must be at least 1")]
    NoRuns,
    #[error("Mutation rate {0} must be within [0, 1]")]
    InvalidMutationRate(f64),
    #[error("Mutation strength {0} must be finite and non-negative")]
    InvalidMutationStrength(f64),
    #[error("Invalid genome bounds: {0}")]
    InvalidBounds(String),
}

impl SearchConfig {
    /// Validate search configuration.
    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if self.num_runs == 0 {
            return Err(SearchConfigError::NoRuns);
        }
        if !self.mutation_rate.is_finite() || !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SearchConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if !self.mutation_strength.is_finite() || self.mutation_strength < 0.0 {
            return Err(SearchConfigError::InvalidMutationStrength(
                self.mutation_strength,
            ));
        }

        let check_bounds = |bounds: (f64, f64), name: &str| {
            if !bounds.0.is_finite() || !bounds.1.is_finite() || bounds.0 > bounds.1 {
                Err(SearchConfigError::InvalidBounds(format!(
                    "{} min ({}) > max ({})",
                    name, bounds.0, bounds.1
                )))
            } else {
                Ok(())
            }
        };

        check_bounds(self.bounds.slope, "slope")?;
        check_bounds(self.bounds.intercept, "intercept")?;
        check_bounds(self.bounds.init_slope, "init_slope")?;
        check_bounds(self.bounds.init_intercept, "init_intercept")?;

        Ok(())
    }
}
