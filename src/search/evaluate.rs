//! The evaluator seam between the search and whatever produces fitness.

use serde::{Deserialize, Serialize};

use super::genome::Genome;

/// Value payload handed to an evaluator for one candidate.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest {
    pub genome: Genome,
    pub generation: usize,
    pub run_id: usize,
}

/// Replay data for a genome, attached to run artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTrace {
    /// Position per control tick.
    pub trajectory: Vec<(f64, f64)>,
    /// Unique occupancy-grid cells visited.
    pub cells_visited: usize,
}

/// Evaluation failures, fatal to the run that requested them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    #[error("evaluation failed: {0}")]
    Failed(String),
    #[error("evaluator produced invalid fitness {0}")]
    InvalidFitness(f64),
}

/// Maps a candidate genome to a scalar fitness.
///
/// Implementations must be pure apart from randomness derived from the
/// request, and travel by value into worker threads, so useful evaluators
/// are `Clone` as well as `Send`.
pub trait Evaluator: Send {
    /// Score one candidate. Larger is better; scores must be finite and
    /// non-negative.
    fn evaluate(&self, request: &EvaluationRequest) -> Result<f64, EvalError>;

    /// Replay a genome and return its trajectory for reporting.
    fn trace(&self, _genome: &Genome) -> Option<RunTrace> {
        None
    }
}

/// Enforce the fitness contract at the boundary.
pub(crate) fn checked_fitness(fitness: f64) -> Result<f64, EvalError> {
    if fitness.is_finite() && fitness >= 0.0 {
        Ok(fitness)
    } else {
        Err(EvalError::InvalidFitness(fitness))
    }
}

/// Closure adapter, for tests and for embedding the search over an ad hoc
/// fitness function.
#[derive(Clone)]
pub struct FnEvaluator<F>(pub F);

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&EvaluationRequest) -> Result<f64, EvalError> + Send + Sync,
{
    fn evaluate(&self, request: &EvaluationRequest) -> Result<f64, EvalError> {
        (self.0)(request)
    }
}
