//! Single-candidate hill climbing over genomes.
//!
//! One trajectory of greedy local search: propose a mutated candidate,
//! evaluate it, keep it when it is not worse. Ties are accepted on
//! purpose, so the walk can drift across fitness plateaus instead of
//! getting pinned to the first genome that reached them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::schema::SearchConfig;

use super::evaluate::{EvalError, EvaluationRequest, Evaluator, checked_fitness};
use super::genome::{Genome, GenomeRng};

/// Why a climb stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The generation budget ran out.
    Completed,
    /// The shared cancel flag was set mid-climb.
    Cancelled,
}

/// Per-generation progress snapshot.
#[derive(Debug, Clone)]
pub struct ClimbProgress {
    pub run_id: usize,
    pub generation: usize,
    pub total_generations: usize,
    pub candidate_fitness: f64,
    pub current_fitness: f64,
    pub best_fitness: f64,
    pub accepted: bool,
    pub new_best: bool,
}

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(&ClimbProgress) + Send + Sync>;

/// Final snapshot of one climb.
#[derive(Debug, Clone)]
pub struct ClimbOutcome {
    pub best_genome: Genome,
    pub best_fitness: f64,
    /// Accepted fitness per generation, including generation 0; its length
    /// is always `generations run + 1`.
    pub fitness_history: Vec<f64>,
    pub stop_reason: StopReason,
}

/// One local-search trajectory over a borrowed evaluator.
pub struct HillClimber<'a, E> {
    config: &'a SearchConfig,
    evaluator: &'a E,
    run_id: usize,
    rng: GenomeRng,
    cancelled: Arc<AtomicBool>,
}

impl<'a, E: Evaluator> HillClimber<'a, E> {
    pub fn new(config: &'a SearchConfig, evaluator: &'a E, run_id: usize, seed: u64) -> Self {
        Self {
            config,
            evaluator,
            run_id,
            rng: GenomeRng::new(seed),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancel flag with the orchestrator.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn evaluate(&self, genome: Genome, generation: usize) -> Result<f64, EvalError> {
        let request = EvaluationRequest {
            genome,
            generation,
            run_id: self.run_id,
        };
        self.evaluator.evaluate(&request).and_then(checked_fitness)
    }

    /// Run the climb (blocking).
    pub fn run(&mut self) -> Result<ClimbOutcome, EvalError> {
        self.run_with_callback(|_| {})
    }

    /// Run the climb, reporting per-generation progress.
    ///
    /// Any evaluator error aborts this run and propagates; there is no
    /// retry here. The orchestrator isolates one run's failure from the
    /// others.
    pub fn run_with_callback<F>(&mut self, callback: F) -> Result<ClimbOutcome, EvalError>
    where
        F: Fn(&ClimbProgress),
    {
        let bounds = self.config.bounds.clone();

        let mut current_genome = self.rng.random_genome(&bounds);
        let mut current_fitness = self.evaluate(current_genome, 0)?;
        let mut best_genome = current_genome;
        let mut best_fitness = current_fitness;
        let mut fitness_history = vec![current_fitness];
        info!(
            "run {}: initial genome {} fitness {}",
            self.run_id, current_genome, current_fitness
        );

        let mut stop_reason = StopReason::Completed;
        for generation in 1..=self.config.num_generations {
            if self.cancelled.load(Ordering::Relaxed) {
                stop_reason = StopReason::Cancelled;
                break;
            }

            let candidate = self.rng.mutate_genome(
                &current_genome,
                self.config.mutation_rate,
                self.config.mutation_strength,
                &bounds,
            );
            let candidate_fitness = self.evaluate(candidate, generation)?;

            // Equal fitness is accepted; rejection leaves the current
            // genome untouched for this generation.
            let accepted = candidate_fitness >= current_fitness;
            if accepted {
                current_genome = candidate;
                current_fitness = candidate_fitness;
            }
            let new_best = current_fitness > best_fitness;
            if new_best {
                best_genome = current_genome;
                best_fitness = current_fitness;
                debug!(
                    "run {}: new best {} at generation {}",
                    self.run_id, best_fitness, generation
                );
            }
            fitness_history.push(current_fitness);

            callback(&ClimbProgress {
                run_id: self.run_id,
                generation,
                total_generations: self.config.num_generations,
                candidate_fitness,
                current_fitness,
                best_fitness,
                accepted,
                new_best,
            });
        }

        Ok(ClimbOutcome {
            best_genome,
            best_fitness,
            fitness_history,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::FnEvaluator;
    use std::sync::Mutex;

    fn intercept_evaluator() -> FnEvaluator<impl Fn(&EvaluationRequest) -> Result<f64, EvalError>>
    {
        // Deterministic: fitness follows the first gene's intercept,
        // shifted into non-negative territory by its lower bound.
        FnEvaluator(|request: &EvaluationRequest| Ok(request.genome.genes[0].intercept + 3.0))
    }

    #[test]
    fn test_zero_generations_history_has_one_entry() {
        let config = SearchConfig {
            num_generations: 0,
            ..Default::default()
        };
        let evaluator = intercept_evaluator();
        let outcome = HillClimber::new(&config, &evaluator, 0, 9).run().unwrap();

        assert_eq!(outcome.fitness_history.len(), 1);
        assert_eq!(outcome.best_fitness, outcome.fitness_history[0]);
        assert_eq!(
            outcome.best_fitness,
            outcome.best_genome.genes[0].intercept + 3.0
        );
        assert_eq!(outcome.stop_reason, StopReason::Completed);
    }

    #[test]
    fn test_history_length_is_generations_plus_one() {
        let evaluator = intercept_evaluator();
        for num_generations in [1, 5, 20] {
            let config = SearchConfig {
                num_generations,
                ..Default::default()
            };
            let outcome = HillClimber::new(&config, &evaluator, 0, 1).run().unwrap();
            assert_eq!(outcome.fitness_history.len(), num_generations + 1);
        }
    }

    #[test]
    fn test_best_fitness_is_monotone() {
        let config = SearchConfig {
            num_generations: 30,
            mutation_rate: 1.0,
            ..Default::default()
        };
        let evaluator = intercept_evaluator();
        let best_seen = Mutex::new(f64::NEG_INFINITY);
        let outcome = HillClimber::new(&config, &evaluator, 0, 77)
            .run_with_callback(|progress| {
                let mut best = best_seen.lock().unwrap();
                assert!(progress.best_fitness >= *best);
                *best = progress.best_fitness;
            })
            .unwrap();
        assert_eq!(outcome.best_fitness, *best_seen.lock().unwrap());
    }

    #[test]
    fn test_fixed_seed_reproduces_run_exactly() {
        let config = SearchConfig {
            num_generations: 5,
            mutation_rate: 1.0,
            ..Default::default()
        };
        let evaluator = intercept_evaluator();

        let first = HillClimber::new(&config, &evaluator, 0, 123).run().unwrap();
        let second = HillClimber::new(&config, &evaluator, 0, 123).run().unwrap();

        assert_eq!(first.best_genome, second.best_genome);
        assert_eq!(first.fitness_history, second.fitness_history);
        // Best is the maximum accepted fitness over the whole history.
        let max = first
            .fitness_history
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(first.best_fitness, max);
    }

    #[test]
    fn test_rejection_keeps_current_fitness() {
        // Fitness shrinks every generation, so nothing after generation 0
        // is ever accepted and the history stays flat.
        let config = SearchConfig {
            num_generations: 4,
            mutation_rate: 1.0,
            ..Default::default()
        };
        let calls = Mutex::new(0usize);
        let evaluator = FnEvaluator(|_: &EvaluationRequest| {
            let mut calls = calls.lock().unwrap();
            *calls += 1;
            Ok(100.0 / *calls as f64)
        });
        let outcome = HillClimber::new(&config, &evaluator, 0, 2).run().unwrap();
        assert!(outcome.fitness_history.iter().all(|&f| f == 100.0));
        assert_eq!(outcome.best_fitness, 100.0);
    }

    #[test]
    fn test_evaluator_error_aborts_run() {
        let config = SearchConfig {
            num_generations: 10,
            ..Default::default()
        };
        let evaluator =
            FnEvaluator(|request: &EvaluationRequest| {
                if request.generation >= 2 {
                    Err(EvalError::Failed("sensor fault".to_string()))
                } else {
                    Ok(1.0)
                }
            });
        let result = HillClimber::new(&config, &evaluator, 0, 4).run();
        assert!(matches!(result, Err(EvalError::Failed(_))));
    }

    #[test]
    fn test_invalid_fitness_is_rejected_at_boundary() {
        let config = SearchConfig::default();
        let evaluator = FnEvaluator(|_: &EvaluationRequest| Ok(-5.0));
        let result = HillClimber::new(&config, &evaluator, 0, 4).run();
        assert!(matches!(result, Err(EvalError::InvalidFitness(_))));
    }

    #[test]
    fn test_cancellation_returns_partial_state() {
        let config = SearchConfig {
            num_generations: 100,
            ..Default::default()
        };
        let evaluator = intercept_evaluator();
        let mut climber = HillClimber::new(&config, &evaluator, 0, 6);
        let cancel = climber.cancel_handle();

        let outcome = climber
            .run_with_callback(|progress| {
                if progress.generation == 3 {
                    cancel.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(outcome.fitness_history.len(), 4);
    }
}
