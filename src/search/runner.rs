//! Multi-run orchestration.
//!
//! Launches `num_runs` independent climbs, each with its own derived seed,
//! its own copy of the search settings and its own evaluator value, either
//! in-process or fanned out across the worker pool. One run's failure
//! never touches the others.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{info, warn};
use serde::Serialize;

use crate::sched::{TaskError, apply_thread_caps, resolve_pool_settings, run_batches};
use crate::schema::{ConfigError, ExperimentConfig, SearchConfig};

use super::climber::HillClimber;
use super::evaluate::{EvalError, Evaluator, RunTrace};
use super::genome::{Genome, GenomeRng};

/// Outcome of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: usize,
    pub best_genome: Genome,
    pub best_fitness: f64,
    pub fitness_history: Vec<f64>,
    /// Replay of the best genome, when the evaluator supports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<RunTrace>,
}

/// Failures fatal to a single run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunError {
    #[error("run {run_id} evaluation failed: {source}")]
    Eval {
        run_id: usize,
        #[source]
        source: EvalError,
    },
    #[error("run {run_id} panicked: {message}")]
    Panic { run_id: usize, message: String },
}

impl RunError {
    pub fn run_id(&self) -> usize {
        match self {
            RunError::Eval { run_id, .. } | RunError::Panic { run_id, .. } => *run_id,
        }
    }
}

/// Aggregated outcome of a whole experiment, ordered by run id.
#[derive(Debug)]
pub struct ExperimentReport {
    pub results: Vec<RunResult>,
    pub failures: Vec<RunError>,
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// One run's outcome in the report.
#[derive(Debug)]
pub enum RunOutcome<'a> {
    Completed(&'a RunResult),
    Failed(&'a RunError),
}

impl RunOutcome<'_> {
    pub fn run_id(&self) -> usize {
        match self {
            RunOutcome::Completed(result) => result.run_id,
            RunOutcome::Failed(error) => error.run_id(),
        }
    }
}

impl ExperimentReport {
    /// Every run's outcome in run-id order, failures interleaved in place.
    pub fn outcomes(&self) -> Vec<RunOutcome<'_>> {
        let mut outcomes: Vec<RunOutcome<'_>> = self
            .results
            .iter()
            .map(RunOutcome::Completed)
            .chain(self.failures.iter().map(RunOutcome::Failed))
            .collect();
        outcomes.sort_by_key(RunOutcome::run_id);
        outcomes
    }
}

/// One queued run. Carries everything it needs by value so concurrent jobs
/// never observe each other's state.
struct RunJob<E> {
    run_id: usize,
    seed: u64,
    search: SearchConfig,
    evaluator: E,
    cancel: Arc<AtomicBool>,
}

fn execute_run<E: Evaluator>(job: RunJob<E>) -> Result<RunResult, RunError> {
    let run_id = job.run_id;
    let outcome = HillClimber::new(&job.search, &job.evaluator, run_id, job.seed)
        .with_cancel(Arc::clone(&job.cancel))
        .run()
        .map_err(|source| RunError::Eval { run_id, source })?;

    // Replay the best genome inside the job, so the export payload is
    // produced where the work happened and travels back by value.
    let trace = job.evaluator.trace(&outcome.best_genome);

    Ok(RunResult {
        run_id,
        best_genome: outcome.best_genome,
        best_fitness: outcome.best_fitness,
        fitness_history: outcome.fitness_history,
        trace,
    })
}

/// Run the whole experiment: validate, apply thread caps, launch all runs,
/// and collect a report sorted by run id.
pub fn run_experiment<E>(
    config: &ExperimentConfig,
    evaluator: E,
    cancel: Arc<AtomicBool>,
) -> Result<ExperimentReport, ConfigError>
where
    E: Evaluator + Clone + 'static,
{
    config.validate()?;
    apply_thread_caps(&config.scheduler.blas_threads);

    let start = Instant::now();
    let num_runs = config.search.num_runs;

    // Seeds derive in submission order, so results are reproducible no
    // matter what order runs complete in.
    let mut seeder = match config.random_seed {
        Some(seed) => GenomeRng::new(seed),
        None => GenomeRng::random(),
    };
    let jobs: Vec<RunJob<E>> = (0..num_runs)
        .map(|run_id| RunJob {
            run_id,
            seed: seeder.next_seed(),
            search: config.search.clone(),
            evaluator: evaluator.clone(),
            cancel: Arc::clone(&cancel),
        })
        .collect();

    let mut results = Vec::new();
    let mut failures: Vec<RunError> = Vec::new();
    let mut done = 0usize;

    if config.search.parallel {
        let settings = resolve_pool_settings(num_runs, &config.scheduler);
        info!(
            "dispatching {} runs across {} workers (batch size {}, recycle after {})",
            num_runs, settings.workers, settings.batch_size, settings.max_tasks_per_child
        );
        let stream = run_batches(
            jobs,
            execute_run,
            settings,
            config.scheduler.unordered,
            Arc::clone(&cancel),
        );
        for item in stream {
            done += 1;
            match item {
                Ok(Ok(result)) => {
                    info!(
                        "run {}/{} complete: run {} best fitness {}",
                        done, num_runs, result.run_id, result.best_fitness
                    );
                    results.push(result);
                }
                Ok(Err(err)) => {
                    warn!("{err}");
                    failures.push(err);
                }
                Err(TaskError { index, message }) => {
                    let err = RunError::Panic {
                        run_id: index,
                        message,
                    };
                    warn!("{err}");
                    failures.push(err);
                }
            }
        }
    } else {
        for job in jobs {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            done += 1;
            let run_id = job.run_id;
            match execute_run(job) {
                Ok(result) => {
                    info!(
                        "run {}/{} complete: run {} best fitness {}",
                        done, num_runs, run_id, result.best_fitness
                    );
                    results.push(result);
                }
                Err(err) => {
                    warn!("{err}");
                    failures.push(err);
                }
            }
        }
    }

    results.sort_by_key(|result| result.run_id);
    failures.sort_by_key(RunError::run_id);

    Ok(ExperimentReport {
        results,
        failures,
        elapsed: start.elapsed(),
        cancelled: cancel.load(Ordering::Relaxed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchedulerConfig;
    use crate::search::{EvaluationRequest, FnEvaluator};

    fn quick_config(num_runs: usize, parallel: bool) -> ExperimentConfig {
        ExperimentConfig {
            search: SearchConfig {
                num_runs,
                parallel,
                num_generations: 3,
                ..Default::default()
            },
            scheduler: SchedulerConfig {
                max_workers: 2,
                ..Default::default()
            },
            random_seed: Some(99),
            ..Default::default()
        }
    }

    fn constant_evaluator(
        value: f64,
    ) -> FnEvaluator<impl Fn(&EvaluationRequest) -> Result<f64, EvalError> + Clone> {
        FnEvaluator(move |_: &EvaluationRequest| Ok(value))
    }

    #[test]
    fn test_sequential_runs_all_complete() {
        let config = quick_config(3, false);
        let report = run_experiment(
            &config,
            constant_evaluator(5.0),
            Arc::new(AtomicBool::new(false)),
        )
        .unwrap();

        assert_eq!(report.results.len(), 3);
        assert!(report.failures.is_empty());
        assert!(!report.cancelled);
        for (i, result) in report.results.iter().enumerate() {
            assert_eq!(result.run_id, i);
            assert_eq!(result.fitness_history.len(), 4);
        }
    }

    #[test]
    fn test_parallel_results_sorted_by_run_id() {
        let config = quick_config(5, true);
        let report = run_experiment(
            &config,
            constant_evaluator(1.0),
            Arc::new(AtomicBool::new(false)),
        )
        .unwrap();

        let ids: Vec<usize> = report.results.iter().map(|r| r.run_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_fixed_master_seed_reproduces_experiment() {
        let config = quick_config(3, false);
        let evaluator = FnEvaluator(|request: &EvaluationRequest| {
            Ok(request.genome.genes[0].intercept + 3.0)
        });

        let first =
            run_experiment(&config, evaluator.clone(), Arc::new(AtomicBool::new(false))).unwrap();
        let second =
            run_experiment(&config, evaluator, Arc::new(AtomicBool::new(false))).unwrap();

        for (a, b) in first.results.iter().zip(second.results.iter()) {
            assert_eq!(a.best_genome, b.best_genome);
            assert_eq!(a.fitness_history, b.fitness_history);
        }
    }

    #[test]
    fn test_failing_run_is_isolated_under_the_pool() {
        let config = quick_config(4, true);
        let evaluator = FnEvaluator(|request: &EvaluationRequest| {
            if request.run_id == 2 {
                Err(EvalError::Failed("sim diverged".to_string()))
            } else {
                Ok(1.0)
            }
        });
        let report =
            run_experiment(&config, evaluator, Arc::new(AtomicBool::new(false))).unwrap();

        let ids: Vec<usize> = report.results.iter().map(|r| r.run_id).collect();
        assert_eq!(ids, vec![0, 1, 3]);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0],
            RunError::Eval { run_id: 2, .. }
        ));
    }

    #[test]
    fn test_outcomes_interleave_failures_by_run_id() {
        let config = quick_config(4, true);
        let evaluator = FnEvaluator(|request: &EvaluationRequest| {
            if request.run_id == 1 {
                Err(EvalError::Failed("sim diverged".to_string()))
            } else {
                Ok(1.0)
            }
        });
        let report =
            run_experiment(&config, evaluator, Arc::new(AtomicBool::new(false))).unwrap();

        let outcomes = report.outcomes();
        let ids: Vec<usize> = outcomes.iter().map(RunOutcome::run_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(matches!(outcomes[0], RunOutcome::Completed(_)));
        assert!(matches!(outcomes[1], RunOutcome::Failed(_)));
        assert!(matches!(outcomes[2], RunOutcome::Completed(_)));
    }

    #[test]
    fn test_panicking_run_surfaces_as_panic_failure() {
        let config = quick_config(3, true);
        let evaluator = FnEvaluator(|request: &EvaluationRequest| {
            if request.run_id == 1 {
                panic!("worker died");
            }
            Ok(1.0)
        });
        let report =
            run_experiment(&config, evaluator, Arc::new(AtomicBool::new(false))).unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0],
            RunError::Panic { run_id: 1, .. }
        ));
    }

    #[test]
    fn test_preset_cancel_runs_nothing() {
        let config = quick_config(3, false);
        let report = run_experiment(
            &config,
            constant_evaluator(1.0),
            Arc::new(AtomicBool::new(true)),
        )
        .unwrap();
        assert!(report.results.is_empty());
        assert!(report.cancelled);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = quick_config(0, false);
        config.search.num_runs = 0;
        let result = run_experiment(
            &config,
            constant_evaluator(1.0),
            Arc::new(AtomicBool::new(false)),
        );
        assert!(matches!(result, Err(ConfigError::Search(_))));
    }
}
