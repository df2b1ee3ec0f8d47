//! JSON artifacts for completed runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::genome::Genome;
use super::runner::{ExperimentReport, RunResult};

/// Writes per-run artifacts and the experiment summary as pretty JSON.
#[derive(Debug)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create the output directory and a writer over it.
    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let output_dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Write `run_{id:03}.json` with the run's best genome, full fitness
    /// history and replay trace.
    pub fn save_run(&self, result: &RunResult) -> io::Result<PathBuf> {
        let path = self
            .output_dir
            .join(format!("run_{:03}.json", result.run_id));
        let json = serde_json::to_string_pretty(result)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Write `summary.json`: per-run best fitness and genome, plus every
    /// failure, distinct from valid results.
    pub fn save_summary(&self, report: &ExperimentReport) -> io::Result<PathBuf> {
        let export = SummaryExport {
            runs: report
                .results
                .iter()
                .map(|result| RunSummary {
                    run_id: result.run_id,
                    best_fitness: result.best_fitness,
                    best_genome: result.best_genome,
                })
                .collect(),
            failures: report
                .failures
                .iter()
                .map(|failure| FailureSummary {
                    run_id: failure.run_id(),
                    error: failure.to_string(),
                })
                .collect(),
            elapsed_seconds: report.elapsed.as_secs_f64(),
            cancelled: report.cancelled,
        };
        let path = self.output_dir.join("summary.json");
        fs::write(&path, serde_json::to_string_pretty(&export)?)?;
        Ok(path)
    }
}

/// Exported summary format.
#[derive(Debug, Serialize)]
struct SummaryExport {
    runs: Vec<RunSummary>,
    failures: Vec<FailureSummary>,
    elapsed_seconds: f64,
    cancelled: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    run_id: usize,
    best_fitness: f64,
    best_genome: Genome,
}

#[derive(Debug, Serialize)]
struct FailureSummary {
    run_id: usize,
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{EvalError, Gene, GENOME_LEN, RunError, RunTrace};
    use std::time::Duration;

    fn sample_result(run_id: usize) -> RunResult {
        RunResult {
            run_id,
            best_genome: Genome {
                genes: [Gene {
                    slope: 1.5,
                    intercept: 0.25,
                }; GENOME_LEN],
            },
            best_fitness: 42.0,
            fitness_history: vec![10.0, 30.0, 42.0],
            trace: Some(RunTrace {
                trajectory: vec![(125.0, 125.0), (128.0, 129.0)],
                cells_visited: 42,
            }),
        }
    }

    #[test]
    fn test_save_run_writes_parseable_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("out")).unwrap();

        let path = writer.save_run(&sample_result(3)).unwrap();
        assert!(path.ends_with("run_003.json"));

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["run_id"], 3);
        assert_eq!(parsed["best_fitness"], 42.0);
        assert_eq!(parsed["fitness_history"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["trace"]["cells_visited"], 42);
    }

    #[test]
    fn test_save_summary_includes_failures() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();

        let report = ExperimentReport {
            results: vec![sample_result(0), sample_result(1)],
            failures: vec![RunError::Eval {
                run_id: 2,
                source: EvalError::Failed("sim diverged".to_string()),
            }],
            elapsed: Duration::from_secs(12),
            cancelled: false,
        };
        let path = writer.save_summary(&report).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["runs"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["failures"][0]["run_id"], 2);
        assert!(
            parsed["failures"][0]["error"]
                .as_str()
                .unwrap()
                .contains("sim diverged")
        );
        assert_eq!(parsed["cancelled"], false);
    }
}
