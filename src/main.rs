//! Hill Rover CLI - Run behavior-search experiments from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use hill_rover::{
    ExperimentConfig, ExplorationEvaluator, ReportWriter, RunOutcome, run_experiment,
};

static CANCEL: OnceLock<Arc<AtomicBool>> = OnceLock::new();

#[cfg(unix)]
extern "C" fn handle_sigint(_sig: i32) {
    // Only an atomic store: async-signal-safe.
    if let Some(flag) = CANCEL.get() {
        flag.store(true, Ordering::Relaxed);
    }
}

#[cfg(unix)]
fn install_signal_handler() {
    unsafe extern "C" {
        fn signal(signum: i32, handler: extern "C" fn(i32)) -> usize;
    }
    unsafe {
        signal(2 /* SIGINT */, handle_sigint);
    }
}

#[cfg(not(unix))]
fn install_signal_handler() {}

fn main() -> ExitCode {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [runs]", args[0]);
        eprintln!();
        eprintln!("Run hill-climbing behavior search from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to experiment configuration file");
        eprintln!("  runs         Override the configured number of runs");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        return ExitCode::FAILURE;
    }

    if args[1] == "--example" {
        print_example_config();
        return ExitCode::SUCCESS;
    }

    // Load configuration
    let config_path = PathBuf::from(&args[1]);
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let mut config: ExperimentConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Some(runs) = args.get(2) {
        match runs.parse() {
            Ok(n) => config.search.num_runs = n,
            Err(_) => {
                eprintln!("Invalid run count: {}", runs);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let _ = CANCEL.set(Arc::clone(&cancel));
    install_signal_handler();

    println!("Hill Rover Behavior Search");
    println!("==========================");
    println!(
        "Runs: {} ({})",
        config.search.num_runs,
        if config.search.parallel {
            "parallel"
        } else {
            "sequential"
        }
    );
    println!("Generations per run: {}", config.search.num_generations);
    println!(
        "Arena: {}x{} ({} ticks per evaluation)",
        config.world.width, config.world.height, config.world.eval_timesteps
    );
    println!();

    let evaluator = ExplorationEvaluator::new(config.world.clone());
    let report = match run_experiment(&config, evaluator, cancel) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Experiment failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(dir) = &config.output_dir {
        match ReportWriter::new(dir) {
            Ok(writer) => {
                for run in &report.results {
                    if let Err(e) = writer.save_run(run) {
                        eprintln!("Error writing run artifact: {}", e);
                    }
                }
                if let Err(e) = writer.save_summary(&report) {
                    eprintln!("Error writing summary: {}", e);
                }
                println!("Artifacts written to {}", dir);
            }
            Err(e) => eprintln!("Error creating output directory {}: {}", dir, e),
        }
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("SUMMARY OF ALL RUNS");
    println!("{}", "=".repeat(60));
    for outcome in report.outcomes() {
        match outcome {
            RunOutcome::Completed(run) => println!(
                "Run {}: Fitness = {}, Genome = {}",
                run.run_id, run.best_fitness, run.best_genome
            ),
            RunOutcome::Failed(failure) => {
                println!("Run {}: FAILED - {}", failure.run_id(), failure)
            }
        }
    }
    println!("{}", "=".repeat(60));
    println!("Time: {:.2}s", report.elapsed.as_secs_f64());
    if report.cancelled {
        println!("Interrupted: remaining runs were skipped.");
    }

    if report.cancelled || !report.failures.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_example_config() {
    let config = ExperimentConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
