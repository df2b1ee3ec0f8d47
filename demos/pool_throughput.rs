//! Quick pool throughput comparison across worker counts and batch sizes.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use hill_rover::sched::{PoolSettings, run_batches};

fn busy_work(job: u64) -> u64 {
    // Roughly a millisecond of arithmetic per job.
    let mut acc = job;
    for i in 0..200_000u64 {
        acc = acc.wrapping_mul(6364136223846793005).wrapping_add(i);
    }
    acc
}

fn main() {
    println!("=== Pool Throughput Test ===\n");

    let total_jobs = 64usize;

    for workers in [1, 2, 4] {
        for batch_size in [total_jobs, 16] {
            let settings = PoolSettings {
                workers,
                max_tasks_per_child: 8,
                batch_size,
                cooldown: Duration::ZERO,
            };
            let jobs: Vec<u64> = (0..total_jobs as u64).collect();
            let cancel = Arc::new(AtomicBool::new(false));

            let start = Instant::now();
            let completed = run_batches(jobs, busy_work, settings, true, cancel)
                .filter(|result| result.is_ok())
                .count();
            let elapsed = start.elapsed();

            println!(
                "workers={} batch_size={}: {} results in {:.3}s",
                workers,
                batch_size,
                completed,
                elapsed.as_secs_f64()
            );
        }
    }
}
