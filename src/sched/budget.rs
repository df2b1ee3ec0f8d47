//! Worker budget arithmetic.
//!
//! Derives the effective pool shape from the scheduler configuration and
//! the job count. The derivation always leaves at least one core for the
//! host, never launches more workers than there is work, and honours an
//! explicit ceiling when the caller configured one.

use std::thread;
use std::time::Duration;

use crate::schema::SchedulerConfig;

/// Effective pool shape for one campaign. Derived, never stored back into
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSettings {
    /// Concurrent worker threads.
    pub workers: usize,
    /// Tasks a worker completes before retirement (0 = never).
    pub max_tasks_per_child: usize,
    /// Jobs per pool lifetime.
    pub batch_size: usize,
    /// Pause between batches.
    pub cooldown: Duration,
}

/// Detected CPU count, falling back to 1.
pub fn detected_cpus() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Derive pool settings for `total_jobs` on the current host.
pub fn resolve_pool_settings(total_jobs: usize, config: &SchedulerConfig) -> PoolSettings {
    resolve_pool_settings_with_cpus(total_jobs, config, detected_cpus())
}

/// Budget arithmetic with an injected CPU count, so the derivation is
/// testable on any host.
pub fn resolve_pool_settings_with_cpus(
    total_jobs: usize,
    config: &SchedulerConfig,
    cpu_count: usize,
) -> PoolSettings {
    let cpu = cpu_count.max(1);

    let util = config.max_cpu_utilization.clamp(0.1, 1.0);
    let util_cap = ((cpu as f64 * util) as usize).max(1);
    let leave_one = cpu.saturating_sub(1).max(1);

    let mut cap = util_cap.min(leave_one);
    if config.max_workers > 0 {
        cap = cap.min(config.max_workers);
    }
    let workers = total_jobs.min(cap).max(1);

    let batch_size = if config.batch_size == 0 {
        total_jobs
    } else {
        config.batch_size
    };

    PoolSettings {
        workers,
        max_tasks_per_child: config.max_tasks_per_child,
        batch_size,
        cooldown: Duration::from_secs_f64(config.cooldown_seconds),
    }
}
