//! Worker pool configuration for parallel runs.

use serde::{Deserialize, Serialize};

/// Configuration for the batch worker pool.
///
/// These are the stored knobs; the effective pool shape (worker count,
/// batch size) is derived per experiment from these values and the job
/// count, never stored back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Fraction of CPUs the pool may occupy (clamped to [0.1, 1.0]).
    #[serde(default = "default_max_cpu_utilization")]
    pub max_cpu_utilization: f64,
    /// Hard cap on worker count (0 = unset).
    #[serde(default)]
    pub max_workers: usize,
    /// Tasks a worker completes before it is retired and replaced
    /// (0 = never recycle).
    #[serde(default = "default_max_tasks_per_child")]
    pub max_tasks_per_child: usize,
    /// Jobs per batch; a fresh pool is built per batch (0 = all jobs in one
    /// batch).
    #[serde(default)]
    pub batch_size: usize,
    /// Idle sleep between batches, in seconds.
    #[serde(default)]
    pub cooldown_seconds: f64,
    /// Value for the thread-cap environment variables.
    #[serde(default = "default_blas_threads")]
    pub blas_threads: String,
    /// Yield results in completion order rather than submission order.
    #[serde(default = "default_unordered")]
    pub unordered: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_cpu_utilization: default_max_cpu_utilization(),
            max_workers: 0,
            max_tasks_per_child: default_max_tasks_per_child(),
            batch_size: 0,
            cooldown_seconds: 0.0,
            blas_threads: default_blas_threads(),
            unordered: default_unordered(),
        }
    }
}

fn default_max_cpu_utilization() -> f64 {
    0.75
}
fn default_max_tasks_per_child() -> usize {
    10
}
fn default_blas_threads() -> String {
    "1".to_string()
}
fn default_unordered() -> bool {
    true
}

/// Scheduler configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerConfigError {
    #[error("CPU utilization {0} must be finite and positive")]
    InvalidUtilization(f64),
    #[error("Cooldown {0} must be finite and non-negative")]
    InvalidCooldown(f64),
    #[error("Thread cap value must be a positive integer, got {0:?}")]
    InvalidThreadCap(String),
}

impl SchedulerConfig {
    /// Validate scheduler configuration.
    pub fn validate(&self) -> Result<(), SchedulerConfigError> {
        if !self.max_cpu_utilization.is_finite() || self.max_cpu_utilization <= 0.0 {
            return Err(SchedulerConfigError::InvalidUtilization(
                self.max_cpu_utilization,
            ));
        }
        if !self.cooldown_seconds.is_finite() || self.cooldown_seconds < 0.0 {
            return Err(SchedulerConfigError::InvalidCooldown(self.cooldown_seconds));
        }
        match self.blas_threads.parse::<u32>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(SchedulerConfigError::InvalidThreadCap(
                self.blas_threads.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SchedulerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_cpu_utilization, 0.75);
        assert_eq!(config.max_tasks_per_child, 10);
        assert_eq!(config.blas_threads, "1");
        assert!(config.unordered);
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let config = SchedulerConfig {
            cooldown_seconds: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SchedulerConfigError::InvalidCooldown(_))
        ));
    }

    #[test]
    fn test_nan_utilization_rejected() {
        let config = SchedulerConfig {
            max_cpu_utilization: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_thread_cap_must_be_numeric() {
        let config = SchedulerConfig {
            blas_threads: "lots".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SchedulerConfigError::InvalidThreadCap(_))
        ));
    }
}
