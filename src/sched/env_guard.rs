//! Process-wide thread caps for numerical libraries.
//!
//! Evaluators may pull in BLAS-backed math or a rayon pool of their own;
//! without a cap, every worker multiplies into `cpu_count` internal threads
//! and the host oversubscribes. The guard pins the well-known knobs before
//! any worker exists, but only where the user has not already chosen a
//! value.

use std::env;
use std::sync::{Mutex, MutexGuard};

/// Environment variables consulted by the numerical stacks in common use.
pub const THREAD_CAP_VARS: [&str; 4] = [
    "OMP_NUM_THREADS",
    "OPENBLAS_NUM_THREADS",
    "MKL_NUM_THREADS",
    "RAYON_NUM_THREADS",
];

// Mutating the environment is not thread-safe, and experiments can start
// from concurrent threads (the test harness does). Every environment
// access in this crate takes this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Set every thread-cap variable that is not already present to `threads`.
///
/// Present values are never overridden, so repeated calls compose: a global
/// default first, then task-specific overrides for anything still unset.
pub fn apply_thread_caps(threads: &str) {
    let _guard = env_lock();
    for var in THREAD_CAP_VARS {
        if env::var_os(var).is_none() {
            // SAFETY: every environment read and write in this crate holds
            // ENV_LOCK, so no crate thread accesses the environment
            // concurrently with this write.
            unsafe { env::set_var(var, threads) };
        }
    }
}
