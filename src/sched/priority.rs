//! Best-effort worker priority de-escalation.

/// Raise the calling thread's nice value by 10 so a long campaign does not
/// starve interactive work on the host. Quality-of-service hint only; every
/// failure mode is ignored.
#[cfg(unix)]
pub fn lower_worker_priority() {
    unsafe extern "C" {
        fn nice(incr: i32) -> i32;
    }
    // On Linux nice(2) applies to the calling thread, and -1 can be a legal
    // return value, so there is no meaningful error to check.
    unsafe {
        let _ = nice(10);
    }
}

#[cfg(not(unix))]
pub fn lower_worker_priority() {}
