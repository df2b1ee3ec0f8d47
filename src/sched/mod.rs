//! Sched module - Resource-bounded execution for simulation campaigns.
//!
//! Thread-cap environment guard, worker budget arithmetic, the recycling
//! batch pool, and best-effort priority de-escalation.

mod budget;
mod env_guard;
mod pool;
mod priority;

pub use budget::*;
pub use env_guard::*;
pub use pool::*;
pub use priority::*;
