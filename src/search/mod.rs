//! Search module - Single-candidate hill climbing and run orchestration.

mod climber;
mod evaluate;
mod genome;
mod report;
mod runner;

pub use climber::*;
pub use evaluate::*;
pub use genome::*;
pub use report::*;
pub use runner::*;
