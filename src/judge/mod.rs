//! Argument Evaluator boundary. Scoring is an opaque external concern;
//! the room only sees a numeric score in 0..=100 plus optional analysis,
//! delivered asynchronously through its command queue.

mod heuristic;
mod review;

pub use heuristic::*;
pub use review::*;
