//! The imperative shell around a Trial: one actor task per room, all
//! mutation funneled through a single command queue. Player actions,
//! evaluator verdicts, and timer expiries are applied strictly in queue
//! order, so no two events ever race on room state.

mod command;
mod config;
mod room;

pub use command::*;
pub use config::*;
pub use room::*;
