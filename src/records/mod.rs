//! Rating & stats: persisted player records, ELO math, and the ledger
//! that consumes finished matches exactly once per match id.

mod ledger;
#[cfg(feature = "database")]
mod pg;
mod rating;
mod record;
mod report;

pub use ledger::*;
#[cfg(feature = "database")]
pub use pg::*;
pub use rating::*;
pub use record::*;
pub use report::*;
