//! Wire types bridging the domain model and JSON payloads.
//!
//! Inbound: client actions over the WebSocket session and the HTTP join
//! request. Outbound: full-state snapshots, targeted rejections, and
//! room-fatal notices. Clients render the latest snapshot and never
//! mutate match state locally; the trial is the single source of truth.

mod action;
mod snapshot;

pub use action::*;
pub use snapshot::*;
