//! Pure match domain: roles, phases, cases, arguments, rounds, and the
//! Trial state machine. No I/O and no channels live here; the matchroom
//! shell drives these types through a serialized command queue.

mod advocate;
mod argument;
mod case;
mod phase;
mod rejection;
mod role;
mod round;
mod side;
mod trial;

pub use advocate::*;
pub use argument::*;
pub use case::*;
pub use phase::*;
pub use rejection::*;
pub use role::*;
pub use round::*;
pub use side::*;
pub use trial::*;
