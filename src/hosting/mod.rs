//! HTTP/WebSocket surface: the room registry, the join route, and the
//! session bridge that pumps frames between actix-ws and a room's queue.

mod courthouse;
mod handle;
mod server;
mod session;

pub use courthouse::*;
pub use handle::*;
pub use server::*;
pub use session::*;
