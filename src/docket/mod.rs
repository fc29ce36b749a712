//! Case Provider boundary. The content of case generation is opaque to
//! the match engine; rooms only consume the structured record.

mod canned;
mod provider;

pub use canned::*;
pub use provider::*;
