//! Socket lifecycle and the accept loop.

pub mod listener;

pub use listener::{ConnectionServer, ServerState};
