//! Porthole - a small HTTP/1.0 server stack
//!
//! Core library: request parsing, URL decoding, query tokenizing, response
//! serialization and the one-request-per-connection server loop. What to
//! answer is decided by a [`handler::Handler`] supplied by the application.

pub mod config;
pub mod handler;
pub mod http;
pub mod server;
