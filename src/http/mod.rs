//! HTTP protocol implementation.
//!
//! This module implements a small HTTP/1.0 server stack: one request per
//! connection, no keep-alive, no pipelining.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`headers`**: Case-insensitive, single-valued header dictionary
//! - **`codec`**: Percent-decoding and percent-encoding of URL octets
//! - **`path`**: `.`/`..` resolution and mapping onto a document root
//! - **`query`**: Query-string tokenizer (unnamed tokens and named parameters)
//! - **`request`**: HTTP request representation and target decomposition
//! - **`parser`**: Parses the request line and header block from bytes
//! - **`response`**: Status table and HTTP response representation
//! - **`writer`**: Serializes responses, including generated error pages
//! - **`mime`**: MIME type detection based on file extensions
//! - **`connection`**: The per-connection request-response state machine
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine exactly once:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for request line and headers
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Handler fills in the response
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use porthole::http::connection::Connection;
//! use porthole::http::response::Response;
//! use porthole::http::request::Request;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let handler = Arc::new(|_: &Request, res: &mut Response| res.write_body("hi"));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let conn = Connection::new(socket, handler.clone());
//!         tokio::spawn(async move {
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod codec;
pub mod connection;
pub mod headers;
pub mod mime;
pub mod parser;
pub mod path;
pub mod query;
pub mod request;
pub mod response;
pub mod writer;
