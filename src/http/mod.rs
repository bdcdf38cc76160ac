//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 engine: one request per connection,
//! no keep-alive, no pipelining.
//!
//! # Architecture
//!
//! - **`request`**: parsed HTTP request representation
//! - **`parser`**: parses incoming HTTP requests from byte buffers
//! - **`status`**: status-code to reason-phrase table
//! - **`response`**: HTTP response built up by route handlers
//! - **`writer`**: serializes and writes HTTP responses to the client
//! - **`connection`**: the per-connection state machine
//!
//! # Connection State Machine
//!
//! Each accepted connection moves through:
//!
//! ```text
//! Reading → Parsed | ParseFailed
//! Parsed  → Routed | Unrouted
//! Routed  → Handled → Responded → Closed
//! ```
//!
//! Every path ends in `Closed`: the socket is closed and the request and
//! response dropped exactly once.

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
pub mod writer;
