//! NetC - Embeddable HTTP/1.1 Server
//!
//! Core library for HTTP parsing, routing and connection dispatch.

pub mod config;
pub mod http;
pub mod server;
