use bytes::Bytes;
use std::collections::HashMap;

/// Maximum length of the method token in the request line.
pub const MAX_METHOD_LEN: usize = 7;
/// Maximum length of the path token in the request line.
pub const MAX_PATH_LEN: usize = 255;
/// Maximum length of the version token in the request line.
pub const MAX_VERSION_LEN: usize = 15;

/// Represents a parsed HTTP request from a client.
///
/// A `Request` only ever comes out of [`crate::http::parser::parse`]; it is
/// immutable once built. The method is kept as a token rather than an enum
/// so that any method up to [`MAX_METHOD_LEN`] bytes (GET through CONNECT)
/// routes like any other.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method token (e.g. "GET")
    pub method: String,
    /// The request path (e.g. "/index.html")
    pub path: String,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Request headers; duplicate names keep the last value seen
    pub headers: HashMap<String, String>,
    /// Request body, absent when nothing followed the header terminator
    pub body: Option<Bytes>,
}

impl Request {
    /// Retrieves a header value by name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}
