use crate::http::request::{MAX_METHOD_LEN, MAX_PATH_LEN, MAX_VERSION_LEN, Request};
use bytes::Bytes;
use std::collections::HashMap;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The header block is not terminated by an empty line.
    MissingTerminator,
    /// Fewer than three tokens in the request line.
    InvalidRequestLine,
    /// A request-line token exceeds its length bound.
    TokenTooLong,
    /// A header line has no colon separator.
    InvalidHeader,
    /// The header block is not valid UTF-8.
    InvalidEncoding,
}

/// Parses a single HTTP request out of a fully-read byte buffer.
///
/// The buffer must contain the complete message: request line, header
/// block, empty-line terminator, and (optionally) a body. Everything after
/// the terminator is taken as the body verbatim; no validation against a
/// `Content-Length` header happens here, the read loop is responsible for
/// framing.
///
/// On any failure no partial `Request` is exposed.
pub fn parse(buf: &[u8]) -> Result<Request, ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::MissingTerminator)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str =
        std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidEncoding)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
    let mut parts = request_line.split_whitespace();

    let method = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let path = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let version = parts.next().ok_or(ParseError::InvalidRequestLine)?;

    if method.len() > MAX_METHOD_LEN
        || path.len() > MAX_PATH_LEN
        || version.len() > MAX_VERSION_LEN
    {
        return Err(ParseError::TokenTooLong);
    }

    // Headers: each remaining line must be `key: value`; a duplicate key
    // keeps the last value seen.
    let mut headers = HashMap::new();

    for line in lines {
        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let value = value.strip_prefix(' ').unwrap_or(value);
        headers.insert(key.to_string(), value.to_string());
    }

    // Body: everything after the terminator, verbatim.
    let body = if body_bytes.is_empty() {
        None
    } else {
        Some(Bytes::copy_from_slice(body_bytes))
    };

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    })
}

/// Byte offset of the first `\r\n\r\n`, if any.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Pulls a `Content-Length` value out of a raw buffer whose header block is
/// already complete. Used by the read loop to decide when the body is fully
/// buffered; the name comparison is case-insensitive since this is framing,
/// not parsing.
pub fn content_length_hint(buf: &[u8]) -> Option<usize> {
    let headers_end = find_headers_end(buf)?;
    let headers_str = std::str::from_utf8(&buf[..headers_end]).ok()?;

    for line in headers_str.split("\r\n").skip(1) {
        if let Some((key, value)) = line.split_once(':') {
            if key.eq_ignore_ascii_case("content-length") {
                return value.trim().parse().ok();
            }
        }
    }

    None
}
