use crate::http::status::StatusTable;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

/// Value reported in the default `Server` header.
pub const SERVER_NAME: &str = "NetC";

#[derive(Debug, PartialEq, Eq)]
pub enum ResponseError {
    /// Status code outside [200, 600).
    StatusOutOfRange(u16),
    /// Status code with no reason phrase in the status table.
    UnknownStatus(u16),
    /// Header name is empty.
    EmptyHeaderName,
}

/// An HTTP response under construction by a route handler.
///
/// Handlers receive a fresh default response (200 OK, `Server` and
/// `Connection: Close` headers, no body) and mutate it; every effect of a
/// handler is observed through these mutations. `status_text` is always
/// derived from the status table — it is re-looked-up whenever the status
/// code changes and can never be left dangling, which is why the fields
/// are private and mutation goes through fallible methods that leave the
/// response untouched on error.
#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    status_text: String,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
    statuses: Arc<StatusTable>,
}

impl Response {
    /// Creates the default response: 200 OK, `Server` and
    /// `Connection: Close` headers, no body.
    pub fn new(statuses: Arc<StatusTable>) -> Self {
        let status_text = statuses.phrase(200).unwrap_or("OK").to_string();

        let mut headers = HashMap::new();
        headers.insert("Server".to_string(), SERVER_NAME.to_string());
        headers.insert("Connection".to_string(), "Close".to_string());

        Self {
            status_code: 200,
            status_text,
            headers,
            body: None,
            statuses,
        }
    }

    /// Sets the status code and derives the reason phrase from the status
    /// table. Fails, leaving the response unchanged, if the code is outside
    /// [200, 600) or the table has no phrase for it.
    pub fn set_status(&mut self, status_code: u16) -> Result<(), ResponseError> {
        if !(200..600).contains(&status_code) {
            return Err(ResponseError::StatusOutOfRange(status_code));
        }

        let status_text = self
            .statuses
            .phrase(status_code)
            .ok_or(ResponseError::UnknownStatus(status_code))?
            .to_string();

        self.status_code = status_code;
        self.status_text = status_text;
        Ok(())
    }

    /// Adds or replaces a header. An empty name is rejected without side
    /// effects; an empty value is a legal header value.
    pub fn add_header(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ResponseError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ResponseError::EmptyHeaderName);
        }

        self.headers.insert(key, value.into());
        Ok(())
    }

    /// Sets the body and (re)writes `Content-Length` to its exact byte
    /// length. Calling this again with a different body keeps the header
    /// consistent with the latest body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        let body = body.into();
        self.headers
            .insert("Content-Length".to_string(), body.len().to_string());
        self.body = Some(body);
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}
