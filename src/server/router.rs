use crate::http::request::Request;
use crate::http::response::Response;
use std::collections::HashMap;
use std::sync::Arc;

/// Application-supplied capability invoked with a parsed request and a
/// mutable response. Everything a handler does is observed through
/// mutations to the response argument.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request, response: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    fn handle(&self, request: &Request, response: &mut Response) {
        self(request, response)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RouteError {
    EmptyMethod,
    EmptyPath,
}

/// Routing table from `(method, path)` to a handler.
///
/// Method and path are separate key dimensions, so `("GET", "S/x")` and
/// `("GETS", "/x")` can never collide. Built before the server starts
/// serving; read-only during service, entries are never removed.
#[derive(Default)]
pub struct Router {
    endpoints: HashMap<(String, String), Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a method+path pair. An empty method or path
    /// is rejected without mutating the table. Registering the same pair
    /// again silently replaces the prior handler: last registration wins.
    pub fn register(
        &mut self,
        method: &str,
        path: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), RouteError> {
        if method.is_empty() {
            return Err(RouteError::EmptyMethod);
        }
        if path.is_empty() {
            return Err(RouteError::EmptyPath);
        }

        self.endpoints
            .insert((method.to_string(), path.to_string()), Arc::new(handler));
        Ok(())
    }

    /// Exact-match lookup; no wildcard or parameterized segments.
    pub fn resolve(&self, method: &str, path: &str) -> Option<Arc<dyn Handler>> {
        self.endpoints
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
