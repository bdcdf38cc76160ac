use std::collections::HashMap;

/// Mapping from HTTP status code to canonical reason phrase.
///
/// Constructed once, optionally extended with [`StatusTable::insert`], and
/// then shared read-only (the server wraps it in an `Arc`). There is no
/// process-wide instance; tests build their own.
#[derive(Debug, Clone)]
pub struct StatusTable {
    phrases: HashMap<u16, String>,
}

impl Default for StatusTable {
    fn default() -> Self {
        let mut table = Self {
            phrases: HashMap::new(),
        };
        table.insert(200, "OK");
        table.insert(400, "Bad request");
        table.insert(404, "Not found");
        table.insert(500, "Internal server error");
        table
    }
}

impl StatusTable {
    /// Registers a reason phrase for a status code, replacing any prior one.
    pub fn insert(&mut self, code: u16, phrase: impl Into<String>) {
        self.phrases.insert(code, phrase.into());
    }

    /// Looks up the reason phrase for a status code.
    pub fn phrase(&self, code: u16) -> Option<&str> {
        self.phrases.get(&code).map(|p| p.as_str())
    }
}
