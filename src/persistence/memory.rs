//! In-process backend
//!
//! Used by tests and as the session-only fallback when the host storage
//! cannot be opened.

use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::PersistenceError;

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value (builder style)
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
