//! Save/load persistence
//!
//! Features:
//! - `KeyValueStore` seam over LocalStorage-like backends
//! - JSON codec for the ordered item list, stored under a single key
//! - Malformed data reported separately from backend failures so callers
//!   can reset to an empty list

pub mod memory;

pub use memory::MemoryStorage;

use crate::error::PersistenceError;
use crate::model::TodoItem;

/// String key/value backend (LocalStorage, a file directory, a map)
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if never written
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the value under `key`
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set_item(key, value)
    }
}

/// Reads and writes the todo list under one key
#[derive(Debug, Clone)]
pub struct TodoStorage {
    key: String,
}

impl TodoStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored list; a missing key is an empty list
    pub fn fetch<S: KeyValueStore + ?Sized>(
        &self,
        backend: &S,
    ) -> Result<Vec<TodoItem>, PersistenceError> {
        match backend.get_item(&self.key)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Store `items` as a JSON array, replacing any previous value
    pub fn save<S: KeyValueStore + ?Sized>(
        &self,
        backend: &mut S,
        items: &[TodoItem],
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(items).map_err(PersistenceError::Encode)?;
        backend.set_item(&self.key, &json)?;
        log::debug!("Saved {} todos under `{}`", items.len(), self.key);
        Ok(())
    }
}
