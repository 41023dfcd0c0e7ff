//! Todo item record
//!
//! The serialized form (`id`, `title`, `done`) is the persistence format.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a todo item, unique within a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub done: bool,
}

impl TodoItem {
    pub fn new(id: TodoId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
        }
    }

    /// Whether the title is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }
}
