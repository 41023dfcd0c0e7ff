//! Fjord Memo - a single-page to-do list
//!
//! Core modules:
//! - `store`: The todo list, identifier assignment and the edit session
//! - `filter`: Visibility projections (`all`, `active`, `completed`)
//! - `route`: URL-fragment protocol selecting the visibility
//! - `persistence`: Key/value backends and the JSON list codec
//! - `platform`: Browser/native storage and location adapters
//! - `app`: Controller driven by the rendering layer

pub mod app;
pub mod error;
pub mod filter;
pub mod model;
pub mod persistence;
pub mod platform;
pub mod route;
pub mod settings;
pub mod store;

pub use app::{Action, App, Summary};
pub use error::{PersistenceError, UnknownVisibility};
pub use filter::Visibility;
pub use model::{TodoId, TodoItem};
pub use persistence::{KeyValueStore, MemoryStorage, TodoStorage};
pub use route::{FragmentRoute, resolve_fragment};
pub use settings::Settings;
pub use store::{EditOutcome, StoreWarning, TodoStore};

/// Application constants
pub mod consts {
    /// LocalStorage key holding the serialized list
    pub const STORAGE_KEY: &str = "fjord-vue-memo-1";
    /// Identifier handed to the first item of an empty list
    pub const FIRST_ID: u64 = 1;
}
