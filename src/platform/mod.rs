//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, a JSON file directory on native)
//! - URL fragment access (web only)

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use web::{LocalStorage, clear_fragment, current_fragment};
