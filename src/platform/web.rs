//! Browser adapters over `window.localStorage` and `window.location`

use wasm_bindgen::JsValue;

use crate::error::PersistenceError;
use crate::persistence::KeyValueStore;

fn js_error(err: JsValue) -> PersistenceError {
    PersistenceError::Unavailable(format!("{:?}", err))
}

/// `window.localStorage`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Fails when there is no window or storage is disabled
    pub fn open() -> Result<Self, PersistenceError> {
        let window = web_sys::window()
            .ok_or_else(|| PersistenceError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| PersistenceError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage.set_item(key, value).map_err(js_error)
    }
}

/// Current `location.hash`, empty when unavailable
pub fn current_fragment() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

/// Reset `location.hash` to empty
pub fn clear_fragment() {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.location().set_hash("") {
            log::warn!("Could not clear fragment: {:?}", err);
        }
    }
}
