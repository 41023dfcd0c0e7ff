//! Native storage: one JSON file per key in a data directory
//!
//! Writes go to a temporary file first and are renamed over the old value.
//! Keys are used as file names verbatim, so only `[A-Za-z0-9._-]` is accepted
//! and a key may not start with `.`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::persistence::KeyValueStore;

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn unavailable(path: &Path, err: io::Error) -> PersistenceError {
    PersistenceError::Unavailable(format!("{}: {}", path.display(), err))
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(unavailable(&path, err)),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|err| unavailable(&self.dir, err))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|err| unavailable(&tmp, err))?;
        fs::rename(&tmp, &path).map_err(|err| unavailable(&path, err))?;
        Ok(())
    }
}
