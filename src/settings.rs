//! Runtime settings

use log::LevelFilter;

use crate::consts::STORAGE_KEY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Key the list is stored under
    pub storage_key: String,
    /// Maximum log level
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            log_level: LevelFilter::Info,
        }
    }
}

impl Settings {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.storage_key, "fjord-vue-memo-1");
        assert_eq!(settings.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_builders() {
        let settings = Settings::default()
            .with_storage_key("other")
            .with_log_level(LevelFilter::Debug);
        assert_eq!(settings.storage_key, "other");
        assert_eq!(settings.log_level, LevelFilter::Debug);
    }
}
