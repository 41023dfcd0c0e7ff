//! Error types
//!
//! None of these are fatal. Callers recover locally: malformed storage falls
//! back to an empty list, an unavailable backend leaves the in-memory list
//! authoritative, and an unknown visibility is normalized to `all`.

/// Failure at the persistence boundary
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The backend could not be read or written (disabled, quota exceeded, I/O)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Stored data exists but is not a valid todo list
    #[error("malformed stored data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The list could not be encoded for writing
    #[error("could not encode todos: {0}")]
    Encode(#[source] serde_json::Error),

    /// The key cannot be stored by this backend
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

/// A filter name outside `all | active | completed`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown visibility `{0}`")]
pub struct UnknownVisibility(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_failure_is_not_reported_as_malformed_data() {
        let err = serde_json::from_str::<u8>("x").unwrap_err();
        let encode = PersistenceError::Encode(err);
        assert!(encode.to_string().starts_with("could not encode todos"));
        assert!(!matches!(encode, PersistenceError::Malformed(_)));
    }
}
