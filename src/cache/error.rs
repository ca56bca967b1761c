//! Cache error types

use std::path::PathBuf;

use thiserror::Error;

use crate::cache::meta::EntryType;

/// Cache operation errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid cache directory {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid cache key: key must not be empty")]
    InvalidKey,

    #[error("Key not found in cache: {key}")]
    NotFound { key: String },

    #[error("Key {key} is a {actual} entry, not a {expected} entry")]
    TypeMismatch {
        key: String,
        expected: EntryType,
        actual: EntryType,
    },

    #[error("Corrupt cache file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Failed to encode data to file {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to download from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to download from {url}: status code {status}")]
    Status { url: String, status: u16 },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }

    /// The key is absent (only reported by accessors that do not use `Option`)
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }

    /// The key exists under a different entry type
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, CacheError::TypeMismatch { .. })
    }

    /// A fetch failed; safe to retry later
    pub fn is_network(&self) -> bool {
        matches!(self, CacheError::Network { .. } | CacheError::Status { .. })
    }
}

/// Result alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = CacheError::TypeMismatch {
            key: "k".to_string(),
            expected: EntryType::List,
            actual: EntryType::Scalar,
        };
        assert_eq!(err.to_string(), "Key k is a scalar entry, not a list entry");
        assert!(err.is_type_mismatch());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_status_is_network() {
        let err = CacheError::Status {
            url: "http://localhost/x".to_string(),
            status: 503,
        };
        assert!(err.is_network());
        assert!(err.to_string().contains("status code 503"));
    }
}
