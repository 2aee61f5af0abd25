//! Error types for resource lookups.

use crate::storage::StoreError;

/// Error type for resource operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required parameter was missing, empty or malformed.
    InvalidInput(String),

    /// No culture in the fallback chain provides the resource key.
    ResourceNotFound {
        /// The resource key that was requested.
        key: String,
        /// The resource set (namespace or class name) that was searched.
        resource_set: String,
        /// Display name of the last culture tried.
        culture: String,
        /// Name of the culture the lookup started from.
        requested_culture: String,
    },

    /// Malformed escape sequence or composite key.
    Encoding(String),

    /// Storage-related errors from the resource store.
    Storage(String),

    /// Internal errors indicating bugs or invariant violations.
    Internal(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::ResourceNotFound {
                key,
                resource_set,
                culture,
                requested_culture,
            } => write!(
                f,
                "Resource '{}' not found in resource set '{}' for culture '{}' (requested '{}')",
                key, resource_set, culture, requested_culture
            ),
            Error::Encoding(msg) => write!(f, "Encoding error: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            // Only reachable when a caller bypasses the cache.
            StoreError::PartitionNotFound(partition) => {
                Error::Internal(format!("partition '{}' not found", partition))
            }
            StoreError::Storage(msg) => Error::Storage(msg),
            StoreError::Internal(msg) => Error::Internal(msg),
        }
    }
}

/// Result type alias for resource operations.
pub type Result<T> = std::result::Result<T, Error>;
