//! Error types for EmberKV.
//!
//! Every fallible store operation returns [`Result`]. A missing key or list is
//! never an error: lookups report it as `None` / `found = false`.

use thiserror::Error;

/// Errors that can occur when talking to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A scalar item is missing its id or key
    #[error("invalid item: {0}")]
    InvalidItem(&'static str),

    /// A list operation is missing its list key or item id
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// An empty key was given to delete
    #[error("invalid key")]
    InvalidKey,

    /// The store has not been initialized, or has been closed
    #[error("store is not initialized")]
    NotInitialized,

    /// The engine worker did not accept or answer a request in time
    #[error("{op} request timed out")]
    Timeout {
        /// The operation that timed out
        op: &'static str,
    },

    /// The engine worker stopped while the request was in flight
    #[error("engine worker closed")]
    Closed,
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::InvalidItem("missing key").to_string(),
            "invalid item: missing key"
        );
        assert_eq!(
            StoreError::Timeout { op: "get" }.to_string(),
            "get request timed out"
        );
        assert_eq!(
            StoreError::NotInitialized.to_string(),
            "store is not initialized"
        );
    }
}
