//! Error types and result types for document store operations.
//!
//! Reading a missing document or an unknown collection is never an error in this
//! crate; it yields an absent snapshot or an empty result. The variants below cover
//! malformed writes, malformed queries and backend failures.
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between document formats.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The written fields cannot be stored as given (for example a sentinel inside a list).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The query is malformed (for example `in` against a non-list value).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// A filter used an operator outside the supported set.
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
