//! Error types and result types for store operations.
//!
//! Backends and the fallible internals of [`DataAccessObject`](crate::dao::DataAccessObject)
//! return [`StoreResult<T>`]. The public CRUD surface never hands these to the caller;
//! it logs them and falls back to a conservative value instead.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when talking to a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between record formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The driver client could not be constructed (bad URI, bad options).
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The liveness check against the store failed.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The connection handle is disabled; no driver call was attempted.
    #[error("No store connection available")]
    Disabled,
    /// The record has an invalid structure for the requested write.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The query document could not be interpreted.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// A record with the given `_id` already exists in the collection.
    /// The first argument is the id, the second is the collection name.
    #[error("Duplicate key {0} in collection {1}")]
    DuplicateKey(String, String),
    /// An error occurred in the underlying store driver.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
