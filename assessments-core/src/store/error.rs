//! Document store error types

use thiserror::Error;

/// Errors raised by a [`DocumentStore`](super::DocumentStore) backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document is not an object")]
    NotAnObject,

    #[error("Duplicate key in {collection}: {id}")]
    DuplicateKey { collection: String, id: String },

    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),
}
