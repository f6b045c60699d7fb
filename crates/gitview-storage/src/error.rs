//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested item was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// No object with this id is stored.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// No reference with this name exists.
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// No repository with this name is registered.
    #[error("repository not found: {0}")]
    RepoNotFound(String),

    /// A repository with this name is already registered.
    #[error("repository already exists: {0}")]
    RepoExists(String),

    /// An object failed to parse.
    #[error("invalid object: {0}")]
    InvalidObject(String),

    /// A reference is malformed or cannot be resolved.
    #[error("invalid ref: {0}")]
    InvalidRef(String),

    /// zlib encoding or decoding failed.
    #[error("compression error: {0}")]
    Compression(String),
}
