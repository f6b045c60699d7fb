//! String helper error types.

use thiserror::Error;

/// Errors raised by the string helpers.
#[derive(Debug, Error)]
pub enum StringError {
    /// A separator pattern failed to compile.
    #[error("invalid separator pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for string helpers.
pub type Result<T> = std::result::Result<T, StringError>;
