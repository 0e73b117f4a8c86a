//! Vector index error types.

use thiserror::Error;

/// Errors that can occur while configuring the TF-IDF or chunked indices.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Rejected configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
