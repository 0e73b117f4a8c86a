//! Search error types.

use thiserror::Error;

/// Errors that can occur while configuring keyword or hybrid search.
///
/// Searching itself never fails: empty corpora and unseen terms yield empty
/// result lists.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Rejected configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
