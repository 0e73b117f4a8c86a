//! Error types for the retrieval engine.

use thiserror::Error;

/// Unified error type for shared memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A text source failed to produce documents
    #[error("Text source error ({source_name}): {message}")]
    Source {
        /// Name of the source that failed.
        source_name: String,
        /// Description of the failure.
        message: String,
    },
}

impl MemoryError {
    /// Build a [`MemoryError::Source`] from a source name and message.
    pub fn source_failed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = MemoryError::source_failed("notes", "permission denied");
        assert_eq!(
            err.to_string(),
            "Text source error (notes): permission denied"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = MemoryError::Config("overlap must be smaller than chunk_size".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: overlap must be smaller than chunk_size"
        );
    }

    #[test]
    fn test_serialization_error_from() {
        let bad: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: MemoryError = bad.unwrap_err().into();
        assert!(matches!(err, MemoryError::Serialization(_)));
    }
}
