//! Error types for index building and rebuilds.

use memory_search::SearchError;
use memory_types::MemoryError;
use memory_vector::VectorError;
use thiserror::Error;

/// Errors that can occur while loading sources or building indices
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Source could not be opened
    #[error("Source error: {0}")]
    Source(String),

    /// File read failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Source loading or configuration error
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    /// BM25 or hybrid index configuration rejected
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// TF-IDF or chunker configuration rejected
    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexingError::Source("missing root".to_string());
        assert_eq!(err.to_string(), "Source error: missing root");

        let err = IndexingError::Vector(VectorError::InvalidConfig("bad overlap".to_string()));
        assert_eq!(
            err.to_string(),
            "Vector error: Invalid configuration: bad overlap"
        );
    }

    #[test]
    fn test_from_memory_error() {
        let err: IndexingError = MemoryError::source_failed("notes", "unreadable").into();
        assert!(matches!(err, IndexingError::Memory(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: IndexingError = io.into();
        assert!(matches!(err, IndexingError::Io(_)));
    }
}
