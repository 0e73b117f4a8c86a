//! # memory-vector
//!
//! Sparse TF-IDF vector search and chunked document retrieval for Agent Memory.
//!
//! ## Features
//! - TF-IDF index with sublinear term frequency and cosine ranking, scoring only
//!   documents that share a term with the query
//! - Boundary-aware overlapping chunker whose chunks reassemble losslessly
//! - Chunked document index: chunk-level search plus per-document aggregation
//!
//! ## Usage
//!
//! ```rust
//! use memory_vector::{ChunkedVectorIndex, DocumentInfo};
//!
//! let mut index = ChunkedVectorIndex::default();
//! index.add("notes/rust.md", "Ownership and borrowing in Rust.", DocumentInfo::default());
//! let hits = index.search_documents("borrowing", 5, 0.0);
//! assert_eq!(hits[0].id, "notes/rust.md");
//! ```

pub mod chunked;
pub mod chunker;
pub mod error;
pub mod tfidf;

pub use chunked::{
    ChunkSearchResult, ChunkedVectorIndex, DocumentInfo, DocumentMeta, DocumentSearchResult,
};
pub use chunker::{merge_chunks, TextChunk, TextChunker, BREAK_SEARCH_CHARS};
pub use error::VectorError;
pub use tfidf::TfIdfIndex;
