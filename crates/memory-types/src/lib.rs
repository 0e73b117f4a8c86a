//! # memory-types
//!
//! Shared types for the Agent Memory retrieval engine.
//!
//! This crate defines the data structures used by every index crate:
//! - Settings: layered configuration for chunking, BM25, hybrid fusion and TF-IDF search
//! - ScoredDocument: the `(id, score)` result shape of the raw indices
//! - TextSource: the collaborator interface that supplies raw `(id, text)` pairs
//!
//! ## Usage
//!
//! ```rust
//! use memory_types::{ChunkingConfig, Settings};
//!
//! let settings = Settings::default();
//! assert_eq!(settings.chunking, ChunkingConfig::default());
//! ```

pub mod config;
pub mod error;
pub mod search;
pub mod source;

pub use config::{
    Bm25Config, ChunkingConfig, HybridConfig, IdfFormula, Settings, VectorSearchConfig,
};
pub use error::MemoryError;
pub use search::{compare_scores, rank_and_truncate, ScoredDocument};
pub use source::{SourceDocument, StaticSource, TextSource};
