//! Index building and rebuilds for the Agent Memory retrieval engine.
//!
//! This crate connects text sources to the in-process indices and provides
//! the single-writer/multi-reader handle used to share them.
//!
//! ## Key Components
//!
//! - [`IndexUpdater`]: uniform add/remove/clear over every index type
//! - [`SharedIndex`]: `RwLock` handle with whole-index replacement
//! - [`rebuild_index`]: build a fresh index from a [`TextSource`](memory_types::TextSource)
//!   and swap it in
//! - [`DirectorySource`]: text source over a directory of files
//!
//! ## Example
//!
//! ```rust
//! use memory_indexing::{rebuild_index, NoOpProgressCallback, RebuildConfig, SharedIndex};
//! use memory_search::Bm25Index;
//! use memory_types::StaticSource;
//!
//! let source = StaticSource::from_pairs("notes", [("d1", "the cat sat"), ("d2", "the dog sat")]);
//! let shared = SharedIndex::new(Bm25Index::default());
//! rebuild_index(
//!     &shared,
//!     Bm25Index::default(),
//!     &source,
//!     &RebuildConfig::default(),
//!     &NoOpProgressCallback,
//! )?;
//! assert_eq!(shared.read(|index| index.search("cat", 10))[0].id, "d1");
//! # Ok::<(), memory_indexing::IndexingError>(())
//! ```

pub mod error;
pub mod rebuild;
pub mod shared;
pub mod source;
pub mod updater;

pub use error::IndexingError;
pub use rebuild::{
    build_index, index_documents, rebuild_index, LoggingProgressCallback, NoOpProgressCallback,
    ProgressCallback, RebuildConfig, RebuildProgress, RebuildResult,
};
pub use shared::SharedIndex;
pub use source::{DirectorySource, DEFAULT_EXTENSIONS};
pub use updater::{IndexType, IndexUpdater};
