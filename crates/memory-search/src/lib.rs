//! # memory-search
//!
//! In-process keyword and hybrid search for Agent Memory.
//!
//! This crate provides BM25 keyword ranking and BM25 + embedding fusion over
//! raw `(id, text)` documents held entirely in memory.
//!
//! ## Features
//! - One shared tokenizer (CJK unigrams/bigrams, Latin words/bigrams) used by
//!   every index so fused scores compare like-for-like term spaces
//! - Okapi BM25 with configurable `k1`/`b` and a running average document length
//! - Hybrid fusion by weighted min-max blend or reciprocal rank fusion
//!
//! ## Usage
//!
//! ```rust
//! use memory_search::Bm25Index;
//!
//! let mut index = Bm25Index::default();
//! index.add("d1", "the cat sat");
//! index.add("d2", "the dog sat");
//! let results = index.search("cat", 10);
//! assert_eq!(results[0].id, "d1");
//! ```

pub mod bm25;
pub mod error;
pub mod fusion;
pub mod hybrid;
pub mod tokenizer;

pub use bm25::Bm25Index;
pub use error::SearchError;
pub use fusion::{min_max_normalize, reciprocal_rank_fusion, weighted_fusion, FusedScore};
pub use hybrid::{cosine_similarity, HybridDocument, HybridSearchIndex, HybridSearchResult};
pub use tokenizer::{is_cjk, normalize, term_counts, tokenize, BIGRAM_SEPARATOR};
