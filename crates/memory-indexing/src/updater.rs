//! Index updater trait for feeding source documents into any index.
//!
//! Each index type (TF-IDF, BM25, chunked, hybrid) implements this trait so
//! rebuilds and the CLI can drive them uniformly.

use serde::{Deserialize, Serialize};

use memory_search::{Bm25Index, HybridDocument, HybridSearchIndex};
use memory_types::SourceDocument;
use memory_vector::{ChunkedVectorIndex, TfIdfIndex};

/// Type of index being updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    /// Sparse TF-IDF cosine index
    TfIdf,
    /// BM25 keyword index
    Bm25,
    /// Chunked TF-IDF document index
    Chunked,
    /// BM25 + embedding hybrid index
    Hybrid,
}

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexType::TfIdf => write!(f, "tfidf"),
            IndexType::Bm25 => write!(f, "bm25"),
            IndexType::Chunked => write!(f, "chunked"),
            IndexType::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Trait for index-specific update operations.
///
/// Indexing is infallible for well-formed documents; a document whose id is
/// already present replaces the previous version.
pub trait IndexUpdater: Send + Sync {
    /// Index a new or updated document.
    fn index_document(&mut self, doc: &SourceDocument);

    /// Remove a document by id. Returns false if it was not indexed.
    fn remove_document(&mut self, id: &str) -> bool;

    /// Remove every document.
    fn clear(&mut self);

    /// Number of indexed documents.
    fn document_count(&self) -> usize;

    /// Get the index type this updater manages.
    fn index_type(&self) -> IndexType;
}

impl IndexUpdater for TfIdfIndex {
    fn index_document(&mut self, doc: &SourceDocument) {
        self.add(&doc.id, &doc.text);
    }

    fn remove_document(&mut self, id: &str) -> bool {
        self.remove(id)
    }

    fn clear(&mut self) {
        TfIdfIndex::clear(self);
    }

    fn document_count(&self) -> usize {
        self.len()
    }

    fn index_type(&self) -> IndexType {
        IndexType::TfIdf
    }
}

impl IndexUpdater for Bm25Index {
    fn index_document(&mut self, doc: &SourceDocument) {
        self.add(&doc.id, &doc.text);
    }

    fn remove_document(&mut self, id: &str) -> bool {
        self.remove(id)
    }

    fn clear(&mut self) {
        Bm25Index::clear(self);
    }

    fn document_count(&self) -> usize {
        self.len()
    }

    fn index_type(&self) -> IndexType {
        IndexType::Bm25
    }
}

impl IndexUpdater for ChunkedVectorIndex {
    fn index_document(&mut self, doc: &SourceDocument) {
        self.add_source(doc);
    }

    fn remove_document(&mut self, id: &str) -> bool {
        self.remove(id)
    }

    fn clear(&mut self) {
        ChunkedVectorIndex::clear(self);
    }

    fn document_count(&self) -> usize {
        ChunkedVectorIndex::document_count(self)
    }

    fn index_type(&self) -> IndexType {
        IndexType::Chunked
    }
}

impl IndexUpdater for HybridSearchIndex {
    fn index_document(&mut self, doc: &SourceDocument) {
        let mut hybrid = HybridDocument::new(doc.id.as_str(), doc.text.as_str())
            .with_metadata(doc.metadata.clone());
        if let Some(embedding) = &doc.embedding {
            hybrid = hybrid.with_embedding(embedding.clone());
        }
        self.add(hybrid);
    }

    fn remove_document(&mut self, id: &str) -> bool {
        self.remove(id)
    }

    fn clear(&mut self) {
        HybridSearchIndex::clear(self);
    }

    fn document_count(&self) -> usize {
        self.len()
    }

    fn index_type(&self) -> IndexType {
        IndexType::Hybrid
    }
}
