//! Document index built on chunk-level TF-IDF search.
//!
//! Each added document is split by the [`TextChunker`]; every chunk is indexed
//! as its own TF-IDF entry. Searches can return chunks directly or aggregate
//! them back into per-document hits.

use std::collections::HashMap;
use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use memory_types::{compare_scores, ChunkingConfig, SourceDocument, VectorSearchConfig};

use crate::chunker::{merge_chunks, TextChunk, TextChunker};
use crate::error::VectorError;
use crate::tfidf::TfIdfIndex;

/// Optional descriptive fields attached at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub doc_type: Option<String>,
    pub path: Option<String>,
}

impl DocumentInfo {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl From<&SourceDocument> for DocumentInfo {
    fn from(doc: &SourceDocument) -> Self {
        Self {
            title: doc.title.clone(),
            doc_type: doc.doc_type.clone(),
            path: doc.path.clone(),
        }
    }
}

/// Bookkeeping for one indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: String,
    pub title: Option<String>,
    pub doc_type: Option<String>,
    pub path: Option<String>,
    /// Chunk ids in index order
    pub chunk_ids: Vec<String>,
    pub total_chunks: usize,
    pub created_at: DateTime<Utc>,
}

/// A chunk hit with its owning document resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk_id: String,
    pub source_id: String,
    pub title: Option<String>,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub content: String,
    pub score: f32,
    /// Character range within the source document
    pub char_range: Range<usize>,
}

/// A document hit aggregated from its matching chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSearchResult {
    pub id: String,
    pub title: Option<String>,
    /// Highest-scoring chunk
    pub best_chunk: ChunkSearchResult,
    /// All matching chunks, best first
    pub matching_chunks: Vec<ChunkSearchResult>,
    /// Score of the best chunk
    pub score: f32,
    /// Mean score over matching chunks
    pub avg_score: f32,
}

/// Chunked TF-IDF index over whole documents.
#[derive(Debug, Clone, Default)]
pub struct ChunkedVectorIndex {
    chunker: TextChunker,
    index: TfIdfIndex,
    documents: HashMap<String, DocumentMeta>,
    chunks: HashMap<String, TextChunk>,
}

impl ChunkedVectorIndex {
    pub fn new(
        chunking: ChunkingConfig,
        search: VectorSearchConfig,
    ) -> Result<Self, VectorError> {
        Ok(Self {
            chunker: TextChunker::new(chunking)?,
            index: TfIdfIndex::new(search)?,
            documents: HashMap::new(),
            chunks: HashMap::new(),
        })
    }

    pub fn chunking_config(&self) -> &ChunkingConfig {
        self.chunker.config()
    }

    /// Replace the chunking parameters. Only affects documents added afterwards.
    pub fn set_chunking_config(&mut self, config: ChunkingConfig) -> Result<(), VectorError> {
        self.chunker.set_config(config)
    }

    pub fn search_config(&self) -> VectorSearchConfig {
        self.index.config()
    }

    pub fn set_search_config(&mut self, config: VectorSearchConfig) -> Result<(), VectorError> {
        self.index.set_config(config)
    }

    /// The underlying chunk-level index.
    pub fn vector_index(&self) -> &TfIdfIndex {
        &self.index
    }

    /// Chunk and index a document, replacing any previous version.
    ///
    /// Returns the number of chunks created.
    pub fn add(&mut self, id: &str, text: &str, info: DocumentInfo) -> usize {
        if self.documents.contains_key(id) {
            self.remove(id);
        }

        let chunks = self.chunker.chunk(text, id);
        let total_chunks = chunks.len();
        let mut chunk_ids = Vec::with_capacity(total_chunks);

        for chunk in chunks {
            self.index.add(&chunk.id, &chunk.content);
            chunk_ids.push(chunk.id.clone());
            self.chunks.insert(chunk.id.clone(), chunk);
        }

        self.documents.insert(
            id.to_string(),
            DocumentMeta {
                id: id.to_string(),
                title: info.title,
                doc_type: info.doc_type,
                path: info.path,
                chunk_ids,
                total_chunks,
                created_at: Utc::now(),
            },
        );

        debug!(id = %id, chunks = total_chunks, "Indexed chunked document");
        total_chunks
    }

    /// Index a loaded source document.
    pub fn add_source(&mut self, doc: &SourceDocument) -> usize {
        self.add(&doc.id, &doc.text, DocumentInfo::from(doc))
    }

    /// Remove a document and all of its chunks.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(meta) = self.documents.remove(id) else {
            return false;
        };

        for chunk_id in &meta.chunk_ids {
            self.index.remove(chunk_id);
            self.chunks.remove(chunk_id);
        }

        debug!(id = %id, chunks = meta.chunk_ids.len(), "Removed chunked document");
        true
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.documents.clear();
        self.chunks.clear();
        info!("Cleared chunked index");
    }

    /// Rank chunks against a query, best first.
    pub fn search_chunks(
        &self,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> Vec<ChunkSearchResult> {
        let hits = self.index.search(query, limit.saturating_mul(2), min_score);

        hits.into_iter()
            .filter_map(|hit| {
                let chunk = self.chunks.get(&hit.id)?;
                let meta = self.documents.get(&chunk.source_id)?;
                Some(ChunkSearchResult {
                    chunk_id: chunk.id.clone(),
                    source_id: chunk.source_id.clone(),
                    title: meta.title.clone(),
                    chunk_index: chunk.index,
                    total_chunks: chunk.total_chunks,
                    content: chunk.content.clone(),
                    score: hit.score,
                    char_range: chunk.char_range(),
                })
            })
            .take(limit)
            .collect()
    }

    /// Rank documents by their best matching chunk, best first.
    pub fn search_documents(
        &self,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> Vec<DocumentSearchResult> {
        if limit == 0 {
            return Vec::new();
        }

        let hits = self.search_chunks(query, limit.saturating_mul(3), min_score);

        let mut grouped: HashMap<String, Vec<ChunkSearchResult>> = HashMap::new();
        for hit in hits {
            grouped.entry(hit.source_id.clone()).or_default().push(hit);
        }

        let mut results: Vec<DocumentSearchResult> = grouped
            .into_iter()
            .filter_map(|(id, mut chunks)| {
                chunks.sort_by(|a, b| compare_scores(a.score, &a.chunk_id, b.score, &b.chunk_id));
                let best_chunk = chunks.first()?.clone();
                let avg_score = chunks.iter().map(|c| c.score).sum::<f32>() / chunks.len() as f32;
                Some(DocumentSearchResult {
                    title: best_chunk.title.clone(),
                    score: best_chunk.score,
                    id,
                    best_chunk,
                    matching_chunks: chunks,
                    avg_score,
                })
            })
            .collect();

        results.sort_by(|a, b| compare_scores(a.score, &a.id, b.score, &b.id));
        results.truncate(limit);
        results
    }

    /// Reconstruct a document's full text from its chunks.
    pub fn get_document_content(&self, id: &str) -> Option<String> {
        let meta = self.documents.get(id)?;
        let chunks: Vec<&TextChunk> = meta
            .chunk_ids
            .iter()
            .filter_map(|chunk_id| self.chunks.get(chunk_id))
            .collect();
        if chunks.is_empty() {
            return None;
        }
        Some(merge_chunks(chunks))
    }

    pub fn document(&self, id: &str) -> Option<&DocumentMeta> {
        self.documents.get(id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentMeta> + '_ {
        self.documents.values()
    }

    pub fn chunk(&self, chunk_id: &str) -> Option<&TextChunk> {
        self.chunks.get(chunk_id)
    }

    /// Chunks of one document in index order.
    pub fn chunks_for(&self, id: &str) -> Vec<&TextChunk> {
        self.documents
            .get(id)
            .map(|meta| {
                meta.chunk_ids
                    .iter()
                    .filter_map(|chunk_id| self.chunks.get(chunk_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chunks() -> ChunkedVectorIndex {
        let chunking = ChunkingConfig::new(50, 10).with_min_chunk_size(10);
        let search = VectorSearchConfig::default();
        ChunkedVectorIndex::new(chunking, search).unwrap()
    }

    fn paragraph(topic: &str, filler: &str) -> String {
        format!("{topic} {}", filler.repeat(40))
    }

    #[test]
    fn test_add_and_document_meta() {
        let mut index = ChunkedVectorIndex::default();
        let created = index.add(
            "notes/rust.md",
            "Rust ownership rules.",
            DocumentInfo::default().with_title("rust").with_doc_type("md"),
        );
        assert_eq!(created, 1);

        let meta = index.document("notes/rust.md").unwrap();
        assert_eq!(meta.title.as_deref(), Some("rust"));
        assert_eq!(meta.doc_type.as_deref(), Some("md"));
        assert_eq!(meta.chunk_ids, vec!["notes/rust.md:chunk-0".to_string()]);
        assert_eq!(meta.total_chunks, 1);
        assert_eq!(index.chunk_count(), 1);
    }

    #[test]
    fn test_search_chunks_resolves_metadata() {
        let mut index = ChunkedVectorIndex::default();
        index.add("d1", "borrow checker errors", DocumentInfo::default().with_title("Borrowing"));
        index.add("d2", "garden planting schedule", DocumentInfo::default());

        let results = index.search_chunks("borrow checker", 10, 0.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_id, "d1");
        assert_eq!(results[0].title.as_deref(), Some("Borrowing"));
        assert_eq!(results[0].chunk_index, 0);
        assert_eq!(results[0].total_chunks, 1);
        assert_eq!(results[0].char_range, 0..21);
    }

    #[test]
    fn test_search_documents_aggregates_chunks() {
        let mut index = small_chunks();
        let text = [
            paragraph("Tokenizer design.", "alpha beta gamma "),
            paragraph("Tokenizer testing.", "delta epsilon zeta "),
            paragraph("Tokenizer release.", "theta iota kappa "),
        ]
        .join("\n\n");
        let created = index.add("doc", &text, DocumentInfo::default());
        assert!(created >= 3);
        index.add("other", "unrelated gardening note", DocumentInfo::default());

        let results = index.search_documents("tokenizer", 10, 0.0);
        assert_eq!(results.len(), 1);

        let doc = &results[0];
        assert_eq!(doc.id, "doc");
        assert!(doc.matching_chunks.len() >= 3);
        assert_eq!(doc.best_chunk, doc.matching_chunks[0]);
        assert!((doc.score - doc.best_chunk.score).abs() < 1e-6);

        let max = doc.matching_chunks.iter().map(|c| c.score).fold(f32::MIN, f32::max);
        assert!((doc.score - max).abs() < 1e-6);
        assert!(doc.avg_score <= doc.score);
        for pair in doc.matching_chunks.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_search_documents_orders_and_limits() {
        let mut index = ChunkedVectorIndex::default();
        index.add("focused", "vector index search", DocumentInfo::default());
        index.add(
            "diluted",
            "vector plus several unrelated gardening words",
            DocumentInfo::default(),
        );
        index.add("none", "python scripting", DocumentInfo::default());

        let results = index.search_documents("vector index", 10, 0.0);
        assert_eq!(results[0].id, "focused");
        assert!(results.iter().all(|r| r.id != "none"));

        assert_eq!(index.search_documents("vector", 1, 0.0).len(), 1);
        assert!(index.search_documents("vector", 0, 0.0).is_empty());
    }

    #[test]
    fn test_get_document_content_round_trip() {
        let mut index = small_chunks();
        let text = "Sentence about chunked retrieval, overlap and merging. ".repeat(40);
        let created = index.add("long", &text, DocumentInfo::default());
        assert!(created >= 5);

        assert_eq!(index.get_document_content("long").unwrap(), text);
        assert!(index.get_document_content("missing").is_none());
    }

    #[test]
    fn test_empty_document_content() {
        let mut index = ChunkedVectorIndex::default();
        assert_eq!(index.add("empty", "", DocumentInfo::default()), 1);
        assert_eq!(index.get_document_content("empty").unwrap(), "");
        assert!(index.search_chunks("anything", 10, 0.0).is_empty());
    }

    #[test]
    fn test_remove_leaves_no_orphans() {
        let mut index = small_chunks();
        let text = "Chunk removal must clean every piece. ".repeat(30);
        index.add("doc", &text, DocumentInfo::default());
        index.add("keep", "a document that stays", DocumentInfo::default());
        let vector_terms_before = index.vector_index().term_count();

        assert!(index.remove("doc"));
        assert!(!index.remove("doc"));

        assert!(!index.contains("doc"));
        assert_eq!(index.document_count(), 1);
        assert_eq!(index.chunk_count(), 1);
        assert_eq!(index.vector_index().len(), 1);
        assert!(index.vector_index().term_count() < vector_terms_before);
        assert!(index.vector_index().ids().all(|id| !id.starts_with("doc:")));
        assert!(index.search_chunks("removal", 10, 0.0).is_empty());
        assert!(index.chunks_for("doc").is_empty());
    }

    #[test]
    fn test_readd_replaces_chunks() {
        let mut index = small_chunks();
        let long = "Original text with many repeated words. ".repeat(30);
        let first = index.add("doc", &long, DocumentInfo::default());
        assert!(first > 1);

        let second = index.add("doc", "replacement", DocumentInfo::default());
        assert_eq!(second, 1);
        assert_eq!(index.chunk_count(), 1);
        assert_eq!(index.vector_index().len(), 1);
        assert!(index.search_chunks("original", 10, 0.0).is_empty());
    }

    #[test]
    fn test_add_source_document() {
        let mut index = ChunkedVectorIndex::default();
        let doc = SourceDocument::new("notes/a.md", "content about caching")
            .with_title("a")
            .with_path("/tmp/notes/a.md");
        index.add_source(&doc);

        let meta = index.document("notes/a.md").unwrap();
        assert_eq!(meta.path.as_deref(), Some("/tmp/notes/a.md"));
        assert_eq!(index.search_documents("caching", 5, 0.0)[0].title.as_deref(), Some("a"));
    }

    #[test]
    fn test_chunks_for_in_order() {
        let mut index = small_chunks();
        let text = "Ordering check for chunk listing output. ".repeat(20);
        index.add("doc", &text, DocumentInfo::default());
        let chunks = index.chunks_for("doc");
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(index.chunk(&chunk.id), Some(*chunk));
        }
    }

    #[test]
    fn test_result_serialization() {
        let mut index = ChunkedVectorIndex::default();
        index.add("d1", "serialized search hit", DocumentInfo::default().with_title("t"));
        let hits = index.search_documents("serialized", 5, 0.0);

        let json = serde_json::to_string(&hits).unwrap();
        let decoded: Vec<DocumentSearchResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, hits);
        assert!(json.contains("\"char_range\":{\"start\":0,\"end\":21}"));
    }

    #[test]
    fn test_clear() {
        let mut index = ChunkedVectorIndex::default();
        index.add("d1", "text", DocumentInfo::default());
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.chunk_count(), 0);
        assert!(index.vector_index().is_empty());
    }
}
