//! Hybrid BM25 + embedding search.
//!
//! Owns a [`Bm25Index`] plus the hybrid documents. Embeddings are supplied by
//! the caller and never computed here; vector scores are cosine similarities
//! between a caller-supplied query embedding and each embedded document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use memory_types::{rank_and_truncate, Bm25Config, HybridConfig, ScoredDocument};

use crate::bm25::Bm25Index;
use crate::error::SearchError;
use crate::fusion::{reciprocal_rank_fusion, weighted_fusion, FusedScore};

/// A document held by the hybrid index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridDocument {
    pub id: String,
    pub content: String,
    /// Externally computed embedding, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Opaque caller metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl HybridDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A fused hybrid search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSearchResult {
    pub id: String,
    /// Fused score (blend or RRF, depending on config)
    pub score: f32,
    /// Raw cosine similarity, 0 when the document was not in the vector list
    pub vector_score: f32,
    /// Raw BM25 score, 0 when the document was not in the BM25 list
    pub bm25_score: f32,
    pub content: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched dimensions or a zero-magnitude vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Hybrid keyword + embedding index.
#[derive(Debug, Clone, Default)]
pub struct HybridSearchIndex {
    config: HybridConfig,
    bm25: Bm25Index,
    documents: HashMap<String, HybridDocument>,
}

impl HybridSearchIndex {
    /// Create an empty index.
    pub fn new(config: HybridConfig, bm25_config: Bm25Config) -> Result<Self, SearchError> {
        config.validate().map_err(SearchError::InvalidConfig)?;
        Ok(Self {
            config,
            bm25: Bm25Index::new(bm25_config)?,
            documents: HashMap::new(),
        })
    }

    pub fn config(&self) -> HybridConfig {
        self.config
    }

    /// Replace fusion settings. Applies from the next search.
    pub fn set_config(&mut self, config: HybridConfig) -> Result<(), SearchError> {
        config.validate().map_err(SearchError::InvalidConfig)?;
        self.config = config;
        Ok(())
    }

    /// Replace BM25 parameters. Applies from the next search.
    pub fn set_bm25_config(&mut self, config: Bm25Config) -> Result<(), SearchError> {
        self.bm25.set_config(config)
    }

    /// The underlying keyword index.
    pub fn bm25_index(&self) -> &Bm25Index {
        &self.bm25
    }

    /// Add a document, replacing any previous version with the same id.
    pub fn add(&mut self, document: HybridDocument) {
        if self.documents.contains_key(&document.id) {
            self.remove(&document.id);
        }
        self.bm25.add(&document.id, &document.content);
        trace!(
            id = %document.id,
            embedded = document.embedding.is_some(),
            "Indexed hybrid document"
        );
        self.documents.insert(document.id.clone(), document);
    }

    /// Remove a document. Returns false if the id was not indexed.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.documents.remove(id).is_none() {
            return false;
        }
        self.bm25.remove(id);
        true
    }

    /// Attach or replace the embedding of an indexed document.
    ///
    /// Returns false if the id was not indexed.
    pub fn set_embedding(&mut self, id: &str, embedding: Vec<f32>) -> bool {
        match self.documents.get_mut(id) {
            Some(doc) => {
                doc.embedding = Some(embedding);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&HybridDocument> {
        self.documents.get(id)
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.bm25.clear();
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.documents.keys().map(String::as_str)
    }

    /// Number of documents carrying an embedding.
    pub fn embedded_count(&self) -> usize {
        self.documents
            .values()
            .filter(|doc| doc.embedding.is_some())
            .count()
    }

    /// Search with BM25 and, when a query embedding is supplied, embedding similarity.
    ///
    /// BM25 contributes its top `limit * 2` hits; the vector side scores every
    /// embedded document of matching dimension. Results below
    /// `config.min_score` (on the fused score) are dropped.
    pub fn search(
        &self,
        query: &str,
        query_embedding: Option<&[f32]>,
        limit: usize,
    ) -> Vec<HybridSearchResult> {
        if limit == 0 {
            return Vec::new();
        }

        let bm25_hits = self.bm25.search(query, limit.saturating_mul(2));
        let vector_hits = match query_embedding {
            Some(embedding) if !embedding.is_empty() => self.vector_search(embedding),
            _ => Vec::new(),
        };

        if bm25_hits.is_empty() && vector_hits.is_empty() {
            return Vec::new();
        }

        let fused = if self.config.use_rrf {
            reciprocal_rank_fusion(
                &bm25_hits,
                &vector_hits,
                self.documents.len(),
                self.config.rrf_k,
            )
        } else {
            weighted_fusion(
                &bm25_hits,
                &vector_hits,
                self.config.vector_weight,
                self.config.bm25_weight,
            )
        };

        let results: Vec<HybridSearchResult> = fused
            .into_iter()
            .filter(|f| f.score >= self.config.min_score)
            .take(limit)
            .filter_map(|f| self.to_result(f))
            .collect();

        debug!(
            bm25_hits = bm25_hits.len(),
            vector_hits = vector_hits.len(),
            rrf = self.config.use_rrf,
            results = results.len(),
            "Hybrid search complete"
        );
        results
    }

    /// Cosine similarity of every embedded document, best first.
    fn vector_search(&self, query_embedding: &[f32]) -> Vec<ScoredDocument> {
        let mut hits: Vec<ScoredDocument> = self
            .documents
            .values()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_deref()?;
                if embedding.len() != query_embedding.len() {
                    trace!(
                        id = %doc.id,
                        expected = query_embedding.len(),
                        actual = embedding.len(),
                        "Skipping embedding with mismatched dimension"
                    );
                    return None;
                }
                Some(ScoredDocument::new(
                    doc.id.as_str(),
                    cosine_similarity(query_embedding, embedding),
                ))
            })
            .collect();
        rank_and_truncate(&mut hits, usize::MAX);
        hits
    }

    fn to_result(&self, fused: FusedScore) -> Option<HybridSearchResult> {
        let doc = self.documents.get(&fused.id)?;
        Some(HybridSearchResult {
            id: fused.id,
            score: fused.score,
            vector_score: fused.vector_score,
            bm25_score: fused.bm25_score,
            content: doc.content.clone(),
            metadata: doc.metadata.clone(),
        })
    }
}
