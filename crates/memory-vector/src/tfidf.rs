//! Sparse TF-IDF vector index with cosine ranking.
//!
//! Each document keeps sublinear term weights (`1 + ln(count)`); idf is applied
//! at query time so it always reflects the live corpus. Only documents sharing
//! at least one query term are scored.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use memory_search::{term_counts, tokenize};
use memory_types::{rank_and_truncate, ScoredDocument, VectorSearchConfig};

use crate::error::VectorError;

/// Per-document sparse representation.
#[derive(Debug, Clone)]
struct IndexedDocument {
    /// term -> 1 + ln(count)
    term_weights: HashMap<String, f32>,
    /// sqrt(sum(count^2)) over raw counts
    raw_magnitude: f32,
}

/// TF-IDF index over the shared tokenizer.
#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    config: VectorSearchConfig,
    documents: HashMap<String, IndexedDocument>,
    /// Term -> ids of documents containing it
    inverted: HashMap<String, HashSet<String>>,
}

impl Default for TfIdfIndex {
    fn default() -> Self {
        Self::with_valid_config(VectorSearchConfig::default())
    }
}

impl TfIdfIndex {
    /// Create an empty index.
    pub fn new(config: VectorSearchConfig) -> Result<Self, VectorError> {
        config.validate().map_err(VectorError::InvalidConfig)?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: VectorSearchConfig) -> Self {
        Self {
            config,
            documents: HashMap::new(),
            inverted: HashMap::new(),
        }
    }

    pub fn config(&self) -> VectorSearchConfig {
        self.config
    }

    pub fn set_config(&mut self, config: VectorSearchConfig) -> Result<(), VectorError> {
        config.validate().map_err(VectorError::InvalidConfig)?;
        self.config = config;
        Ok(())
    }

    /// Index a document, replacing any previous version with the same id.
    pub fn add(&mut self, id: &str, text: &str) {
        if self.documents.contains_key(id) {
            self.remove(id);
        }

        let counts = term_counts(&tokenize(text));
        let raw_magnitude = counts
            .values()
            .map(|&c| (c * c) as f32)
            .sum::<f32>()
            .sqrt();

        for term in counts.keys() {
            self.inverted
                .entry(term.clone())
                .or_default()
                .insert(id.to_string());
        }

        let term_weights = counts
            .into_iter()
            .map(|(term, count)| (term, sublinear_tf(count)))
            .collect();

        self.documents.insert(
            id.to_string(),
            IndexedDocument {
                term_weights,
                raw_magnitude,
            },
        );
        trace!(id = %id, "Indexed TF-IDF document");
    }

    /// Remove a document. Returns false if the id was not indexed.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(doc) = self.documents.remove(id) else {
            return false;
        };

        for term in doc.term_weights.keys() {
            if let Some(ids) = self.inverted.get_mut(term) {
                ids.remove(id);
                if ids.is_empty() {
                    self.inverted.remove(term);
                }
            }
        }
        trace!(id = %id, "Removed TF-IDF document");
        true
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.inverted.clear();
    }

    /// Rank documents by cosine similarity to the query, best first.
    ///
    /// Scores below `min_score` are dropped. Documents whose weighted vector
    /// has zero magnitude are skipped.
    pub fn search(&self, query: &str, limit: usize, min_score: f32) -> Vec<ScoredDocument> {
        if limit == 0 || self.documents.is_empty() {
            return Vec::new();
        }

        let n = self.documents.len();
        let formula = self.config.idf;

        // Unseen terms carry df = 0 and still count toward the query magnitude
        let mut query_vector: HashMap<String, f32> = HashMap::new();
        let mut candidates: HashSet<&str> = HashSet::new();
        for (term, count) in term_counts(&tokenize(query)) {
            let postings = self.inverted.get(&term);
            let df = postings.map_or(0, HashSet::len);
            if let Some(ids) = postings {
                candidates.extend(ids.iter().map(String::as_str));
            }
            query_vector.insert(term, sublinear_tf(count) * formula.idf(n, df));
        }
        if candidates.is_empty() {
            return Vec::new();
        }

        let query_magnitude = query_vector.values().map(|w| w * w).sum::<f32>().sqrt();
        if query_magnitude == 0.0 {
            return Vec::new();
        }

        let mut idf_cache: HashMap<&str, f32> = HashMap::new();
        let mut results = Vec::new();

        for id in candidates {
            let Some(doc) = self.documents.get(id) else {
                continue;
            };

            let mut dot = 0.0;
            let mut doc_magnitude_sq = 0.0;
            for (term, tf) in &doc.term_weights {
                let idf = *idf_cache.entry(term.as_str()).or_insert_with(|| {
                    let df = self.inverted.get(term).map_or(0, HashSet::len);
                    formula.idf(n, df)
                });
                let weight = tf * idf;
                doc_magnitude_sq += weight * weight;
                if let Some(q) = query_vector.get(term.as_str()) {
                    dot += q * weight;
                }
            }

            if doc_magnitude_sq == 0.0 {
                continue;
            }
            let score = dot / (query_magnitude * doc_magnitude_sq.sqrt());
            if score >= min_score {
                results.push(ScoredDocument::new(id, score));
            }
        }

        rank_and_truncate(&mut results, limit);
        debug!(
            query_terms = query_vector.len(),
            results = results.len(),
            "TF-IDF search complete"
        );
        results
    }

    /// Search with the configured default limit and minimum score.
    pub fn search_with_defaults(&self, query: &str) -> Vec<ScoredDocument> {
        self.search(query, self.config.default_limit, self.config.min_score)
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

    /// Number of distinct terms in the inverted index.
    pub fn term_count(&self) -> usize {
        self.inverted.len()
    }

    /// Number of live documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.inverted.get(term).map_or(0, HashSet::len)
    }

    /// Sorted distinct terms of one document.
    pub fn terms_for(&self, id: &str) -> Option<Vec<&str>> {
        let doc = self.documents.get(id)?;
        let mut terms: Vec<&str> = doc.term_weights.keys().map(String::as_str).collect();
        terms.sort_unstable();
        Some(terms)
    }

    /// Euclidean norm of the raw term counts of one document.
    pub fn raw_magnitude(&self, id: &str) -> Option<f32> {
        self.documents.get(id).map(|doc| doc.raw_magnitude)
    }
}

fn sublinear_tf(count: usize) -> f32 {
    if count == 0 {
        0.0
    } else {
        1.0 + (count as f32).ln()
    }
}
