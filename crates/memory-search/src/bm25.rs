//! In-process Okapi BM25 keyword index.
//!
//! Scores each document against a query as
//! `sum(idf * tf * (k1 + 1) / (tf + k1 * (1 - b + b * len / avg_len)))`
//! with `idf = ln((N - df + 0.5) / (df + 0.5) + 1)`, which is never negative.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use memory_types::{rank_and_truncate, Bm25Config, ScoredDocument};

use crate::error::SearchError;
use crate::tokenizer::{term_counts, tokenize};

/// Per-document record: raw term counts and token length.
#[derive(Debug, Clone)]
struct Bm25Document {
    term_freqs: HashMap<String, usize>,
    length: usize,
}

/// BM25 keyword index over the shared tokenizer.
///
/// Not internally synchronized; see `memory_indexing::SharedIndex` for
/// sharing one instance across threads.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    config: Bm25Config,
    documents: HashMap<String, Bm25Document>,
    /// Term -> ids of documents containing it
    postings: HashMap<String, HashSet<String>>,
    total_length: usize,
    avg_doc_length: f32,
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::with_valid_config(Bm25Config::default())
    }
}

impl Bm25Index {
    /// Create an empty index with the given parameters.
    pub fn new(config: Bm25Config) -> Result<Self, SearchError> {
        config.validate().map_err(SearchError::InvalidConfig)?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: Bm25Config) -> Self {
        Self {
            config,
            documents: HashMap::new(),
            postings: HashMap::new(),
            total_length: 0,
            avg_doc_length: 0.0,
        }
    }

    pub fn config(&self) -> Bm25Config {
        self.config
    }

    /// Replace the scoring parameters. Applies from the next search.
    pub fn set_config(&mut self, config: Bm25Config) -> Result<(), SearchError> {
        config.validate().map_err(SearchError::InvalidConfig)?;
        self.config = config;
        Ok(())
    }

    /// Index a document, replacing any previous version with the same id.
    pub fn add(&mut self, id: &str, text: &str) {
        if self.documents.contains_key(id) {
            self.remove(id);
        }

        let tokens = tokenize(text);
        let length = tokens.len();
        let term_freqs = term_counts(&tokens);

        for term in term_freqs.keys() {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(id.to_string());
        }

        self.documents
            .insert(id.to_string(), Bm25Document { term_freqs, length });
        self.total_length += length;
        self.update_average_length();

        trace!(id = %id, tokens = length, "Indexed BM25 document");
    }

    /// Remove a document. Returns false if the id was not indexed.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(doc) = self.documents.remove(id) else {
            return false;
        };

        for term in doc.term_freqs.keys() {
            if let Some(ids) = self.postings.get_mut(term) {
                ids.remove(id);
                if ids.is_empty() {
                    self.postings.remove(term);
                }
            }
        }

        self.total_length -= doc.length;
        self.update_average_length();

        trace!(id = %id, "Removed BM25 document");
        true
    }

    /// Remove every document.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.postings.clear();
        self.total_length = 0;
        self.avg_doc_length = 0.0;
    }

    /// Rank documents against a query, best first.
    ///
    /// Documents sharing no term with the query score zero and are excluded.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredDocument> {
        if limit == 0 || self.documents.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let query_terms: Vec<String> = tokenize(query)
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .collect();
        if query_terms.is_empty() {
            return Vec::new();
        }

        let n = self.documents.len() as f32;
        let Bm25Config { k1, b } = self.config;
        let mut scores: HashMap<&str, f32> = HashMap::new();

        for term in &query_terms {
            let Some(ids) = self.postings.get(term) else {
                continue;
            };
            let df = ids.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for id in ids {
                let Some(doc) = self.documents.get(id) else {
                    continue;
                };
                let tf = doc.term_freqs.get(term).copied().unwrap_or(0) as f32;
                if tf == 0.0 || self.avg_doc_length <= 0.0 {
                    continue;
                }
                let length_ratio = doc.length as f32 / self.avg_doc_length;
                let denominator = tf + k1 * (1.0 - b + b * length_ratio);
                if denominator <= 0.0 {
                    continue;
                }
                *scores.entry(id.as_str()).or_insert(0.0) += idf * tf * (k1 + 1.0) / denominator;
            }
        }

        let mut results: Vec<ScoredDocument> = scores
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .map(|(id, score)| ScoredDocument::new(id, score))
            .collect();
        rank_and_truncate(&mut results, limit);

        debug!(
            query_terms = query_terms.len(),
            results = results.len(),
            "BM25 search complete"
        );
        results
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

    /// Indexed document ids in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.documents.keys().map(String::as_str)
    }

    /// Running average token length across live documents.
    pub fn average_document_length(&self) -> f32 {
        self.avg_doc_length
    }

    /// Token length of one document.
    pub fn document_length(&self, id: &str) -> Option<usize> {
        self.documents.get(id).map(|doc| doc.length)
    }

    /// Number of live documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, HashSet::len)
    }

    /// Number of distinct terms in the inverted index.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    fn update_average_length(&mut self) {
        self.avg_doc_length = if self.documents.is_empty() {
            0.0
        } else {
            self.total_length as f32 / self.documents.len() as f32
        };
    }
}
