//! Scored search hits shared by every index type.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A document id paired with a relevance score.
///
/// Scores are only comparable within the results of a single search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Document ID
    pub id: String,
    /// Relevance score (higher = more relevant)
    pub score: f32,
}

impl ScoredDocument {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// Order by descending score, breaking ties by ascending id.
///
/// NaN scores compare as equal so sorting never panics.
pub fn compare_scores(a_score: f32, a_id: &str, b_score: f32, b_id: &str) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_id.cmp(b_id))
}

/// Sort hits best-first and keep at most `limit`.
pub fn rank_and_truncate(results: &mut Vec<ScoredDocument>, limit: usize) {
    results.sort_by(|a, b| compare_scores(a.score, &a.id, b.score, &b.id));
    results.truncate(limit);
}
