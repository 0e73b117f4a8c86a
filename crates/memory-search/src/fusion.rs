//! Score fusion for hybrid search.
//!
//! Two strategies combine a BM25 list with an embedding-similarity list:
//! - Weighted blend: `vector_weight * norm(vector) + bm25_weight * norm(bm25)`
//!   after independent min-max normalization of each list
//! - Reciprocal rank fusion: `1 / (k + bm25_rank) + 1 / (k + vector_rank)`,
//!   with a document missing from a list ranked `document_count + 1`
//!
//! Both inputs are expected best-first, as returned by the indices.

use std::collections::HashMap;

use memory_types::{compare_scores, ScoredDocument};

/// One fused candidate with the raw inputs that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedScore {
    pub id: String,
    /// Fused score
    pub score: f32,
    /// Raw embedding similarity (0 when absent from the vector list)
    pub vector_score: f32,
    /// Raw BM25 score (0 when absent from the BM25 list)
    pub bm25_score: f32,
}

/// Min-max normalize a score list into `[0, 1]`.
///
/// A uniform list (including a single hit) normalizes to 1.0 everywhere; an
/// empty list yields an empty map.
pub fn min_max_normalize(hits: &[ScoredDocument]) -> HashMap<&str, f32> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for hit in hits {
        min = min.min(hit.score);
        max = max.max(hit.score);
    }

    let range = max - min;
    hits.iter()
        .map(|hit| {
            let normalized = if range > f32::EPSILON {
                (hit.score - min) / range
            } else {
                1.0
            };
            (hit.id.as_str(), normalized)
        })
        .collect()
}

/// Weighted blend of independently normalized lists.
pub fn weighted_fusion(
    bm25_hits: &[ScoredDocument],
    vector_hits: &[ScoredDocument],
    vector_weight: f32,
    bm25_weight: f32,
) -> Vec<FusedScore> {
    let norm_bm25 = min_max_normalize(bm25_hits);
    let norm_vector = min_max_normalize(vector_hits);

    let mut fused = collect_candidates(bm25_hits, vector_hits);
    for entry in &mut fused {
        let v = norm_vector.get(entry.id.as_str()).copied().unwrap_or(0.0);
        let k = norm_bm25.get(entry.id.as_str()).copied().unwrap_or(0.0);
        entry.score = vector_weight * v + bm25_weight * k;
    }
    sort_fused(&mut fused);
    fused
}

/// Reciprocal rank fusion over both lists.
///
/// `document_count` is the size of the searched corpus; a candidate missing
/// from one list takes rank `document_count + 1` there instead of being dropped.
pub fn reciprocal_rank_fusion(
    bm25_hits: &[ScoredDocument],
    vector_hits: &[ScoredDocument],
    document_count: usize,
    k: f32,
) -> Vec<FusedScore> {
    let bm25_ranks = ranks(bm25_hits);
    let vector_ranks = ranks(vector_hits);
    let missing_rank = document_count as f32 + 1.0;

    let mut fused = collect_candidates(bm25_hits, vector_hits);
    for entry in &mut fused {
        let bm25_rank = bm25_ranks
            .get(entry.id.as_str())
            .copied()
            .unwrap_or(missing_rank);
        let vector_rank = vector_ranks
            .get(entry.id.as_str())
            .copied()
            .unwrap_or(missing_rank);
        entry.score = 1.0 / (k + bm25_rank) + 1.0 / (k + vector_rank);
    }
    sort_fused(&mut fused);
    fused
}

/// 1-based rank of each id in a best-first list.
fn ranks(hits: &[ScoredDocument]) -> HashMap<&str, f32> {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| (hit.id.as_str(), (i + 1) as f32))
        .collect()
}

/// Union of both lists with raw scores filled in and the fused score zeroed.
fn collect_candidates(
    bm25_hits: &[ScoredDocument],
    vector_hits: &[ScoredDocument],
) -> Vec<FusedScore> {
    let mut by_id: HashMap<&str, FusedScore> = HashMap::new();

    for hit in bm25_hits {
        by_id
            .entry(hit.id.as_str())
            .or_insert_with(|| empty_entry(&hit.id))
            .bm25_score = hit.score;
    }
    for hit in vector_hits {
        by_id
            .entry(hit.id.as_str())
            .or_insert_with(|| empty_entry(&hit.id))
            .vector_score = hit.score;
    }

    by_id.into_values().collect()
}

fn empty_entry(id: &str) -> FusedScore {
    FusedScore {
        id: id.to_string(),
        score: 0.0,
        vector_score: 0.0,
        bm25_score: 0.0,
    }
}

fn sort_fused(fused: &mut [FusedScore]) {
    fused.sort_by(|a, b| compare_scores(a.score, &a.id, b.score, &b.id));
}
