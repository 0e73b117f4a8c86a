//! Error path E2E tests.
//!
//! Degenerate inputs must produce empty or well-formed results rather than
//! panics, and invalid configuration must be rejected with the offending
//! field named in the message.

use pretty_assertions::assert_eq;

use e2e_tests::topic_corpus;
use memory_indexing::{build_index, IndexUpdater, NoOpProgressCallback, RebuildConfig};
use memory_search::{Bm25Index, HybridDocument, HybridSearchIndex, SearchError};
use memory_types::{
    Bm25Config, ChunkingConfig, HybridConfig, SourceDocument, StaticSource, VectorSearchConfig,
};
use memory_vector::{merge_chunks, ChunkedVectorIndex, TextChunker, TfIdfIndex, VectorError};

const DEGENERATE_QUERIES: &[&str] = &["", "   ", "\n\t", "!!! ... ???", "a", "🦀🦀"];

#[test]
fn test_degenerate_queries_return_empty() {
    let mut tfidf = TfIdfIndex::default();
    let mut bm25 = Bm25Index::default();
    let mut chunked = ChunkedVectorIndex::default();
    let mut hybrid = HybridSearchIndex::default();
    for doc in topic_corpus() {
        tfidf.index_document(&doc);
        bm25.index_document(&doc);
        chunked.index_document(&doc);
        hybrid.index_document(&doc);
    }

    for query in DEGENERATE_QUERIES {
        assert!(tfidf.search(query, 10, 0.0).is_empty(), "tfidf {query:?}");
        assert!(bm25.search(query, 10).is_empty(), "bm25 {query:?}");
        assert!(chunked.search_chunks(query, 10, 0.0).is_empty(), "chunks {query:?}");
        assert!(chunked.search_documents(query, 10, 0.0).is_empty(), "documents {query:?}");
        assert!(hybrid.search(query, None, 10).is_empty(), "hybrid {query:?}");
    }
}

#[test]
fn test_empty_indices_return_empty() {
    assert!(TfIdfIndex::default().search("rust", 10, 0.0).is_empty());
    assert!(Bm25Index::default().search("rust", 10).is_empty());
    assert!(ChunkedVectorIndex::default().search_documents("rust", 10, 0.0).is_empty());
    assert!(HybridSearchIndex::default()
        .search("rust", Some(&[1.0, 0.0][..]), 10)
        .is_empty());
}

#[test]
fn test_blank_documents_chunk_and_index() {
    let chunker = TextChunker::default();
    for text in ["", "   ", "\n\n\n"] {
        let chunks = chunker.chunk(text, "blank");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, text);
        assert_eq!(merge_chunks(&chunks), text);
    }

    let mut index = ChunkedVectorIndex::default();
    assert_eq!(index.add("blank", "", Default::default()), 1);
    assert_eq!(index.get_document_content("blank").unwrap(), "");
    assert!(index.search_chunks("anything", 10, 0.0).is_empty());

    // Blank documents never surface in results and never disturb other scores
    let mut bm25 = Bm25Index::default();
    bm25.add("blank", "   ");
    bm25.add("real", "rust ownership");
    assert_eq!(bm25.search("rust", 10)[0].id, "real");
}

#[test]
fn test_rebuild_skip_empty() {
    let source = StaticSource::new(
        "mixed",
        vec![
            SourceDocument::new("a", "rust notes"),
            SourceDocument::new("b", "  \n "),
            SourceDocument::new("c", ""),
        ],
    );

    let config = RebuildConfig::default().with_skip_empty(true);
    let (index, progress) =
        build_index(TfIdfIndex::default(), &source, &config, &NoOpProgressCallback).unwrap();
    assert_eq!(progress.documents_indexed, 1);
    assert_eq!(progress.skipped, 2);
    assert_eq!(index.len(), 1);

    let (index, progress) = build_index(
        TfIdfIndex::default(),
        &source,
        &RebuildConfig::default(),
        &NoOpProgressCallback,
    )
    .unwrap();
    assert_eq!(progress.documents_indexed, 3);
    assert_eq!(index.len(), 3);
}

#[test]
fn test_invalid_chunking_config_names_field() {
    let err = TextChunker::new(ChunkingConfig::new(100, 100)).unwrap_err();
    let VectorError::InvalidConfig(message) = err;
    assert!(message.contains("overlap"), "got: {message}");

    let err = ChunkedVectorIndex::new(
        ChunkingConfig::new(100, 10).with_chars_per_token(f32::NAN),
        VectorSearchConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("chars_per_token"), "got: {err}");
}

#[test]
fn test_invalid_search_configs_name_field() {
    let err = Bm25Index::new(Bm25Config::new(1.2, 2.0)).unwrap_err();
    assert!(err.to_string().contains("b must"), "got: {err}");

    let err = HybridSearchIndex::new(HybridConfig::weighted(-1.0, 0.5), Bm25Config::default())
        .unwrap_err();
    assert!(matches!(&err, SearchError::InvalidConfig(m) if m.contains("vector_weight")));

    let err = HybridSearchIndex::new(HybridConfig::rrf(0.0), Bm25Config::default()).unwrap_err();
    assert!(err.to_string().contains("rrf_k"), "got: {err}");

    // A rejected config leaves the live index untouched
    let mut index = HybridSearchIndex::default();
    index.add(HybridDocument::new("doc", "rust ownership"));
    assert!(index.set_config(HybridConfig::rrf(-5.0)).is_err());
    assert_eq!(index.config(), HybridConfig::default());
    assert_eq!(index.search("rust", None, 10).len(), 1);
}

#[test]
fn test_remove_unknown_ids_is_noop() {
    let mut tfidf = TfIdfIndex::default();
    let mut bm25 = Bm25Index::default();
    let mut chunked = ChunkedVectorIndex::default();
    let mut hybrid = HybridSearchIndex::default();
    for doc in topic_corpus() {
        tfidf.index_document(&doc);
        bm25.index_document(&doc);
        chunked.index_document(&doc);
        hybrid.index_document(&doc);
    }

    assert!(!tfidf.remove_document("missing"));
    assert!(!bm25.remove_document("missing"));
    assert!(!chunked.remove_document("missing"));
    assert!(!hybrid.remove_document("missing"));
    assert_eq!(tfidf.document_count(), 3);
    assert_eq!(bm25.document_count(), 3);
    assert_eq!(chunked.document_count(), 3);
    assert_eq!(hybrid.document_count(), 3);
}
