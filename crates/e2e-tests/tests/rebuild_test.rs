//! Directory-to-query pipeline E2E tests.
//!
//! Notes on disk -> DirectorySource -> rebuild into a SharedIndex -> search,
//! including rebuilds under concurrent readers and layered settings.

use pretty_assertions::assert_eq;

use e2e_tests::{random_prose, seeded_rng, topic_corpus, TestHarness};
use memory_indexing::{
    build_index, rebuild_index, DirectorySource, IndexingError, LoggingProgressCallback,
    NoOpProgressCallback, RebuildConfig, SharedIndex,
};
use memory_search::Bm25Index;
use memory_types::{IdfFormula, Settings, StaticSource};
use memory_vector::{ChunkedVectorIndex, TfIdfIndex};

fn write_topic_notes(harness: &TestHarness) {
    for doc in topic_corpus() {
        harness.write_note(&format!("topics/{}.md", doc.id), &doc.text);
    }
}

#[test]
fn test_directory_rebuild_then_search() {
    let harness = TestHarness::new();
    write_topic_notes(&harness);
    let mut rng = seeded_rng(61);
    harness.write_note("journal/long.txt", &random_prose(&mut rng, 200));

    let shared = SharedIndex::new(ChunkedVectorIndex::default());
    let source = DirectorySource::new(harness.notes_dir());
    let result = rebuild_index(
        &shared,
        ChunkedVectorIndex::default(),
        &source,
        &RebuildConfig::default(),
        &LoggingProgressCallback::new(10),
    )
    .unwrap();

    assert_eq!(result.progress.documents_indexed, 4);
    assert_eq!(result.generation, 1);

    let hits =
        shared.read(|index| index.search_documents("borrow checker garbage collection", 5, 0.0));
    assert_eq!(hits[0].id, "topics/rust.md");
    assert_eq!(hits[0].title.as_deref(), Some("rust"));

    let chunks = shared.read(|index| index.chunks_for("journal/long.txt").len());
    assert!(chunks >= 5);
}

#[test]
fn test_rebuild_picks_up_changes() {
    let harness = TestHarness::new();
    write_topic_notes(&harness);
    let source = DirectorySource::new(harness.notes_dir());
    let shared = SharedIndex::new(Bm25Index::default());

    rebuild_index(
        &shared,
        Bm25Index::default(),
        &source,
        &RebuildConfig::default(),
        &NoOpProgressCallback,
    )
    .unwrap();
    assert_eq!(shared.read(|index| index.search("django", 10).len()), 1);

    harness.remove_note("topics/python.md");
    harness.write_note("topics/go.md", "Go channels and goroutines for concurrency");
    let result = rebuild_index(
        &shared,
        Bm25Index::default(),
        &source,
        &RebuildConfig::default(),
        &NoOpProgressCallback,
    )
    .unwrap();

    assert_eq!(result.generation, 2);
    assert!(shared.read(|index| index.search("django", 10).is_empty()));
    assert_eq!(
        shared.read(|index| index.search("goroutines", 10))[0].id,
        "topics/go.md"
    );
}

#[test]
fn test_searches_during_rebuild_see_complete_index() {
    let first = StaticSource::from_pairs(
        "first",
        (0..200).map(|i| (format!("old-{i}"), "legacy archive entry".to_string())),
    );
    let second = StaticSource::from_pairs(
        "second",
        (0..200).map(|i| (format!("new-{i}"), "current release entry".to_string())),
    );

    let (initial, _) = build_index(
        TfIdfIndex::default(),
        &first,
        &RebuildConfig::default(),
        &NoOpProgressCallback,
    )
    .unwrap();
    let shared = SharedIndex::new(initial);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let shared = &shared;
            scope.spawn(move || {
                for _ in 0..50 {
                    let (legacy, current) = shared.read(|index| {
                        (
                            index.search("legacy", 500, 0.0).len(),
                            index.search("current", 500, 0.0).len(),
                        )
                    });
                    assert!(
                        (legacy, current) == (200, 0) || (legacy, current) == (0, 200),
                        "saw a partial index: {legacy} legacy, {current} current"
                    );
                }
            });
        }

        rebuild_index(
            &shared,
            TfIdfIndex::default(),
            &second,
            &RebuildConfig::default().with_batch_size(25),
            &NoOpProgressCallback,
        )
        .unwrap();
    });

    assert_eq!(shared.read(|index| index.search("current", 500, 0.0).len()), 200);
}

#[test]
fn test_rebuild_from_missing_directory_keeps_index() {
    let harness = TestHarness::new();
    write_topic_notes(&harness);
    let shared = SharedIndex::new(Bm25Index::default());
    rebuild_index(
        &shared,
        Bm25Index::default(),
        &DirectorySource::new(harness.notes_dir()),
        &RebuildConfig::default(),
        &NoOpProgressCallback,
    )
    .unwrap();

    let missing = DirectorySource::new(harness.notes_dir().join("nope"));
    let result = rebuild_index(
        &shared,
        Bm25Index::default(),
        &missing,
        &RebuildConfig::default(),
        &NoOpProgressCallback,
    );
    assert!(matches!(result, Err(IndexingError::Memory(_))));
    assert_eq!(shared.generation(), 1);
    assert_eq!(shared.read(Bm25Index::len), 3);
}

#[test]
fn test_settings_file_drives_indices() {
    let harness = TestHarness::new();
    let config_path = harness.write_note(
        "retrieval.toml",
        r#"
log_level = "debug"

[chunking]
chunk_size = 100
overlap = 20
min_chunk_size = 10

[bm25]
k1 = 1.5
b = 0.5

[vector]
idf = "classic"
"#,
    );

    let settings = Settings::load(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(settings.log_level, "debug");
    assert_eq!(settings.chunking.chunk_size, 100);
    assert_eq!(settings.vector.idf, IdfFormula::Classic);
    assert!((settings.bm25.k1 - 1.5).abs() < f32::EPSILON);

    let mut index = ChunkedVectorIndex::new(settings.chunking.clone(), settings.vector).unwrap();
    let mut rng = seeded_rng(71);
    let text = random_prose(&mut rng, 60);
    index.add("doc", &text, Default::default());

    // 400-char windows with 320-char steps
    let chunks = index.chunks_for("doc");
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.char_len() <= 400));
    assert_eq!(index.get_document_content("doc").unwrap(), text);
}

#[test]
fn test_invalid_settings_file_rejected() {
    let harness = TestHarness::new();
    let config_path = harness.write_note("bad.toml", "[chunking]\nchunk_size = 50\noverlap = 60\n");
    assert!(Settings::load(Some(config_path.to_str().unwrap())).is_err());
}
