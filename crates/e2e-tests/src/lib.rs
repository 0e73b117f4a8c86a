//! End-to-end test infrastructure for the retrieval engine.
//!
//! Provides a shared TestHarness and corpus generators for tests that cross
//! the tokenizer, index, chunking and rebuild crates.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use memory_types::SourceDocument;

/// Vocabulary for generated prose.
pub const WORDS: &[&str] = &[
    "memory", "index", "search", "token", "chunk", "vector", "ranking", "query", "rust",
    "borrow", "ownership", "thread", "lock", "cache", "merge", "window", "overlap", "score",
    "cosine", "keyword", "fusion", "document", "corpus", "term", "weight", "signal", "graph",
    "latency", "buffer", "stream",
];

/// Fragments mixed into unicode stress text.
const UNICODE_FRAGMENTS: &[&str] = &[
    "内存安全", "检索", "café", "naïve", "Ærø", "🦀", "👩‍💻", "\t", "\n", "\n\n", "  ", ". ",
    ", ", "; ", "! ", "? ", "über", "日本語", "x",
];

/// Shared test harness for E2E tests.
///
/// Owns a temp directory that notes can be written into and loaded back
/// through a `DirectorySource`.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Root of the notes tree
    pub notes_dir: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with an empty notes directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let notes_dir = temp_dir.path().join("notes");
        std::fs::create_dir_all(&notes_dir).expect("Failed to create notes dir");

        Self {
            _temp_dir: temp_dir,
            notes_dir,
        }
    }

    /// Write a note at `relative` under the notes directory.
    pub fn write_note(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.notes_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create note dir");
        }
        std::fs::write(&path, text).expect("Failed to write note");
        path
    }

    /// Delete a note.
    pub fn remove_note(&self, relative: &str) {
        std::fs::remove_file(self.notes_dir.join(relative)).expect("Failed to remove note");
    }

    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic RNG for reproducible corpora.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `count` random vocabulary words separated by single spaces.
pub fn random_words(rng: &mut impl Rng, count: usize) -> String {
    (0..count)
        .map(|_| WORDS[rng.random_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Random prose: capitalized sentences, commas, and paragraph breaks.
pub fn random_prose(rng: &mut impl Rng, sentences: usize) -> String {
    let mut text = String::new();
    for i in 0..sentences {
        if i > 0 {
            text.push_str(if rng.random_bool(0.15) { "\n\n" } else { " " });
        }
        let len = rng.random_range(4..14);
        let mut sentence = random_words(rng, len);
        if rng.random_bool(0.3) {
            let comma_at = sentence.find(' ').unwrap_or(sentence.len());
            sentence.insert(comma_at, ',');
        }
        let mut chars = sentence.chars();
        if let Some(first) = chars.next() {
            text.extend(first.to_uppercase());
            text.push_str(chars.as_str());
        }
        text.push(['.', '!', '?'][rng.random_range(0..3)]);
    }
    text
}

/// Text of roughly `min_chars` characters mixing ASCII words, CJK, emoji and
/// irregular whitespace.
pub fn random_unicode_text(rng: &mut impl Rng, min_chars: usize) -> String {
    let mut text = String::new();
    let mut count = 0;
    while count < min_chars {
        let piece = if rng.random_bool(0.6) {
            WORDS[rng.random_range(0..WORDS.len())].to_string() + " "
        } else {
            UNICODE_FRAGMENTS[rng.random_range(0..UNICODE_FRAGMENTS.len())].to_string()
        };
        count += piece.chars().count();
        text.push_str(&piece);
    }
    text
}

/// ASCII word text of exactly `chars` characters.
pub fn text_of_len(rng: &mut impl Rng, chars: usize) -> String {
    let mut text = String::new();
    while text.len() < chars {
        text.push_str(WORDS[rng.random_range(0..WORDS.len())]);
        text.push(' ');
    }
    text.truncate(chars);
    text
}

/// Three topically distinct documents.
pub fn topic_corpus() -> Vec<SourceDocument> {
    vec![
        SourceDocument::new(
            "rust",
            "Rust ownership and borrow checker ensures memory safety without garbage collection",
        )
        .with_title("Rust"),
        SourceDocument::new(
            "python",
            "Python web frameworks like Django and Flask provide rapid development for web apps",
        )
        .with_title("Python"),
        SourceDocument::new(
            "sql",
            "Database query optimization using SQL indexing and execution plans for performance",
        )
        .with_title("SQL"),
    ]
}

/// Random unit-scale embedding.
pub fn random_embedding(rng: &mut impl Rng, dims: usize) -> Vec<f32> {
    (0..dims).map(|_| rng.random_range(-1.0..1.0)).collect()
}
