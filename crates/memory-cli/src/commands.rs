//! Command implementations.
//!
//! Handlers build their indices in process, then write either human-readable
//! lines or pretty JSON to the supplied writer.

use std::io::Write;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use memory_indexing::{
    index_documents, DirectorySource, IndexUpdater, NoOpProgressCallback, RebuildConfig,
};
use memory_search::{Bm25Index, HybridSearchIndex};
use memory_types::{HybridConfig, ScoredDocument, Settings, SourceDocument, TextSource};
use memory_vector::{merge_chunks, ChunkedVectorIndex, TextChunk, TextChunker, TfIdfIndex};

use crate::cli::{ChunkArgs, SearchArgs, SearchMode, StatsArgs};

/// Load settings and apply CLI overrides.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Index the directory with the selected mode and print ranked hits.
pub fn handle_search(settings: &Settings, args: &SearchArgs, out: &mut impl Write) -> Result<()> {
    let documents = load_directory(&args.dir, &args.extensions)?;
    let limit = args.limit.unwrap_or(settings.vector.default_limit);
    let min_score = args.min_score.unwrap_or(settings.vector.min_score);

    info!(
        mode = ?args.mode,
        documents = documents.len(),
        limit,
        "Running search"
    );

    match args.mode {
        SearchMode::Tfidf => {
            let index = build(TfIdfIndex::new(settings.vector)?, &documents);
            let hits = index.search(&args.query, limit, min_score);
            print_scored(out, &hits, args.json)
        }
        SearchMode::Bm25 => {
            let index = build(Bm25Index::new(settings.bm25)?, &documents);
            let mut hits = index.search(&args.query, limit);
            if let Some(threshold) = args.min_score {
                hits.retain(|hit| hit.score >= threshold);
            }
            print_scored(out, &hits, args.json)
        }
        SearchMode::Hybrid | SearchMode::Rrf => {
            let mut config = HybridConfig {
                use_rrf: args.mode == SearchMode::Rrf,
                ..settings.hybrid
            };
            if let Some(threshold) = args.min_score {
                config.min_score = threshold;
            }
            let index = build(HybridSearchIndex::new(config, settings.bm25)?, &documents);
            let hits = index.search(&args.query, None, limit);
            if args.json {
                return print_json(out, &hits);
            }
            for (rank, hit) in hits.iter().enumerate() {
                writeln!(
                    out,
                    "{:>3}. {:.4}  {}  (bm25 {:.4}, vector {:.4})",
                    rank + 1,
                    hit.score,
                    hit.id,
                    hit.bm25_score,
                    hit.vector_score
                )?;
            }
            print_empty(out, hits.is_empty())
        }
        SearchMode::Chunks => {
            let index = build(
                ChunkedVectorIndex::new(settings.chunking.clone(), settings.vector)?,
                &documents,
            );
            let hits = index.search_chunks(&args.query, limit, min_score);
            if args.json {
                return print_json(out, &hits);
            }
            for (rank, hit) in hits.iter().enumerate() {
                writeln!(
                    out,
                    "{:>3}. {:.4}  {}  [{}..{}]  {}",
                    rank + 1,
                    hit.score,
                    hit.chunk_id,
                    hit.char_range.start,
                    hit.char_range.end,
                    snippet(&hit.content)
                )?;
            }
            print_empty(out, hits.is_empty())
        }
        SearchMode::Documents => {
            let index = build(
                ChunkedVectorIndex::new(settings.chunking.clone(), settings.vector)?,
                &documents,
            );
            let hits = index.search_documents(&args.query, limit, min_score);
            if args.json {
                return print_json(out, &hits);
            }
            for (rank, hit) in hits.iter().enumerate() {
                writeln!(
                    out,
                    "{:>3}. {:.4}  {}  ({} matching chunks, avg {:.4})",
                    rank + 1,
                    hit.score,
                    hit.id,
                    hit.matching_chunks.len(),
                    hit.avg_score
                )?;
                writeln!(out, "       {}", snippet(&hit.best_chunk.content))?;
            }
            print_empty(out, hits.is_empty())
        }
    }
}

#[derive(Debug, Serialize)]
struct ChunkReport<'a> {
    chunks: &'a [TextChunk],
    round_trip: bool,
}

/// Chunk one file and verify the chunks reassemble to the original text.
pub fn handle_chunk(settings: &Settings, args: &ChunkArgs, out: &mut impl Write) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut config = settings.chunking.clone();
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(overlap) = args.overlap {
        config.overlap = overlap;
    }
    if config.min_chunk_size > config.chunk_size {
        config.min_chunk_size = config.chunk_size;
    }
    let chunker = TextChunker::new(config)?;

    let source_id = args.file.display().to_string();
    let chunks = chunker.chunk(&text, &source_id);
    let round_trip = merge_chunks(&chunks) == text;
    debug!(chunks = chunks.len(), round_trip, "Chunked file");

    if args.json {
        print_json(
            out,
            &ChunkReport {
                chunks: &chunks,
                round_trip,
            },
        )?;
    } else {
        for chunk in &chunks {
            writeln!(
                out,
                "{}  [{}..{}]  ~{} tokens",
                chunk.id, chunk.start_char, chunk.end_char, chunk.token_count
            )?;
        }
        writeln!(
            out,
            "{} chunks, round trip {}",
            chunks.len(),
            if round_trip { "ok" } else { "FAILED" }
        )?;
    }

    if !round_trip {
        bail!("Chunks of {} did not reassemble to the original text", source_id);
    }
    Ok(())
}

/// Index statistics for a directory.
#[derive(Debug, Serialize, PartialEq)]
pub struct IndexStats {
    pub documents: usize,
    pub tfidf_terms: usize,
    pub bm25_terms: usize,
    pub bm25_avg_length: f32,
    pub chunks: usize,
}

/// Build every index over a directory and report sizes.
pub fn handle_stats(settings: &Settings, args: &StatsArgs, out: &mut impl Write) -> Result<()> {
    let documents = load_directory(&args.dir, &args.extensions)?;
    let stats = compute_stats(settings, &documents)?;

    if args.json {
        return print_json(out, &stats);
    }
    writeln!(out, "Documents:        {}", stats.documents)?;
    writeln!(out, "TF-IDF terms:     {}", stats.tfidf_terms)?;
    writeln!(out, "BM25 terms:       {}", stats.bm25_terms)?;
    writeln!(out, "BM25 avg length:  {:.1}", stats.bm25_avg_length)?;
    writeln!(out, "Chunks:           {}", stats.chunks)?;
    Ok(())
}

pub fn compute_stats(settings: &Settings, documents: &[SourceDocument]) -> Result<IndexStats> {
    let tfidf = build(TfIdfIndex::new(settings.vector)?, documents);
    let bm25 = build(Bm25Index::new(settings.bm25)?, documents);
    let chunked = build(
        ChunkedVectorIndex::new(settings.chunking.clone(), settings.vector)?,
        documents,
    );

    Ok(IndexStats {
        documents: tfidf.len(),
        tfidf_terms: tfidf.term_count(),
        bm25_terms: bm25.term_count(),
        bm25_avg_length: bm25.average_document_length(),
        chunks: chunked.chunk_count(),
    })
}

fn load_directory(dir: &std::path::Path, extensions: &[String]) -> Result<Vec<SourceDocument>> {
    let source = DirectorySource::new(dir).with_extensions(extensions.iter().cloned());
    source
        .load()
        .with_context(|| format!("Failed to load documents from {}", dir.display()))
}

fn build<U: IndexUpdater>(mut index: U, documents: &[SourceDocument]) -> U {
    index_documents(
        &mut index,
        documents,
        &RebuildConfig::default(),
        &NoOpProgressCallback,
    );
    index
}

fn print_scored(out: &mut impl Write, hits: &[ScoredDocument], json: bool) -> Result<()> {
    if json {
        return print_json(out, hits);
    }
    for (rank, hit) in hits.iter().enumerate() {
        writeln!(out, "{:>3}. {:.4}  {}", rank + 1, hit.score, hit.id)?;
    }
    print_empty(out, hits.is_empty())
}

fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn print_empty(out: &mut impl Write, empty: bool) -> Result<()> {
    if empty {
        writeln!(out, "No results")?;
    }
    Ok(())
}

/// First line of a chunk, shortened for display.
fn snippet(content: &str) -> String {
    const MAX_CHARS: usize = 80;
    let line = content.trim().lines().next().unwrap_or_default();
    if line.chars().count() > MAX_CHARS {
        let cut: String = line.chars().take(MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
