//! Index rebuild from a text source.
//!
//! A rebuild loads every document, indexes it into a fresh instance without
//! holding any lock, then swaps the fresh instance into the [`SharedIndex`].
//! Concurrent searches keep using the previous index until the swap.

use std::time::Instant;

use tracing::{debug, info};

use memory_types::{SourceDocument, TextSource};

use crate::error::IndexingError;
use crate::shared::SharedIndex;
use crate::updater::{IndexType, IndexUpdater};

/// Configuration for index rebuild operations.
#[derive(Debug, Clone)]
pub struct RebuildConfig {
    /// Number of documents to process before reporting progress.
    pub batch_size: usize,
    /// Whether to skip documents whose text is blank.
    pub skip_empty: bool,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            skip_empty: false,
        }
    }
}

impl RebuildConfig {
    /// Set the batch size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set whether to skip blank documents.
    pub fn with_skip_empty(mut self, skip_empty: bool) -> Self {
        self.skip_empty = skip_empty;
        self
    }
}

/// Progress tracking for rebuild operations.
#[derive(Debug, Clone, Default)]
pub struct RebuildProgress {
    /// Total documents processed.
    pub total_processed: u64,
    /// Number of documents indexed.
    pub documents_indexed: u64,
    /// Number of documents skipped (blank text).
    pub skipped: u64,
    /// Whether the rebuild completed successfully.
    pub completed: bool,
}

impl RebuildProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_indexed(&mut self) {
        self.documents_indexed += 1;
        self.total_processed += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
        self.total_processed += 1;
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }
}

/// Result of a rebuild operation.
#[derive(Debug)]
pub struct RebuildResult {
    /// Which index was rebuilt.
    pub index_type: IndexType,
    /// Progress statistics.
    pub progress: RebuildProgress,
    /// Time taken in milliseconds.
    pub elapsed_ms: u64,
    /// Generation of the shared index after the swap.
    pub generation: u64,
}

/// Trait for receiving rebuild progress updates.
pub trait ProgressCallback: Send {
    /// Called after each batch of documents is processed.
    fn on_progress(&self, progress: &RebuildProgress);
}

/// A no-op progress callback for when progress reporting isn't needed.
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_progress(&self, _progress: &RebuildProgress) {}
}

/// A callback that logs progress at info level.
pub struct LoggingProgressCallback {
    batch_size: usize,
}

impl LoggingProgressCallback {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }
}

impl ProgressCallback for LoggingProgressCallback {
    fn on_progress(&self, progress: &RebuildProgress) {
        if progress.completed
            || progress
                .total_processed
                .is_multiple_of(self.batch_size as u64)
        {
            info!(
                total = progress.total_processed,
                indexed = progress.documents_indexed,
                skipped = progress.skipped,
                "Rebuild progress"
            );
        }
    }
}

/// Index `documents` into `index`, reporting progress every batch.
pub fn index_documents<U, P>(
    index: &mut U,
    documents: &[SourceDocument],
    config: &RebuildConfig,
    progress_callback: &P,
) -> RebuildProgress
where
    U: IndexUpdater + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let batch_size = config.batch_size.max(1) as u64;
    let mut progress = RebuildProgress::new();

    for doc in documents {
        if config.skip_empty && doc.is_blank() {
            debug!(id = %doc.id, "Skipping blank document");
            progress.record_skip();
        } else {
            index.index_document(doc);
            progress.record_indexed();
        }

        if progress.total_processed.is_multiple_of(batch_size) {
            progress_callback.on_progress(&progress);
        }
    }

    progress
}

/// Load everything from `source` into a fresh index.
pub fn build_index<U, S, P>(
    mut fresh: U,
    source: &S,
    config: &RebuildConfig,
    progress_callback: &P,
) -> Result<(U, RebuildProgress), IndexingError>
where
    U: IndexUpdater,
    S: TextSource + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let documents = source.load()?;
    info!(
        source = source.name(),
        index = %fresh.index_type(),
        count = documents.len(),
        "Loaded documents to index"
    );

    fresh.clear();
    let mut progress = index_documents(&mut fresh, &documents, config, progress_callback);
    progress.mark_completed();
    progress_callback.on_progress(&progress);
    Ok((fresh, progress))
}

/// Rebuild `target` from `source`, swapping in the result atomically.
///
/// `fresh` is normally an empty index configured like the current one. If
/// loading fails, `target` is left untouched.
pub fn rebuild_index<U, S, P>(
    target: &SharedIndex<U>,
    fresh: U,
    source: &S,
    config: &RebuildConfig,
    progress_callback: &P,
) -> Result<RebuildResult, IndexingError>
where
    U: IndexUpdater,
    S: TextSource + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let started = Instant::now();
    let index_type = fresh.index_type();
    info!(source = source.name(), index = %index_type, "Starting index rebuild");

    let (built, progress) = build_index(fresh, source, config, progress_callback)?;
    target.replace(built);
    let generation = target.generation();

    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        index = %index_type,
        indexed = progress.documents_indexed,
        skipped = progress.skipped,
        generation,
        elapsed_ms,
        "Index rebuild complete"
    );

    Ok(RebuildResult {
        index_type,
        progress,
        elapsed_ms,
        generation,
    })
}
