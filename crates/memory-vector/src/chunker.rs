//! Overlapping text chunker.
//!
//! Splits long text into windows of roughly `chunk_size` tokens that overlap
//! by `overlap` tokens, estimating tokens from character count. Window ends
//! are pulled back to a natural break (paragraph, sentence, clause, word)
//! within the last [`BREAK_SEARCH_CHARS`] characters when one exists.
//!
//! Offsets are measured in characters, not bytes. Chunks are contiguous and
//! cover the whole input, so [`merge_chunks`] reconstructs it exactly.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use memory_types::ChunkingConfig;

use crate::error::VectorError;

/// How far back from a window end to look for a natural break.
pub const BREAK_SEARCH_CHARS: usize = 100;

/// One window of a source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// `{source_id}:chunk-{index}`
    pub id: String,
    pub source_id: String,
    /// Zero-based position within the source
    pub index: usize,
    pub content: String,
    /// Character offset of the first character
    pub start_char: usize,
    /// Character offset one past the last character
    pub end_char: usize,
    /// Estimated token count of `content`
    pub token_count: usize,
    /// Number of chunks the source was split into
    pub total_chunks: usize,
}

impl TextChunk {
    /// Build the id of chunk `index` of `source_id`.
    pub fn chunk_id(source_id: &str, index: usize) -> String {
        format!("{source_id}:chunk-{index}")
    }

    pub fn char_range(&self) -> Range<usize> {
        self.start_char..self.end_char
    }

    pub fn char_len(&self) -> usize {
        self.end_char - self.start_char
    }
}

/// Splits text into overlapping [`TextChunk`]s.
#[derive(Debug, Clone, Default)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self, VectorError> {
        config.validate().map_err(VectorError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ChunkingConfig) -> Result<(), VectorError> {
        config.validate().map_err(VectorError::InvalidConfig)?;
        self.config = config;
        Ok(())
    }

    /// Estimated token count of a string.
    pub fn estimate_tokens(&self, text: &str) -> usize {
        self.config.estimate_tokens(text.chars().count())
    }

    /// Split `text` into chunks tagged with `source_id`.
    ///
    /// Text that fits in one chunk (including the empty string) yields exactly
    /// one chunk covering all of it.
    pub fn chunk(&self, text: &str, source_id: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let spans = self.spans(&chars);
        let total_chunks = spans.len();

        let chunks: Vec<TextChunk> = spans
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| TextChunk {
                id: TextChunk::chunk_id(source_id, index),
                source_id: source_id.to_string(),
                index,
                content: chars[start..end].iter().collect(),
                start_char: start,
                end_char: end,
                token_count: self.config.estimate_tokens(end - start),
                total_chunks,
            })
            .collect();

        debug!(
            source_id = %source_id,
            chars = chars.len(),
            chunks = chunks.len(),
            "Chunked text"
        );
        chunks
    }

    /// Reassemble chunks produced by [`TextChunker::chunk`].
    pub fn merge_chunks<'a, I>(&self, chunks: I) -> String
    where
        I: IntoIterator<Item = &'a TextChunk>,
    {
        merge_chunks(chunks)
    }

    /// Character spans of each chunk.
    fn spans(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let n = chars.len();
        if self.config.estimate_tokens(n) <= self.config.chunk_size {
            return vec![(0, n)];
        }

        let window = self.config.window_chars();
        let step = self.config.step_chars();
        let min_tail = self.config.min_chunk_chars();

        let mut spans: Vec<(usize, usize)> = Vec::new();
        let mut start = 0;
        loop {
            let mut end = (start + window).min(n);
            if end < n {
                end = find_break(chars, start, end);
            }

            let tokens = self.config.estimate_tokens(end - start);
            if spans.is_empty() || tokens >= self.config.min_chunk_size {
                spans.push((start, end));
            } else if let Some(last) = spans.last_mut() {
                // Undersized fragment: fold into the previous chunk
                last.1 = last.1.max(end);
            }

            if end >= n {
                break;
            }

            // Never step past the end of the current chunk
            let next = (start + step).min(end);
            if n - next < min_tail {
                if let Some(last) = spans.last_mut() {
                    last.1 = n;
                }
                break;
            }
            start = next;
        }

        spans
    }
}

/// Pick a window end at the latest natural break in the last
/// [`BREAK_SEARCH_CHARS`] characters of `start..end`.
///
/// Preference: paragraph, sentence, clause, word. Falls back to `end`.
/// The result is always in `start + 1..=end`.
fn find_break(chars: &[char], start: usize, end: usize) -> usize {
    let floor = end.saturating_sub(BREAK_SEARCH_CHARS).max(start + 1);
    if floor >= end {
        return end;
    }

    // Paragraph
    for i in (floor..end - 1).rev() {
        if chars[i] == '\n' && chars[i + 1] == '\n' {
            return i + 2;
        }
    }

    // Sentence: terminal punctuation, whitespace, then an uppercase letter
    if end >= floor + 3 {
        for i in (floor..end - 2).rev() {
            if matches!(chars[i], '.' | '!' | '?')
                && chars[i + 1].is_whitespace()
                && chars[i + 2].is_uppercase()
            {
                return i + 2;
            }
        }
    }

    // Clause
    for i in (floor..end).rev() {
        if chars[i] == '\n' {
            return i + 1;
        }
        if i + 1 < end && matches!(chars[i], ';' | ':' | ',') && chars[i + 1] == ' ' {
            return i + 2;
        }
    }

    // Word
    for i in (floor..end).rev() {
        if chars[i] == ' ' {
            return i + 1;
        }
    }

    end
}

/// Reassemble the original text from chunks of one source.
///
/// Chunks are ordered by index; overlap with already-emitted text is skipped.
pub fn merge_chunks<'a, I>(chunks: I) -> String
where
    I: IntoIterator<Item = &'a TextChunk>,
{
    let mut sorted: Vec<&TextChunk> = chunks.into_iter().collect();
    sorted.sort_by_key(|chunk| chunk.index);

    let mut merged = String::new();
    let mut covered_end = 0;
    for (i, chunk) in sorted.into_iter().enumerate() {
        if i == 0 || chunk.start_char >= covered_end {
            merged.push_str(&chunk.content);
        } else {
            let overlap = covered_end - chunk.start_char;
            merged.extend(chunk.content.chars().skip(overlap));
        }
        covered_end = covered_end.max(chunk.end_char);
    }
    merged
}
