//! Shared tokenizer for the TF-IDF and BM25 indices.
//!
//! Both indices must see bit-identical term streams so hybrid fusion compares
//! like-for-like term spaces; there is exactly one implementation, here.
//!
//! Text is lowercased and whitespace-collapsed, then split into alternating
//! runs of CJK ideographs and everything else:
//! - CJK runs emit every character as a unigram plus every adjacent pair as a bigram
//! - other runs emit alphanumeric words (single characters only when numeric)
//!   plus adjacent-word bigrams joined by [`BIGRAM_SEPARATOR`]

use std::collections::HashMap;

/// Joins the two halves of a word bigram.
///
/// A control character never survives word extraction, so a bigram can not
/// collide with a real word.
pub const BIGRAM_SEPARATOR: char = '\u{1f}';

/// Check whether a character is a CJK ideograph.
///
/// Covers the unified ideographs block, extension A and the compatibility block.
pub fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}'
    )
}

/// Lowercase, collapse whitespace runs to single spaces and trim.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Tokenize text into an ordered term sequence.
///
/// Duplicates are kept; downstream scoring depends on term frequency.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let mut terms = Vec::new();

    let mut run_start = 0;
    let mut run_is_cjk = false;
    for (pos, c) in normalized.char_indices() {
        let cjk = is_cjk(c);
        if pos > run_start && cjk != run_is_cjk {
            push_run(&normalized[run_start..pos], run_is_cjk, &mut terms);
            run_start = pos;
        }
        run_is_cjk = cjk;
    }
    if run_start < normalized.len() {
        push_run(&normalized[run_start..], run_is_cjk, &mut terms);
    }

    terms
}

/// Count occurrences of each term.
pub fn term_counts(terms: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::with_capacity(terms.len());
    for term in terms {
        *counts.entry(term.clone()).or_insert(0) += 1;
    }
    counts
}

/// Whether a term is a word bigram produced by [`tokenize`].
pub fn is_word_bigram(term: &str) -> bool {
    term.contains(BIGRAM_SEPARATOR)
}

fn push_run(run: &str, cjk: bool, terms: &mut Vec<String>) {
    if cjk {
        push_cjk_terms(run, terms);
    } else {
        push_word_terms(run, terms);
    }
}

fn push_cjk_terms(run: &str, terms: &mut Vec<String>) {
    let chars: Vec<char> = run.chars().collect();
    terms.extend(chars.iter().map(|c| c.to_string()));
    terms.extend(chars.windows(2).map(|pair| pair.iter().collect::<String>()));
}

fn push_word_terms(run: &str, terms: &mut Vec<String>) {
    let words: Vec<&str> = run
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .filter(|w| w.chars().nth(1).is_some() || w.chars().all(char::is_numeric))
        .collect();

    terms.extend(words.iter().map(|w| (*w).to_string()));
    terms.extend(
        words
            .windows(2)
            .map(|pair| format!("{}{BIGRAM_SEPARATOR}{}", pair[0], pair[1])),
    );
}
