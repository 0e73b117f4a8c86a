//! Configuration loading for the retrieval engine.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/agent-memory/retrieval.toml.
//!
//! Every component config is set once at construction and may be swapped
//! later through the owning index's `set_config`; already-indexed documents
//! are re-scored with the new parameters on the next search.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::MemoryError;

/// Configuration for the boundary-aware text chunker.
///
/// Sizes are expressed in estimated tokens and converted to characters
/// through `chars_per_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in tokens.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in tokens.
    #[serde(default = "default_chunk_overlap")]
    pub overlap: usize,

    /// Approximate number of characters per token.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f32,

    /// Chunks estimated below this many tokens are folded into their predecessor.
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,
}

fn default_chunk_size() -> usize {
    400
}

fn default_chunk_overlap() -> usize {
    80
}

fn default_chars_per_token() -> f32 {
    4.0
}

fn default_min_chunk_size() -> usize {
    50
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_chunk_overlap(),
            chars_per_token: default_chars_per_token(),
            min_chunk_size: default_min_chunk_size(),
        }
    }
}

impl ChunkingConfig {
    /// Create a config with the given size and overlap, other fields default.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            ..Default::default()
        }
    }

    pub fn with_chars_per_token(mut self, chars_per_token: f32) -> Self {
        self.chars_per_token = chars_per_token;
        self
    }

    pub fn with_min_chunk_size(mut self, min_chunk_size: usize) -> Self {
        self.min_chunk_size = min_chunk_size;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }
        if self.overlap >= self.chunk_size {
            return Err(format!(
                "overlap ({}) must be less than chunk_size ({})",
                self.overlap, self.chunk_size
            ));
        }
        if !self.chars_per_token.is_finite() || self.chars_per_token <= 0.0 {
            return Err(format!(
                "chars_per_token must be a positive number, got {}",
                self.chars_per_token
            ));
        }
        if self.min_chunk_size > self.chunk_size {
            return Err(format!(
                "min_chunk_size ({}) must not exceed chunk_size ({})",
                self.min_chunk_size, self.chunk_size
            ));
        }
        Ok(())
    }

    /// Estimated token count for a text of `char_count` characters.
    pub fn estimate_tokens(&self, char_count: usize) -> usize {
        (char_count as f32 / self.chars_per_token).ceil() as usize
    }

    /// Window length in characters.
    pub fn window_chars(&self) -> usize {
        self.tokens_to_chars(self.chunk_size).max(1)
    }

    /// Distance between consecutive window starts in characters.
    pub fn step_chars(&self) -> usize {
        self.tokens_to_chars(self.chunk_size.saturating_sub(self.overlap))
            .max(1)
    }

    /// Minimum viable chunk length in characters.
    pub fn min_chunk_chars(&self) -> usize {
        self.tokens_to_chars(self.min_chunk_size)
    }

    fn tokens_to_chars(&self, tokens: usize) -> usize {
        (tokens as f32 * self.chars_per_token).round() as usize
    }
}

/// Okapi BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term-frequency saturation.
    #[serde(default = "default_k1")]
    pub k1: f32,

    /// Document-length normalization (0 = none, 1 = full).
    #[serde(default = "default_b")]
    pub b: f32,
}

fn default_k1() -> f32 {
    1.2
}

fn default_b() -> f32 {
    0.75
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
        }
    }
}

impl Bm25Config {
    pub fn new(k1: f32, b: f32) -> Self {
        Self { k1, b }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(format!("k1 must be >= 0, got {}", self.k1));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(format!("b must be 0.0-1.0, got {}", self.b));
        }
        Ok(())
    }
}

/// Fusion settings for hybrid BM25 + embedding search.
///
/// `min_score` applies to the fused score. A weighted blend lands in
/// `[0, vector_weight + bm25_weight]` while reciprocal rank fusion tops out
/// at `2 / (rrf_k + 1)`, so the same threshold filters very differently in
/// the two modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridConfig {
    /// Weight of the normalized embedding score in blend mode.
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,

    /// Weight of the normalized BM25 score in blend mode.
    #[serde(default = "default_bm25_weight")]
    pub bm25_weight: f32,

    /// Use reciprocal rank fusion instead of the weighted blend.
    #[serde(default)]
    pub use_rrf: bool,

    /// RRF smoothing constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Minimum fused score for a result to be returned.
    #[serde(default = "default_hybrid_min_score")]
    pub min_score: f32,
}

fn default_vector_weight() -> f32 {
    0.7
}

fn default_bm25_weight() -> f32 {
    0.3
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_hybrid_min_score() -> f32 {
    0.01
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            vector_weight: default_vector_weight(),
            bm25_weight: default_bm25_weight(),
            use_rrf: false,
            rrf_k: default_rrf_k(),
            min_score: default_hybrid_min_score(),
        }
    }
}

impl HybridConfig {
    /// Weighted-blend config with the given weights.
    pub fn weighted(vector_weight: f32, bm25_weight: f32) -> Self {
        Self {
            vector_weight,
            bm25_weight,
            use_rrf: false,
            ..Default::default()
        }
    }

    /// Reciprocal rank fusion config with the given constant.
    pub fn rrf(rrf_k: f32) -> Self {
        Self {
            use_rrf: true,
            rrf_k,
            ..Default::default()
        }
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        for (name, weight) in [
            ("vector_weight", self.vector_weight),
            ("bm25_weight", self.bm25_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("{name} must be >= 0, got {weight}"));
            }
        }
        if !self.rrf_k.is_finite() || self.rrf_k <= 0.0 {
            return Err(format!("rrf_k must be > 0, got {}", self.rrf_k));
        }
        if !self.min_score.is_finite() {
            return Err("min_score must be finite".to_string());
        }
        Ok(())
    }
}

/// Inverse document frequency formula used by the TF-IDF index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdfFormula {
    /// `ln(N / (1 + df))`; zero or negative once a term is in N-1 or more documents.
    Classic,
    /// `ln((N + 1) / (df + 1)) + 1`; always positive.
    #[default]
    Smoothed,
}

impl IdfFormula {
    /// Compute idf for a term with document frequency `df` in a corpus of `n` documents.
    pub fn idf(self, n: usize, df: usize) -> f32 {
        let n = n as f32;
        let df = df as f32;
        match self {
            IdfFormula::Classic => (n / (1.0 + df)).ln(),
            IdfFormula::Smoothed => ((n + 1.0) / (df + 1.0)).ln() + 1.0,
        }
    }
}

/// Defaults for TF-IDF and chunk search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorSearchConfig {
    /// IDF formula.
    ///
    /// Defaults to [`IdfFormula::Smoothed`] rather than the classic
    /// `ln(N / (1 + df))`. Under the classic formula a term held by half of a
    /// two-document corpus gets idf 0, so a query for it finds nothing even
    /// though exactly one document contains it. Set `idf = "classic"` for the
    /// uncorrected weighting.
    #[serde(default)]
    pub idf: IdfFormula,

    /// Result limit when the caller does not supply one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Minimum cosine similarity when the caller does not supply one.
    #[serde(default = "default_vector_min_score")]
    pub min_score: f32,
}

fn default_limit() -> usize {
    10
}

fn default_vector_min_score() -> f32 {
    0.05
}

impl Default for VectorSearchConfig {
    fn default() -> Self {
        Self {
            idf: IdfFormula::default(),
            default_limit: default_limit(),
            min_score: default_vector_min_score(),
        }
    }
}

impl VectorSearchConfig {
    pub fn with_idf(mut self, idf: IdfFormula) -> Self {
        self.idf = idf;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_limit == 0 {
            return Err("default_limit must be > 0".to_string());
        }
        if !self.min_score.is_finite() {
            return Err("min_score must be finite".to_string());
        }
        Ok(())
    }
}

/// Main retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Chunker configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// BM25 parameters
    #[serde(default)]
    pub bm25: Bm25Config,

    /// Hybrid fusion settings
    #[serde(default)]
    pub hybrid: HybridConfig,

    /// TF-IDF search defaults
    #[serde(default)]
    pub vector: VectorSearchConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            chunking: ChunkingConfig::default(),
            bm25: Bm25Config::default(),
            hybrid: HybridConfig::default(),
            vector: VectorSearchConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/agent-memory/retrieval.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (MEMORY_*, nested keys split on `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, MemoryError> {
        let default_config_path = default_config_dir().join("retrieval");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // MEMORY_LOG_LEVEL, MEMORY_CHUNKING__CHUNK_SIZE, MEMORY_HYBRID__USE_RRF, ...
        builder = builder.add_source(
            Environment::with_prefix("MEMORY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MemoryError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate every component config.
    pub fn validate(&self) -> Result<(), MemoryError> {
        self.chunking
            .validate()
            .map_err(|e| MemoryError::Config(format!("chunking: {e}")))?;
        self.bm25
            .validate()
            .map_err(|e| MemoryError::Config(format!("bm25: {e}")))?;
        self.hybrid
            .validate()
            .map_err(|e| MemoryError::Config(format!("hybrid: {e}")))?;
        self.vector
            .validate()
            .map_err(|e| MemoryError::Config(format!("vector: {e}")))?;
        Ok(())
    }
}

fn default_config_dir() -> PathBuf {
    ProjectDirs::from("", "", "agent-memory")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
