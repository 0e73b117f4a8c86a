//! CLI argument parsing for the retrieval tool.
//!
//! CLI flags override values loaded from the config file and environment.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Agent Memory retrieval
///
/// Build in-process indices over a directory of text files and query them.
#[derive(Parser, Debug)]
#[command(name = "memory-cli")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/agent-memory/retrieval.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a directory and run a query against it
    Search(SearchArgs),

    /// Split a file into chunks and verify they reassemble
    Chunk(ChunkArgs),

    /// Show index statistics for a directory
    Stats(StatsArgs),
}

/// Which index answers a search
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// TF-IDF cosine over whole documents
    Tfidf,
    /// BM25 keyword ranking
    Bm25,
    /// Weighted BM25 + embedding blend
    Hybrid,
    /// Reciprocal rank fusion of BM25 and embeddings
    Rrf,
    /// Chunk-level TF-IDF hits
    Chunks,
    /// Documents ranked by their best chunk
    Documents,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// Directory of documents to index
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Index to search
    #[arg(short, long, value_enum, default_value_t = SearchMode::Hybrid)]
    pub mode: SearchMode,

    /// Maximum results (default from config)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Minimum score (default from config)
    #[arg(long)]
    pub min_score: Option<f32>,

    /// File extensions to read
    #[arg(short, long, value_delimiter = ',', default_value = "md,txt")]
    pub extensions: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ChunkArgs {
    /// File to chunk
    pub file: PathBuf,

    /// Override chunk size in tokens
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Override chunk overlap in tokens
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Directory of documents to index
    #[arg(short, long)]
    pub dir: PathBuf,

    /// File extensions to read
    #[arg(short, long, value_delimiter = ',', default_value = "md,txt")]
    pub extensions: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_search_defaults() {
        let cli = Cli::parse_from(["memory-cli", "search", "rust", "--dir", "/notes"]);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "rust");
                assert_eq!(args.dir, PathBuf::from("/notes"));
                assert_eq!(args.mode, SearchMode::Hybrid);
                assert_eq!(args.limit, None);
                assert_eq!(args.extensions, vec!["md".to_string(), "txt".to_string()]);
                assert!(!args.json);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_with_options() {
        let cli = Cli::parse_from([
            "memory-cli", "search", "memory", "-d", "/notes", "--mode", "documents", "-n", "3",
            "--min-score", "0.2", "--json", "-e", "rs,toml",
        ]);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.mode, SearchMode::Documents);
                assert_eq!(args.limit, Some(3));
                assert_eq!(args.min_score, Some(0.2));
                assert!(args.json);
                assert_eq!(args.extensions, vec!["rs".to_string(), "toml".to_string()]);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_chunk() {
        let cli = Cli::parse_from([
            "memory-cli", "chunk", "notes.md", "--chunk-size", "200", "--overlap", "20",
        ]);
        match cli.command {
            Commands::Chunk(args) => {
                assert_eq!(args.file, PathBuf::from("notes.md"));
                assert_eq!(args.chunk_size, Some(200));
                assert_eq!(args.overlap, Some(20));
            }
            _ => panic!("Expected Chunk command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "memory-cli", "stats", "--dir", "/notes", "--config", "/tmp/r.toml", "-l", "debug",
        ]);
        assert_eq!(cli.config, Some("/tmp/r.toml".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Stats(_)));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let result =
            Cli::try_parse_from(["memory-cli", "search", "q", "--dir", ".", "--mode", "fuzzy"]);
        assert!(result.is_err());
    }
}
