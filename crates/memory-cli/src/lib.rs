//! Retrieval CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (search, chunk, stats)

pub mod cli;
pub mod commands;

pub use cli::{ChunkArgs, Cli, Commands, SearchArgs, SearchMode, StatsArgs};
pub use commands::{
    compute_stats, handle_chunk, handle_search, handle_stats, init_logging, load_settings,
    IndexStats,
};
