//! Agent Memory retrieval CLI
//!
//! Builds in-process TF-IDF, BM25, hybrid and chunked indices over a directory
//! of text files and queries them.
//!
//! # Usage
//!
//! ```bash
//! memory-cli search "borrow checker" --dir ./notes [--mode hybrid] [-n 10] [--json]
//! memory-cli chunk ./notes/long.md [--chunk-size 400] [--overlap 80]
//! memory-cli stats --dir ./notes
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/agent-memory/retrieval.toml)
//! 3. File passed with --config
//! 4. Environment variables (MEMORY_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use memory_cli::{
    handle_chunk, handle_search, handle_stats, init_logging, load_settings, Cli, Commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Search(args) => handle_search(&settings, &args, &mut out)?,
        Commands::Chunk(args) => handle_chunk(&settings, &args, &mut out)?,
        Commands::Stats(args) => handle_stats(&settings, &args, &mut out)?,
    }

    Ok(())
}
