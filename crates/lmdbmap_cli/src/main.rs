//! lmdbmap CLI
//!
//! Command-line tools for inspecting lmdbmap environments.
//!
//! # Commands
//!
//! - `tables` - List named tables with their kind and size
//! - `stat` - Display B-tree statistics for the environment or one table
//! - `dump` - Hex-dump the raw entries of a table
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use commands::CliError;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// lmdbmap command-line environment tools.
#[derive(Parser)]
#[command(name = "lmdbmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the environment directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List named tables
    Tables {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Display B-tree statistics
    Stat {
        /// Show statistics for this table instead of the environment
        #[arg(short, long)]
        table: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Dump raw table entries as hex
    Dump {
        /// Table to dump
        #[arg(short, long)]
        table: String,

        /// Maximum number of entries to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Tables { format } => {
            let path = cli.path.ok_or(CliError::MissingPath("tables"))?;
            commands::tables::run(&path, &format)?;
        }
        Commands::Stat { table, format } => {
            let path = cli.path.ok_or(CliError::MissingPath("stat"))?;
            commands::stat::run(&path, table.as_deref(), &format)?;
        }
        Commands::Dump {
            table,
            limit,
            format,
        } => {
            let path = cli.path.ok_or(CliError::MissingPath("dump"))?;
            debug!(table = %table, ?limit, "dumping table");
            commands::dump::run(&path, &table, limit, &format)?;
        }
        Commands::Version => {
            println!("lmdbmap CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("lmdbmap core v{}", lmdbmap_core::VERSION);
        }
    }

    Ok(())
}
