//! Command-line interface definition.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Merges sorted per-sample k-mer count databases into one table.
#[derive(Parser, Debug)]
#[command(name = "kmermerge")]
#[command(version, author, about, long_about = None)]
pub struct Args {
    /// Path to a text file listing one sorted k-mer database per line
    pub list: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "tsv")]
    pub format: OutputFormat,

    /// Suppress informational output (only write the merged table)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the merged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Tab-separated values (k-mer, then one count per sample)
    #[default]
    Tsv,
    /// JSON array of rows (buffers the whole table)
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tsv => write!(f, "tsv"),
            Self::Json => write!(f, "json"),
        }
    }
}
