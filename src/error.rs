//! Error types for kmermerge.
//!
//! Every failure in a merge run is fatal: nothing is retried or locally
//! recovered, and each variant maps to one human-readable message on the
//! diagnostic stream and process exit code 1.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in kmermerge operations.
#[derive(Debug, Error)]
pub enum KmerMergeError {
    /// Failed to read the database list file.
    #[error("failed to read database list '{path}': {source}")]
    ListRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to open or read a k-mer database file.
    #[error("failed to read k-mer database '{path}': {source}")]
    StoreRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to write a k-mer database file.
    #[error("failed to write k-mer database '{path}': {source}")]
    StoreWrite {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// A database file is present but malformed.
    #[error("invalid k-mer database '{path}': {details}")]
    InvalidStore { details: String, path: PathBuf },

    /// A database is valid but its records are not in sorted order.
    #[error(
        "k-mer database '{path}' is not sorted: re-sort it before merging"
    )]
    Unsorted { path: PathBuf },

    /// The databases in a merge run disagree on k-mer length.
    #[error("k-mer length mismatch across databases: expected k={expected}, found k={found}")]
    SchemaMismatch { expected: usize, found: usize },

    /// A record could not be decoded mid-stream; the database is corrupt
    /// or truncated.
    #[error("corrupt or truncated k-mer database '{path}': {details}")]
    Decode { details: String, path: PathBuf },

    /// Failed to write output.
    #[error("failed to write output: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize JSON output.
    #[error("failed to serialize JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },
}

impl From<std::io::Error> for KmerMergeError {
    fn from(source: std::io::Error) -> Self {
        KmerMergeError::Write { source }
    }
}

impl From<serde_json::Error> for KmerMergeError {
    fn from(source: serde_json::Error) -> Self {
        KmerMergeError::Json { source }
    }
}

/// Error for invalid k-mer length.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("k-mer length {k} is out of range: must be between {min} and {max}")]
pub struct KmerLengthError {
    /// The invalid k value that was provided.
    pub k: usize,
    /// Minimum valid k-mer length.
    pub min: u8,
    /// Maximum valid k-mer length.
    pub max: u8,
}

/// Error for invalid DNA base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBaseError {
    /// The invalid byte value.
    pub base: u8,
    /// Position of the invalid byte in the sequence.
    pub position: usize,
}

impl std::fmt::Display for InvalidBaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.base.is_ascii_graphic() || self.base == b' ' {
            write!(
                f,
                "invalid base '{}' (0x{:02x}) at position {}",
                self.base as char, self.base, self.position
            )
        } else {
            write!(
                f,
                "invalid base 0x{:02x} at position {}",
                self.base, self.position
            )
        }
    }
}

impl std::error::Error for InvalidBaseError {}
