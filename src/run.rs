//! Merge orchestration and table output.
//!
//! Reads the database list, opens one cursor per sample in list order,
//! merges, and writes the table to a text sink row by row.

use std::fs;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::cursor::{KmerStream, StoreCursor};
use crate::error::KmerMergeError;
use crate::kmer::unpack_to_string;
use crate::merge::Merger;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// A merged row as serialized in JSON output.
#[derive(Serialize)]
struct MergedRow {
    kmer: String,
    counts: Vec<u64>,
}

/// Reads the database list file: one path per line, blank lines skipped.
///
/// # Errors
///
/// Returns `ListRead` if the file cannot be read.
pub fn read_list<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>, KmerMergeError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| KmerMergeError::ListRead {
        source: e,
        path: path.to_path_buf(),
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Merges the databases named in the list file and writes the table to
/// stdout.
///
/// # Errors
///
/// Returns the first fatal error: an unreadable list file, an
/// unreadable/unsorted/malformed database, a k-mer length mismatch, a
/// mid-stream decode failure, or a write failure.
pub fn run<P: AsRef<Path>>(list_path: P, format: OutputFormat) -> Result<(), KmerMergeError> {
    let paths = read_list(list_path)?;

    #[cfg(feature = "tracing")]
    info!(databases = paths.len(), "opening sorted k-mer databases");

    let mut cursors = Vec::with_capacity(paths.len());
    for path in &paths {
        let cursor = StoreCursor::open(path)?;

        #[cfg(feature = "tracing")]
        debug!(
            path = ?path,
            k = cursor.k_length().get(),
            records = cursor.total_records(),
            "opened database"
        );

        cursors.push(cursor);
    }

    let merger = Merger::new(cursors)?;
    let out = stdout();
    write_rows(merger, out.lock(), format)
}

/// Writes merged rows to `out` in the requested format.
///
/// TSV streams row by row; JSON buffers the whole table before
/// serializing, so it is unsuitable for very large merges.
pub fn write_rows<S, W>(
    merger: Merger<S>,
    out: W,
    format: OutputFormat,
) -> Result<(), KmerMergeError>
where
    S: KmerStream,
    W: Write,
{
    let mut buf = BufWriter::new(out);
    let k = merger.k_length();

    match format {
        OutputFormat::Tsv => {
            let Some(k) = k else { return Ok(()) };
            for row in merger {
                let row = row?;
                write!(buf, "{}", unpack_to_string(row.kmer, k))?;
                for count in &row.counts {
                    write!(buf, "\t{count}")?;
                }
                writeln!(buf)?;
            }
        }
        OutputFormat::Json => {
            let rows = match k {
                Some(k) => merger
                    .map(|row| {
                        row.map(|row| MergedRow {
                            kmer: unpack_to_string(row.kmer, k),
                            counts: row.counts,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            serde_json::to_writer_pretty(&mut buf, &rows)?;
            writeln!(buf)?;
        }
    }

    buf.flush()?;
    Ok(())
}
