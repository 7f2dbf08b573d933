//! Merge sorted per-sample k-mer count databases into a single table.
//!
//! Each input is a database of (k-mer, count) records pre-sorted by k-mer,
//! one per sample. The output is one row per distinct k-mer observed in any
//! sample, with one count column per sample (0 where the sample lacks the
//! k-mer), rows in ascending k-mer order. Merging is a streaming k-way
//! merge-join: only one record per database is held in memory at a time,
//! independent of database size.
//!
//! # Example
//!
//! ```rust,no_run
//! use kmermerge::cursor::StoreCursor;
//! use kmermerge::merge::Merger;
//!
//! let samples = vec![
//!     StoreCursor::open("sample1.kmcd")?,
//!     StoreCursor::open("sample2.kmcd")?,
//! ];
//!
//! for row in Merger::new(samples)? {
//!     let row = row?;
//!     println!("{:?}", row.counts);
//! }
//! # Ok::<(), kmermerge::error::KmerMergeError>(())
//! ```

pub mod cli;
pub mod cursor;
pub mod error;
pub mod kmer;
pub mod merge;
pub mod run;
pub mod store;
