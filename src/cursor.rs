//! Pull-based cursors over sorted k-mer databases.
//!
//! A cursor holds exactly one not-yet-consumed record (lookahead of 1), so
//! a merge over any number of databases keeps one record per database in
//! memory regardless of database size.

use std::path::Path;

use crate::error::KmerMergeError;
use crate::kmer::{KmerLength, PackedKmer};
use crate::store::StoreReader;

/// A sorted source of (k-mer, count) records with a lookahead of one.
///
/// The merge engine drives its inputs through this trait only; anything
/// that yields ascending, per-source-unique k-mers can take part in a
/// merge.
pub trait KmerStream {
    /// The fixed k-mer length of every record in this stream.
    fn k_length(&self) -> KmerLength;

    /// True once every record has been consumed. Terminal: an exhausted
    /// stream never becomes live again.
    fn is_exhausted(&self) -> bool;

    /// The lowest not-yet-consumed record, without advancing.
    ///
    /// # Panics
    ///
    /// Panics if the stream is exhausted; callers must check
    /// [`is_exhausted`](KmerStream::is_exhausted) first.
    fn current(&self) -> (PackedKmer, u64);

    /// Moves to the next record in ascending order, or to exhausted when
    /// none remain.
    ///
    /// # Panics
    ///
    /// Panics if the stream is already exhausted.
    fn advance(&mut self) -> Result<(), KmerMergeError>;
}

/// A [`KmerStream`] over one on-disk database.
///
/// Opening primes the cursor to the first record (or directly to
/// exhausted for an empty database), so `current()` is valid right after
/// a successful `open`.
#[derive(Debug)]
pub struct StoreCursor {
    reader: StoreReader,
    unread: u64,
    current: Option<(PackedKmer, u64)>,
}

impl StoreCursor {
    /// Opens a database and positions the cursor on its first record.
    ///
    /// # Errors
    ///
    /// Propagates open/validation failures from [`StoreReader::open`] and
    /// rejects a database whose sorted flag is clear with `Unsorted`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KmerMergeError> {
        Self::from_reader(StoreReader::open(path)?)
    }

    /// Wraps an already-open reader, rejecting unsorted databases and
    /// priming the cursor to the first record.
    pub fn from_reader(reader: StoreReader) -> Result<Self, KmerMergeError> {
        if !reader.is_sorted() {
            return Err(KmerMergeError::Unsorted {
                path: reader.path().to_path_buf(),
            });
        }
        let unread = reader.total_records();
        let mut cursor = Self {
            reader,
            unread,
            current: None,
        };
        cursor.load_next()?;
        Ok(cursor)
    }

    /// The number of records the database holds in total.
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.reader.total_records()
    }

    fn load_next(&mut self) -> Result<(), KmerMergeError> {
        self.current = if self.unread == 0 {
            None
        } else {
            self.unread -= 1;
            Some(self.reader.read_next()?)
        };
        Ok(())
    }
}

impl KmerStream for StoreCursor {
    fn k_length(&self) -> KmerLength {
        self.reader.k()
    }

    fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    fn current(&self) -> (PackedKmer, u64) {
        match self.current {
            Some(record) => record,
            None => panic!("current() called on an exhausted cursor"),
        }
    }

    fn advance(&mut self) -> Result<(), KmerMergeError> {
        assert!(
            !self.is_exhausted(),
            "advance() called on an exhausted cursor"
        );
        self.load_next()
    }
}
