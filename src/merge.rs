//! The k-way merge over sorted k-mer streams.
//!
//! One output row per distinct k-mer across all inputs, with counts
//! index-aligned to the input order and rows strictly ascending by k-mer.
//! Selection of the next row's k-mer is a linear scan over the streams:
//! the sample count N stays small next to the number of distinct k-mers
//! in the target workload. A `BinaryHeap` tournament would bring
//! selection to O(log N) per row for large sample counts without changing
//! this module's contract.

use crate::cursor::KmerStream;
use crate::error::KmerMergeError;
use crate::kmer::{KmerLength, PackedKmer};

/// One merged row: a k-mer and one count per input stream, 0 where a
/// stream does not carry the k-mer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub kmer: PackedKmer,
    pub counts: Vec<u64>,
}

/// True when every stream reports the same k-mer length.
///
/// An empty collection is vacuously consistent.
pub fn all_same_k<S: KmerStream>(streams: &[S]) -> bool {
    let mut lengths = streams.iter().map(KmerStream::k_length);
    match lengths.next() {
        Some(first) => lengths.all(|k| k == first),
        None => true,
    }
}

/// A lazy merge-join over any number of sorted k-mer streams.
///
/// Iteration yields `Result` rows: a decode failure in any stream aborts
/// the merge at that row. Rows emitted before the failure are valid; the
/// table is simply truncated there.
pub struct Merger<S> {
    streams: Vec<S>,
}

impl<S: KmerStream> Merger<S> {
    /// Builds a merger after checking that all streams share one k.
    ///
    /// # Errors
    ///
    /// Fails with `SchemaMismatch` before any row is produced if the
    /// streams disagree on k-mer length.
    pub fn new(streams: Vec<S>) -> Result<Self, KmerMergeError> {
        if let Some(first) = streams.first() {
            let expected = first.k_length();
            if let Some(odd) = streams.iter().find(|s| s.k_length() != expected) {
                return Err(KmerMergeError::SchemaMismatch {
                    expected: expected.get(),
                    found: odd.k_length().get(),
                });
            }
        }
        Ok(Self { streams })
    }

    /// The k-mer length shared by all streams, if any stream exists.
    #[must_use]
    pub fn k_length(&self) -> Option<KmerLength> {
        self.streams.first().map(KmerStream::k_length)
    }

    /// The number of input streams (count columns per row).
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.streams.len()
    }

    /// The smallest current k-mer across live streams, or `None` when all
    /// streams are exhausted. Reading it moves no cursor, so repeated
    /// calls return the same key.
    fn smallest_key(&self) -> Option<PackedKmer> {
        self.streams
            .iter()
            .filter(|s| !s.is_exhausted())
            .map(|s| s.current().0)
            .min()
    }
}

impl<S> std::fmt::Debug for Merger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merger")
            .field("streams", &self.streams.len())
            .finish()
    }
}

impl<S: KmerStream> Iterator for Merger<S> {
    type Item = Result<OutputRow, KmerMergeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.smallest_key()?;

        let mut counts = Vec::with_capacity(self.streams.len());
        for stream in &mut self.streams {
            // Advance exactly the streams positioned on the row's k-mer;
            // exhausted and non-matching streams are left untouched.
            if stream.is_exhausted() || stream.current().0 != key {
                counts.push(0);
            } else {
                counts.push(stream.current().1);
                if let Err(e) = stream.advance() {
                    return Some(Err(e));
                }
            }
        }

        Some(Ok(OutputRow { kmer: key, counts }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::{pack_from_bytes, unpack_to_string};

    /// An in-memory sorted stream for exercising the merge without files.
    struct MemStream {
        k: KmerLength,
        records: Vec<(PackedKmer, u64)>,
        pos: usize,
    }

    impl MemStream {
        fn new(k: usize, records: &[(&str, u64)]) -> Self {
            Self {
                k: KmerLength::new(k).unwrap(),
                records: records
                    .iter()
                    .map(|&(kmer, count)| (pack_from_bytes(kmer.as_bytes()).unwrap(), count))
                    .collect(),
                pos: 0,
            }
        }
    }

    impl KmerStream for MemStream {
        fn k_length(&self) -> KmerLength {
            self.k
        }

        fn is_exhausted(&self) -> bool {
            self.pos >= self.records.len()
        }

        fn current(&self) -> (PackedKmer, u64) {
            self.records[self.pos]
        }

        fn advance(&mut self) -> Result<(), KmerMergeError> {
            assert!(!self.is_exhausted());
            self.pos += 1;
            Ok(())
        }
    }

    fn merged_rows(merger: Merger<MemStream>) -> Vec<(String, Vec<u64>)> {
        let k = merger.k_length().unwrap();
        merger
            .map(|row| {
                let row = row.unwrap();
                (unpack_to_string(row.kmer, k), row.counts)
            })
            .collect()
    }

    #[test]
    fn merges_two_overlapping_samples() {
        let merger = Merger::new(vec![
            MemStream::new(3, &[("AAA", 2), ("AAC", 1)]),
            MemStream::new(3, &[("AAC", 3), ("AAT", 1)]),
        ])
        .unwrap();

        assert_eq!(
            merged_rows(merger),
            vec![
                ("AAA".to_string(), vec![2, 0]),
                ("AAC".to_string(), vec![1, 3]),
                ("AAT".to_string(), vec![0, 1]),
            ]
        );
    }

    #[test]
    fn empty_sample_contributes_only_zeros() {
        let merger = Merger::new(vec![
            MemStream::new(3, &[]),
            MemStream::new(3, &[("ACG", 4), ("TTT", 6)]),
        ])
        .unwrap();

        assert_eq!(
            merged_rows(merger),
            vec![
                ("ACG".to_string(), vec![0, 4]),
                ("TTT".to_string(), vec![0, 6]),
            ]
        );
    }

    #[test]
    fn all_samples_empty_yield_no_rows() {
        let merger =
            Merger::new(vec![MemStream::new(3, &[]), MemStream::new(3, &[])]).unwrap();
        assert_eq!(merged_rows(merger), vec![]);
    }

    #[test]
    fn no_samples_yield_no_rows() {
        let merger = Merger::new(Vec::<MemStream>::new()).unwrap();
        assert_eq!(merger.count(), 0);
    }

    #[test]
    fn three_way_tie_collapses_into_one_row() {
        let merger = Merger::new(vec![
            MemStream::new(3, &[("CCC", 1)]),
            MemStream::new(3, &[("CCC", 2)]),
            MemStream::new(3, &[("CCC", 3)]),
        ])
        .unwrap();

        assert_eq!(
            merged_rows(merger),
            vec![("CCC".to_string(), vec![1, 2, 3])]
        );
    }

    #[test]
    fn schema_mismatch_rejected_before_any_row() {
        let err = Merger::new(vec![
            MemStream::new(21, &[]),
            MemStream::new(19, &[]),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            KmerMergeError::SchemaMismatch {
                expected: 21,
                found: 19
            }
        ));
    }

    #[test]
    fn all_same_k_checks() {
        assert!(all_same_k(&Vec::<MemStream>::new()));
        assert!(all_same_k(&[
            MemStream::new(5, &[]),
            MemStream::new(5, &[])
        ]));
        assert!(!all_same_k(&[
            MemStream::new(5, &[]),
            MemStream::new(7, &[])
        ]));
    }

    #[test]
    fn output_is_strictly_ascending() {
        let merger = Merger::new(vec![
            MemStream::new(3, &[("AAA", 1), ("ACA", 2), ("TTT", 3)]),
            MemStream::new(3, &[("AAC", 5), ("ACA", 1), ("GGG", 2)]),
            MemStream::new(3, &[("AAA", 9), ("GGG", 4), ("GTT", 8)]),
        ])
        .unwrap();

        let rows = merged_rows(merger);
        for pair in rows.windows(2) {
            assert!(pair[0].0 < pair[1].0, "rows out of order: {pair:?}");
        }
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn selection_is_idempotent() {
        let merger = Merger::new(vec![
            MemStream::new(3, &[("ACA", 2)]),
            MemStream::new(3, &[("AAC", 5)]),
        ])
        .unwrap();

        let first = merger.smallest_key();
        let second = merger.smallest_key();
        assert_eq!(first, second);
        assert_eq!(first, Some(pack_from_bytes(b"AAC").unwrap()));
    }

    #[test]
    fn non_matching_streams_are_left_untouched() {
        let mut merger = Merger::new(vec![
            MemStream::new(3, &[("AAA", 1)]),
            MemStream::new(3, &[("TTT", 2)]),
        ])
        .unwrap();

        let row = merger.next().unwrap().unwrap();
        assert_eq!(row.counts, vec![1, 0]);
        // Only the matching stream moved
        assert_eq!(merger.streams[0].pos, 1);
        assert_eq!(merger.streams[1].pos, 0);
    }

    #[test]
    fn completeness_every_input_pair_appears_once() {
        let inputs: Vec<Vec<(&str, u64)>> = vec![
            vec![("AAA", 1), ("ACA", 2), ("TTT", 3)],
            vec![("AAC", 5), ("ACA", 1)],
            vec![("AAA", 9), ("GTT", 8)],
        ];
        let merger = Merger::new(
            inputs
                .iter()
                .map(|records| MemStream::new(3, records))
                .collect(),
        )
        .unwrap();

        let rows = merged_rows(merger);
        for (sample, records) in inputs.iter().enumerate() {
            for &(kmer, count) in records {
                let matching: Vec<_> = rows.iter().filter(|(k, _)| k == kmer).collect();
                assert_eq!(matching.len(), 1, "k-mer {kmer} should appear exactly once");
                assert_eq!(matching[0].1[sample], count);
            }
        }
        // Zero entries are exactly the absent pairs
        for (kmer, counts) in &rows {
            for (sample, &count) in counts.iter().enumerate() {
                let present = inputs[sample].iter().any(|&(k, _)| k == kmer);
                assert_eq!(count > 0, present, "sample {sample}, k-mer {kmer}");
            }
        }
    }
}
