//! Packed k-mer values and their ordering.
//!
//! K-mers are held as 2-bit-per-base unsigned integers (A=0, C=1, G=2,
//! T=3). For a fixed k, the integer order of the packed form equals the
//! lexicographic order of the base string, so a table sorted by
//! [`PackedKmer`] is sorted by k-mer text as well. This is the total order
//! the merge joins on.

use crate::error::{InvalidBaseError, KmerLengthError};

/// A validated k-mer length in the range 1-32.
///
/// The upper bound comes from packing: 32 bases at 2 bits each fill a
/// `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerLength(u8);

impl KmerLength {
    /// Minimum valid k-mer length.
    pub const MIN: u8 = 1;
    /// Maximum valid k-mer length.
    pub const MAX: u8 = 32;

    /// Validates and wraps a k-mer length.
    pub fn new(k: usize) -> Result<Self, KmerLengthError> {
        if (usize::from(Self::MIN)..=usize::from(Self::MAX)).contains(&k) {
            Ok(Self(k as u8))
        } else {
            Err(KmerLengthError {
                k,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    #[must_use]
    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

/// An immutable k-mer in packed 2-bit form.
///
/// Ordering and equality are those of the packed integer; two k-mers of
/// the same length compare equal exactly when their base strings do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedKmer(u64);

impl PackedKmer {
    #[must_use]
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[must_use]
    pub fn bits(self) -> u64 {
        self.0
    }
}

/// Packs a DNA byte string into its 2-bit form.
pub fn pack_from_bytes(seq: &[u8]) -> Result<PackedKmer, InvalidBaseError> {
    let mut bits = 0u64;
    for (position, &base) in seq.iter().enumerate() {
        bits <<= 2;
        let mask = match base {
            b'A' => 0,
            b'C' => 1,
            b'G' => 2,
            b'T' => 3,
            _ => return Err(InvalidBaseError { base, position }),
        };
        bits |= mask;
    }
    Ok(PackedKmer(bits))
}

/// Unpacks a k-mer back to its alphabet-character string.
#[must_use]
pub fn unpack_to_string(kmer: PackedKmer, k: KmerLength) -> String {
    let k = k.get();
    let mut out = String::with_capacity(k);
    for i in 0..k {
        let isolated = kmer.0 << ((i * 2) + 64 - k * 2);
        out.push(match isolated >> 62 {
            0 => 'A',
            1 => 'C',
            2 => 'G',
            _ => 'T',
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        let k = KmerLength::new(7).unwrap();
        let kmer = pack_from_bytes(b"GATTACA").unwrap();
        insta::assert_snapshot!(unpack_to_string(kmer, k), @"GATTACA");
    }

    #[test]
    fn packing_rejects_invalid_base() {
        let err = pack_from_bytes(b"ACNGT").unwrap_err();
        assert_eq!(
            err,
            InvalidBaseError {
                base: b'N',
                position: 2
            }
        );
    }

    #[test]
    fn packed_order_is_lexicographic() {
        let kmers = ["AAA", "AAC", "AAT", "ACA", "CAA", "GTT", "TTT"];
        let packed: Vec<PackedKmer> = kmers
            .iter()
            .map(|s| pack_from_bytes(s.as_bytes()).unwrap())
            .collect();

        let mut sorted = packed.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, packed, "packed order should match string order");
    }

    #[test]
    fn equality_is_exact() {
        let a = pack_from_bytes(b"ACGT").unwrap();
        let b = pack_from_bytes(b"ACGT").unwrap();
        let c = pack_from_bytes(b"ACGA").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn kmer_length_bounds() {
        assert!(KmerLength::new(0).is_err());
        assert!(KmerLength::new(33).is_err());
        assert_eq!(KmerLength::new(1).unwrap().get(), 1);
        assert_eq!(KmerLength::new(32).unwrap().get(), 32);
        assert_eq!(KmerLength::new(21).unwrap().as_u8(), 21);
    }

    #[test]
    fn unpack_pads_with_a() {
        // High bits beyond k are zero, which reads back as 'A'
        let k = KmerLength::new(4).unwrap();
        let kmer = pack_from_bytes(b"AACT").unwrap();
        assert_eq!(unpack_to_string(kmer, k), "AACT");
    }
}
