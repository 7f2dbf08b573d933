//! Fuzz target for pack/unpack roundtrip.
//!
//! Tests that packing and unpacking is the identity operation
//! for valid DNA sequences.

#![no_main]

use kmermerge::kmer::{pack_from_bytes, unpack_to_string, KmerLength};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Filter to valid DNA sequences only
    if data.is_empty() || data.len() > 32 {
        return;
    }
    for &byte in data {
        if !matches!(byte, b'A' | b'C' | b'G' | b'T') {
            return;
        }
    }

    let k = match KmerLength::new(data.len()) {
        Ok(k) => k,
        Err(_) => return,
    };

    let packed = match pack_from_bytes(data) {
        Ok(packed) => packed,
        Err(_) => return,
    };

    let unpacked = unpack_to_string(packed, k);
    assert_eq!(
        unpacked.as_bytes(),
        data,
        "Pack/unpack roundtrip failed"
    );
});
