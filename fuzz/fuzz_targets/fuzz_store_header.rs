//! Fuzz target for database header parsing.
//!
//! Opening arbitrary bytes as a database must return an error, never
//! panic.

#![no_main]

use kmermerge::store::StoreReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let reader = StoreReader::new(std::io::Cursor::new(data.to_vec()), "fuzz.kmcd");
    if let Ok(mut reader) = reader {
        // Decoding records off fuzzed input may fail, but must not panic
        while reader.read_next().is_ok() {}
    }
});
