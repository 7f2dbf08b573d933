//! Sorted k-mer count database files.
//!
//! This is the on-disk format produced per sample by the upstream counter
//! and consumed by the merge.
//!
//! # Binary Format (Version 1)
//!
//! ```text
//! +--------+--------+-------+------+--------+--------+------------------+
//! | MAGIC  | VERSION| FLAGS |  K   | COUNT  | CRC32  |       DATA       |
//! | 4 bytes| 1 byte |1 byte |1 byte| 8 bytes| 4 bytes| 16 bytes x COUNT |
//! +--------+--------+-------+------+--------+--------+------------------+
//!
//! MAGIC:   "KMCD" (0x4B 0x4D 0x43 0x44)
//! VERSION: Format version (currently 1)
//! FLAGS:   Bit 0 set when records are sorted ascending by packed k-mer
//! K:       K-mer length (1-32)
//! COUNT:   Number of records (little-endian u64)
//! CRC32:   CRC32 checksum of the 15 preceding header bytes (little-endian)
//! DATA:    Array of (packed_bits: u64, count: u64) records (little-endian)
//! ```
//!
//! The checksum covers only the header: records are decoded one at a time
//! with constant memory, and a short read mid-stream surfaces as a
//! [`Decode`](crate::error::KmerMergeError::Decode) error.
//!
//! # Compression
//!
//! Database files with a `.gz` extension are automatically
//! compressed/decompressed using gzip (requires the `gzip` feature).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::KmerMergeError;
use crate::kmer::{KmerLength, PackedKmer};

/// Magic bytes identifying a k-mer count database file.
const MAGIC: &[u8; 4] = b"KMCD";

/// Current format version.
const VERSION: u8 = 1;

/// Flag bit set when records are sorted ascending by packed k-mer.
const FLAG_SORTED: u8 = 0b0000_0001;

/// Header size: magic + version + flags + k + count + crc32.
const HEADER_LEN: usize = 19;

/// Bytes per record: packed k-mer + count.
const RECORD_LEN: usize = 16;

/// A sequential reader over one k-mer count database.
///
/// Opening validates the header; records are then decoded in file order
/// via [`read_next`](StoreReader::read_next), one at a time.
pub struct StoreReader {
    inner: Box<dyn Read>,
    path: PathBuf,
    k: KmerLength,
    total_records: u64,
    sorted: bool,
}

impl std::fmt::Debug for StoreReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreReader")
            .field("path", &self.path)
            .field("k", &self.k)
            .field("total_records", &self.total_records)
            .field("sorted", &self.sorted)
            .finish_non_exhaustive()
    }
}

impl StoreReader {
    /// Opens a database file, gzip-transparently for `.gz` paths.
    ///
    /// # Errors
    ///
    /// Returns `StoreRead` if the file cannot be opened or read, and
    /// `InvalidStore` if the header is malformed (bad magic, version,
    /// checksum, or k-mer length).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KmerMergeError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| KmerMergeError::StoreRead {
            source: e,
            path: path.to_path_buf(),
        })?;

        #[cfg(feature = "gzip")]
        if is_gzip_path(path) {
            let decoder = flate2::read::GzDecoder::new(file);
            return Self::new(BufReader::new(decoder), path);
        }

        Self::new(BufReader::new(file), path)
    }

    /// Reads a database from an arbitrary byte source.
    ///
    /// `path` is used only in error messages.
    pub fn new<R, P>(reader: R, path: P) -> Result<Self, KmerMergeError>
    where
        R: Read + 'static,
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let mut inner: Box<dyn Read> = Box::new(reader);

        let mut header = [0u8; HEADER_LEN];
        inner.read_exact(&mut header).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                KmerMergeError::InvalidStore {
                    details: "file too small".into(),
                    path: path.clone(),
                }
            } else {
                KmerMergeError::StoreRead {
                    source: e,
                    path: path.clone(),
                }
            }
        })?;

        if &header[..4] != MAGIC {
            return Err(KmerMergeError::InvalidStore {
                details: "invalid magic bytes (not a k-mer count database)".into(),
                path,
            });
        }

        if header[4] != VERSION {
            return Err(KmerMergeError::InvalidStore {
                details: format!("unsupported version {}", header[4]),
                path,
            });
        }

        let stored_checksum = u32::from_le_bytes(header[15..19].try_into().unwrap());
        let computed_checksum = crc32(&header[..15]);
        if computed_checksum != stored_checksum {
            return Err(KmerMergeError::InvalidStore {
                details: format!(
                    "header checksum mismatch (expected {stored_checksum:#x}, got {computed_checksum:#x})"
                ),
                path,
            });
        }

        let flags = header[5];
        let k = KmerLength::new(usize::from(header[6])).map_err(|e| {
            KmerMergeError::InvalidStore {
                details: format!("invalid k-mer length: {e}"),
                path: path.clone(),
            }
        })?;
        let total_records = u64::from_le_bytes(header[7..15].try_into().unwrap());

        Ok(Self {
            inner,
            path,
            k,
            total_records,
            sorted: flags & FLAG_SORTED != 0,
        })
    }

    /// The k-mer length of every record in this database.
    #[must_use]
    pub fn k(&self) -> KmerLength {
        self.k
    }

    /// The number of records the header declares.
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// True when the records are sorted ascending by packed k-mer.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// The path this reader reports in error messages.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes the next record in file order.
    ///
    /// # Errors
    ///
    /// Returns `Decode` on a short read or I/O failure: the database is
    /// corrupt or truncated, and the merge must abort.
    pub fn read_next(&mut self) -> Result<(PackedKmer, u64), KmerMergeError> {
        let mut record = [0u8; RECORD_LEN];
        self.inner
            .read_exact(&mut record)
            .map_err(|e| KmerMergeError::Decode {
                details: e.to_string(),
                path: self.path.clone(),
            })?;
        let packed = u64::from_le_bytes(record[..8].try_into().unwrap());
        let count = u64::from_le_bytes(record[8..16].try_into().unwrap());
        Ok((PackedKmer::from_bits(packed), count))
    }
}

/// Saves a k-mer count database to a file, gzip-transparently for `.gz`
/// paths.
///
/// The sorted flag is set iff `records` are strictly increasing by packed
/// k-mer, so a pre-sorted slice produces a database the merge accepts.
///
/// # Errors
///
/// Returns `StoreWrite` if the file cannot be created or written.
pub fn save_store<P: AsRef<Path>>(
    path: P,
    k: KmerLength,
    records: &[(PackedKmer, u64)],
) -> Result<(), KmerMergeError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| KmerMergeError::StoreWrite {
        source: e,
        path: path.to_path_buf(),
    })?;

    #[cfg(feature = "gzip")]
    if is_gzip_path(path) {
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        return write_store(BufWriter::new(encoder), k, records, path);
    }

    write_store(BufWriter::new(file), k, records, path)
}

fn write_store<W: Write>(
    mut writer: W,
    k: KmerLength,
    records: &[(PackedKmer, u64)],
    path: &Path,
) -> Result<(), KmerMergeError> {
    let sorted = records.windows(2).all(|pair| pair[0].0 < pair[1].0);

    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(MAGIC);
    header[4] = VERSION;
    header[5] = if sorted { FLAG_SORTED } else { 0 };
    header[6] = k.as_u8();
    header[7..15].copy_from_slice(&(records.len() as u64).to_le_bytes());
    let checksum = crc32(&header[..15]);
    header[15..19].copy_from_slice(&checksum.to_le_bytes());

    writer
        .write_all(&header)
        .map_err(|e| KmerMergeError::StoreWrite {
            source: e,
            path: path.to_path_buf(),
        })?;

    for &(kmer, count) in records {
        writer
            .write_all(&kmer.bits().to_le_bytes())
            .map_err(|e| KmerMergeError::StoreWrite {
                source: e,
                path: path.to_path_buf(),
            })?;
        writer
            .write_all(&count.to_le_bytes())
            .map_err(|e| KmerMergeError::StoreWrite {
                source: e,
                path: path.to_path_buf(),
            })?;
    }

    writer.flush().map_err(|e| KmerMergeError::StoreWrite {
        source: e,
        path: path.to_path_buf(),
    })?;

    Ok(())
}

/// CRC32 (IEEE polynomial) computation.
fn crc32(data: &[u8]) -> u32 {
    const POLYNOMIAL: u32 = 0xEDB8_8320;

    let table: [u32; 256] = {
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut crc = i as u32;
            for _ in 0..8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ POLYNOMIAL;
                } else {
                    crc >>= 1;
                }
            }
            *entry = crc;
        }
        table
    };

    let mut crc = !0u32;
    for &byte in data {
        crc = table[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
    }
    !crc
}

/// Checks if a path has a `.gz` extension.
#[cfg(feature = "gzip")]
fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}
