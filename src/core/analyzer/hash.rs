//! Content hashing for exact-duplicate detection.
//!
//! Files at or above 1 MiB are memory-mapped instead of read into a buffer.

use crate::error::AnalyzeError;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_128;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// File bytes that may be either owned or memory-mapped
pub enum FileBytes {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl std::ops::Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Vec(v) => v,
            FileBytes::Mmap(m) => m,
        }
    }
}

/// Read a whole file, mapping it when it is large
pub fn read_file_bytes(path: &Path) -> Result<FileBytes, AnalyzeError> {
    let read_error = |source| AnalyzeError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let len = file.metadata().map_err(read_error)?.len();

    if len >= MMAP_THRESHOLD {
        // SAFETY: read-only mapping; the file is not written while hashing
        let mmap = unsafe { Mmap::map(&file) }.map_err(read_error)?;
        Ok(FileBytes::Mmap(mmap))
    } else {
        std::fs::read(path).map(FileBytes::Vec).map_err(read_error)
    }
}

/// 128-bit xxh3 of the file bytes as 32 lower-case hex digits
pub fn content_hash(path: &Path) -> Result<String, AnalyzeError> {
    let bytes = read_file_bytes(path)?;
    Ok(hash_bytes(&bytes))
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:032x}", xxh3_128(bytes))
}
