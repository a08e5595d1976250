//! Checksum calculation for generated files
//!
//! The document writer hashes every chunk it flushes; after the file is
//! closed the stored bytes are hashed again and both digests must agree.

use crate::domain::{Result, SddError};
use sha2::{Digest, Sha256};
use std::io::Read;

/// Incremental SHA-256 over the chunks of one file
#[derive(Debug, Clone, Default)]
pub struct StreamingChecksum {
    hasher: Sha256,
    bytes: u64,
}

impl StreamingChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Number of bytes hashed so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Hex-encoded digest of everything fed so far
    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

/// Calculate SHA-256 checksum of raw bytes
///
/// # Examples
///
/// ```
/// use sddgen::core::verification::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"<Document/>");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Calculate SHA-256 checksum of everything a reader yields
///
/// # Errors
///
/// Returns an error if reading fails.
pub fn calculate_checksum_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| SddError::Storage(format!("Failed to read for checksum: {e}")))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
