//! Exact content fingerprint: CRC-32 over the raw file bytes.
//!
//! Standard reflected IEEE CRC-32 via `crc32fast`. Two files share a
//! fingerprint when their bytes are identical (and, rarely, on a collision).

use super::super::traits::Fingerprint;
use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One-shot CRC-32 of a byte slice
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// Checksum of a file's full byte content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExactFingerprint(u32);

impl ExactFingerprint {
    pub fn new(checksum: u32) -> Self {
        Self(checksum)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(crc32(bytes))
    }

    pub fn checksum(&self) -> u32 {
        self.0
    }

    /// Lowercase, zero-padded hexadecimal form (8 characters)
    pub fn to_hex(&self) -> String {
        format!("{:08x}", self.0)
    }
}

impl std::fmt::Display for ExactFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl Fingerprint for ExactFingerprint {
    fn distance(&self, other: &Self) -> f64 {
        if self == other {
            0.0
        } else {
            1.0
        }
    }
}

/// Computes [`ExactFingerprint`]s from files
#[derive(Debug, Clone, Default)]
pub struct ContentHasher;

impl ContentHasher {
    pub fn new() -> Self {
        Self
    }

    /// Stream the file through CRC-32.
    pub fn fingerprint_file(&self, path: &Path) -> Result<ExactFingerprint, FingerprintError> {
        let io_error = |source| FingerprintError::IoError {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let mut reader = BufReader::new(file);
        let mut crc = crc32fast::Hasher::new();
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(io_error)?;
            if bytes_read == 0 {
                break;
            }
            crc.update(&buffer[..bytes_read]);
        }

        Ok(ExactFingerprint(crc.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_input_checksum_is_zero() {
        assert_eq!(crc32(b""), 0x0000_0000);
    }

    #[test]
    fn check_value_matches_reference() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn known_vectors() {
        assert_eq!(crc32(b"a"), 0xE8B7_BE43);
        assert_eq!(
            crc32(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut crc = crc32fast::Hasher::new();
        crc.update(b"12345");
        crc.update(b"6789");
        assert_eq!(crc.finalize(), crc32(b"123456789"));
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(ExactFingerprint::new(0xCBF4_3926).to_hex(), "cbf43926");
        assert_eq!(ExactFingerprint::new(0x1A).to_hex(), "0000001a");
        assert_eq!(ExactFingerprint::new(0x1A).to_string(), "0000001a");
    }

    #[test]
    fn distance_is_equality() {
        let a = ExactFingerprint::from_bytes(b"same");
        let b = ExactFingerprint::from_bytes(b"same");
        let c = ExactFingerprint::from_bytes(b"other");
        assert_eq!(a.distance(&b), 0.0);
        assert_eq!(a.distance(&c), 1.0);
    }

    #[test]
    fn file_fingerprint_matches_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        let content: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let from_file = ContentHasher::new().fingerprint_file(&path).unwrap();
        assert_eq!(from_file, ExactFingerprint::from_bytes(&content));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = ContentHasher::new().fingerprint_file(Path::new("/nonexistent/file.png"));
        assert!(matches!(result, Err(FingerprintError::IoError { .. })));
    }
}
