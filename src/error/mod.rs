//! # Error Module
//!
//! Error types for the image clustering engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Skip, don't fail** - perceptual and histogram strategies drop
//!   undecodable images instead of aborting a whole run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for the clustering engine
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),
}

/// Errors that occur while turning an image file into a fingerprint
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to read image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Fingerprint computation failed: {0}")]
    ComputationFailed(String),
}

impl FingerprintError {
    /// Path of the offending file, when known
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            FingerprintError::IoError { path, .. }
            | FingerprintError::DecodeError { path, .. }
            | FingerprintError::EmptyImage { path } => Some(path),
            FingerprintError::ComputationFailed(_) => None,
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ClusterError>;
