//! Trait definitions for fingerprints and the algorithms that compute them.

use super::fast_decode::FastDecoder;
use crate::error::FingerprintError;
use image::DynamicImage;
use std::path::Path;

/// A fixed-shape summary of an image that can be compared
pub trait Fingerprint: Clone + Send + Sync {
    /// Dissimilarity to another fingerprint of the same kind.
    ///
    /// Non-negative and symmetric; 0 for identical fingerprints.
    fn distance(&self, other: &Self) -> f64;
}

/// Algorithms that fingerprint decoded image content
pub trait ImageFingerprinter: Send + Sync {
    /// The fingerprint this algorithm produces
    type Output: Fingerprint;

    /// Compute a fingerprint from an already-loaded image
    fn fingerprint_image(&self, image: &DynamicImage) -> Result<Self::Output, FingerprintError>;

    /// Decode a file and fingerprint it.
    fn fingerprint_file(&self, path: &Path) -> Result<Self::Output, FingerprintError> {
        let image = FastDecoder::decode(path)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(FingerprintError::EmptyImage {
                path: path.to_path_buf(),
            });
        }
        self.fingerprint_image(&image)
    }
}
