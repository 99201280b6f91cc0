//! Spatial color histogram fingerprint.
//!
//! The image is mapped onto a 30x30 grid per color channel and the raw
//! byte intensities falling into each cell are summed. Cells covering
//! more source pixels get larger sums; nothing is averaged. Two
//! fingerprints are compared by cosine distance, which only cares about
//! the shape of the distribution, not its magnitude.

use super::super::traits::{Fingerprint, ImageFingerprinter};
use crate::error::FingerprintError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Grid cells per side
pub const GRID_SIZE: usize = 30;
/// Color planes (R, G, B)
pub const CHANNELS: usize = 3;
/// Scalars in one fingerprint
pub const HISTOGRAM_LEN: usize = CHANNELS * GRID_SIZE * GRID_SIZE;

/// Distance reported when either fingerprint has zero norm
pub const MAX_COSINE_DISTANCE: f64 = 2.0;

/// 3x30x30 intensity sums, channel-major then row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramFingerprint {
    sums: Vec<u64>,
}

impl HistogramFingerprint {
    /// Wrap raw sums. Returns `None` unless exactly [`HISTOGRAM_LEN`] values are given.
    pub fn from_sums(sums: Vec<u64>) -> Option<Self> {
        (sums.len() == HISTOGRAM_LEN).then_some(Self { sums })
    }

    pub fn zeroed() -> Self {
        Self {
            sums: vec![0; HISTOGRAM_LEN],
        }
    }

    pub fn get(&self, channel: usize, y: usize, x: usize) -> u64 {
        self.sums[Self::offset(channel, y, x)]
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.sums
    }

    fn offset(channel: usize, y: usize, x: usize) -> usize {
        (channel * GRID_SIZE + y) * GRID_SIZE + x
    }

    /// Cosine of the angle between the two histograms, `None` if either is all zeros.
    pub fn cosine_similarity(&self, other: &Self) -> Option<f64> {
        let mut magnitude_a = 0.0f64;
        let mut magnitude_b = 0.0f64;
        let mut product = 0.0f64;

        for (&a, &b) in self.sums.iter().zip(other.sums.iter()) {
            let a = a as f64;
            let b = b as f64;
            magnitude_a += a * a;
            magnitude_b += b * b;
            product += a * b;
        }

        let magnitude = (magnitude_a * magnitude_b).sqrt();
        if magnitude == 0.0 {
            return None;
        }
        Some(product / magnitude)
    }
}

impl Fingerprint for HistogramFingerprint {
    /// `1 - cosine_similarity`, clamped to `[0, 2]`.
    fn distance(&self, other: &Self) -> f64 {
        match self.cosine_similarity(other) {
            Some(similarity) => (1.0 - similarity).clamp(0.0, MAX_COSINE_DISTANCE),
            None => MAX_COSINE_DISTANCE,
        }
    }
}

/// Computes [`HistogramFingerprint`]s from 24-bit RGB pixels
#[derive(Debug, Clone, Default)]
pub struct HistogramHasher;

impl HistogramHasher {
    pub fn new() -> Self {
        Self
    }
}

impl ImageFingerprinter for HistogramHasher {
    type Output = HistogramFingerprint;

    fn fingerprint_image(
        &self,
        image: &DynamicImage,
    ) -> Result<HistogramFingerprint, FingerprintError> {
        let rgb = image.to_rgb8();
        let height = rgb.height() as usize;
        let row_bytes = rgb.width() as usize * CHANNELS;

        if height == 0 || row_bytes == 0 {
            return Err(FingerprintError::ComputationFailed(
                "Cannot build a histogram of an empty image".to_string(),
            ));
        }

        let mut fingerprint = HistogramFingerprint::zeroed();

        // Buckets are assigned per byte, so the three channels of one pixel
        // can straddle a column boundary.
        for (y, row) in rgb.as_raw().chunks_exact(row_bytes).enumerate() {
            let grid_y = y * GRID_SIZE / height;
            for (x, &value) in row.iter().enumerate() {
                let grid_x = x * GRID_SIZE / row_bytes;
                let offset = HistogramFingerprint::offset(x % CHANNELS, grid_y, grid_x);
                fingerprint.sums[offset] += value as u64;
            }
        }

        Ok(fingerprint)
    }
}
