//! Trait definitions shared by all similarity strategies.

use super::ClusterResult;
use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Available similarity strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Byte-identical files (CRC-32)
    Exact,
    /// Near-duplicates (block-mean hash, Hamming distance)
    Perceptual,
    /// Similar color composition (spatial histogram, cosine distance)
    Histogram,
}

impl StrategyKind {
    /// Get a human-readable description of the strategy
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Exact => "Exact match - files with identical bytes",
            StrategyKind::Perceptual => {
                "Perceptual match - block-mean hashes within a Hamming distance threshold"
            }
            StrategyKind::Histogram => {
                "Color similarity - spatial color histograms within a cosine distance threshold"
            }
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Exact => write!(f, "exact"),
            StrategyKind::Perceptual => write!(f, "perceptual"),
            StrategyKind::Histogram => write!(f, "histogram"),
        }
    }
}

/// What happened to an appended image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The fingerprint was added to the table
    Indexed,
    /// The image could not be decoded and was left out
    Skipped,
}

/// Per-call overrides for a clustering run.
///
/// `None` means "use the strategy's configured value".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Neighbors examined per source image
    pub depth: Option<usize>,
    /// Neighbors must be strictly closer than this
    pub threshold: Option<f64>,
}

impl ClusterParams {
    /// Map the legacy sentinel convention: a negative (or NaN) value means
    /// "use the strategy default".
    pub fn from_sentinels(depth: i64, threshold: f64) -> Self {
        Self {
            depth: usize::try_from(depth).ok(),
            threshold: (threshold >= 0.0).then_some(threshold),
        }
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Uniform interface over the similarity strategies.
///
/// Usage is append-many, then cluster-once. `append_image` takes `&self`
/// and may be called from many threads at once; `cluster` takes
/// `&mut self`, so no append can be in flight while it runs.
pub trait ImageSimilarity: Send + Sync {
    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// Fingerprint one image and add it to the table.
    ///
    /// The exact strategy surfaces I/O errors; the perceptual and
    /// histogram strategies report undecodable images as
    /// [`AppendOutcome::Skipped`] instead.
    fn append_image(&self, path: &Path) -> Result<AppendOutcome, FingerprintError>;

    /// Group the appended images, calling `progress(processed, total)`
    /// after each source image.
    fn cluster_with_params(
        &mut self,
        progress: &mut dyn FnMut(usize, usize),
        params: ClusterParams,
    ) -> ClusterResult;

    /// Group the appended images using the configured depth and threshold
    fn cluster(&mut self, progress: &mut dyn FnMut(usize, usize)) -> ClusterResult {
        self.cluster_with_params(progress, ClusterParams::default())
    }

    /// Number of images in the table
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every fingerprint so the instance can be reused
    fn clear(&mut self);
}
