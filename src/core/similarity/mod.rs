//! # Similarity Module
//!
//! Groups appended images into clusters.
//!
//! ## Strategies
//! | Strategy   | Fingerprint          | Distance        | Defaults (depth / threshold) |
//! |------------|----------------------|-----------------|------------------------------|
//! | Exact      | CRC-32 of file bytes | equality        | unused                       |
//! | Perceptual | block-mean hash      | Hamming         | 50 / 100                     |
//! | Histogram  | 3x30x30 color sums   | cosine distance | 100 / 0.05                   |
//!
//! ## How It Works
//! 1. `append_image` fingerprints files into a table (thread-safe)
//! 2. `cluster` builds a vantage-point tree over the table
//! 3. Each source image queries its `depth` nearest neighbors and keeps
//!    those closer than `threshold`
//! 4. Candidate clusters are sorted by size (and, for the perceptual
//!    strategy, deduplicated by member set)

mod exact;
mod grouper;
mod histogram;
mod perceptual;
mod table;
mod traits;

pub use exact::ExactSimilarity;
pub use grouper::{dedup_by_members, sort_by_size};
pub use histogram::{HistogramConfig, HistogramSimilarity};
pub use perceptual::{PerceptualConfig, PerceptualSimilarity};
pub use table::{Entry, EntryIndex, EntryMetric, FingerprintTable};
pub use traits::{AppendOutcome, ClusterParams, ImageSimilarity, StrategyKind};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An image and its distance to the cluster's representative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub key: PathBuf,
    pub distance: f64,
}

/// A group of similar images.
///
/// The first member is the representative, at distance 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    members: Vec<ClusterMember>,
}

impl Cluster {
    /// Start a cluster around its representative
    pub fn new(representative: PathBuf) -> Self {
        Self {
            members: vec![ClusterMember {
                key: representative,
                distance: 0.0,
            }],
        }
    }

    pub fn push(&mut self, key: PathBuf, distance: f64) {
        self.members.push(ClusterMember { key, distance });
    }

    pub fn representative(&self) -> &Path {
        &self.members[0].key
    }

    pub fn members(&self) -> &[ClusterMember] {
        &self.members
    }

    pub fn keys(&self) -> impl Iterator<Item = &Path> {
        self.members.iter().map(|m| m.key.as_path())
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.keys().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// A cluster always holds its representative
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// Sorted member keys; equal for clusters with the same members
    pub fn member_set(&self) -> Vec<PathBuf> {
        let mut keys: Vec<PathBuf> = self.members.iter().map(|m| m.key.clone()).collect();
        keys.sort();
        keys
    }
}

/// Clusters sorted by descending member count
pub type ClusterResult = Vec<Cluster>;

/// Builds a boxed strategy so callers can switch strategies without
/// changing call sites.
#[derive(Debug, Clone)]
pub struct SimilarityBuilder {
    kind: StrategyKind,
    params: ClusterParams,
}

impl SimilarityBuilder {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            params: ClusterParams::default(),
        }
    }

    /// Neighbors examined per source image
    pub fn depth(mut self, depth: usize) -> Self {
        self.params.depth = Some(depth);
        self
    }

    /// Neighbors must be strictly closer than this; negative means
    /// the strategy default
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.params.threshold = Some(threshold);
        self
    }

    /// Replace both overrides at once
    pub fn params(mut self, params: ClusterParams) -> Self {
        self.params = params;
        self
    }

    /// Build the strategy
    pub fn build(self) -> Box<dyn ImageSimilarity> {
        match self.kind {
            StrategyKind::Exact => Box::new(ExactSimilarity::new()),
            StrategyKind::Perceptual => Box::new(PerceptualSimilarity::with_config(
                PerceptualConfig::default().apply(self.params),
            )),
            StrategyKind::Histogram => Box::new(HistogramSimilarity::with_config(
                HistogramConfig::default().apply(self.params),
            )),
        }
    }
}
