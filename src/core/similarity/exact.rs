//! Exact-match strategy: files with byte-identical content.

use super::grouper::sort_by_size;
use super::traits::{AppendOutcome, ClusterParams, ImageSimilarity, StrategyKind};
use super::{Cluster, ClusterResult};
use crate::core::fingerprint::ContentHasher;
use crate::error::FingerprintError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Checksum hex string -> paths, in first-seen order
#[derive(Debug, Default)]
struct Buckets {
    positions: HashMap<String, usize>,
    groups: Vec<(String, Vec<PathBuf>)>,
    images: usize,
}

impl Buckets {
    fn insert(&mut self, hash: String, path: PathBuf) {
        match self.positions.get(&hash) {
            Some(&position) => self.groups[position].1.push(path),
            None => {
                self.positions.insert(hash.clone(), self.groups.len());
                self.groups.push((hash, vec![path]));
            }
        }
        self.images += 1;
    }
}

/// Groups images whose files have the same CRC-32.
///
/// Membership is an equality relation, so no index is built and the
/// depth/threshold parameters are ignored.
#[derive(Debug, Default)]
pub struct ExactSimilarity {
    hasher: ContentHasher,
    buckets: Mutex<Buckets>,
}

impl ExactSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Buckets> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current buckets as `(checksum hex, paths)`, in first-seen order
    pub fn buckets(&self) -> Vec<(String, Vec<PathBuf>)> {
        self.lock().groups.clone()
    }
}

impl ImageSimilarity for ExactSimilarity {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exact
    }

    fn append_image(&self, path: &Path) -> Result<AppendOutcome, FingerprintError> {
        let fingerprint = self.hasher.fingerprint_file(path)?;
        debug!(path = %path.display(), checksum = %fingerprint, "hashed file content");

        self.lock().insert(fingerprint.to_hex(), path.to_path_buf());
        Ok(AppendOutcome::Indexed)
    }

    fn cluster_with_params(
        &mut self,
        progress: &mut dyn FnMut(usize, usize),
        _params: ClusterParams,
    ) -> ClusterResult {
        let buckets = self.buckets.get_mut().unwrap_or_else(PoisonError::into_inner);
        let total = buckets.groups.len();
        let mut clusters = Vec::with_capacity(total);

        for (processed, (_, paths)) in buckets.groups.iter().enumerate() {
            let mut paths = paths.iter().cloned();
            if let Some(representative) = paths.next() {
                let mut cluster = Cluster::new(representative);
                for path in paths {
                    cluster.push(path, 0.0);
                }
                clusters.push(cluster);
            }
            progress(processed + 1, total);
        }

        let clusters = sort_by_size(clusters);
        info!(
            images = buckets.images,
            clusters = clusters.len(),
            "exact clustering finished"
        );
        clusters
    }

    fn len(&self) -> usize {
        self.lock().images
    }

    fn clear(&mut self) {
        *self.buckets.get_mut().unwrap_or_else(PoisonError::into_inner) = Buckets::default();
    }
}
