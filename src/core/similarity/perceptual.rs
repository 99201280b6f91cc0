//! Perceptual strategy: near-duplicates under a block-mean hash.

use super::grouper::{dedup_by_members, sort_by_size};
use super::table::{Entry, EntryIndex, FingerprintTable};
use super::traits::{AppendOutcome, ClusterParams, ImageSimilarity, StrategyKind};
use super::{Cluster, ClusterMember, ClusterResult};
use crate::core::fingerprint::{BlockMeanHasher, ImageFingerprinter, PerceptualFingerprint};
use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, debug_span, info};

/// Tuning for [`PerceptualSimilarity`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceptualConfig {
    /// Neighbors examined per source image
    pub depth: usize,
    /// Maximum Hamming distance (exclusive) between cluster members
    pub threshold: f64,
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            depth: 50,
            threshold: 100.0,
        }
    }
}

impl PerceptualConfig {
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Overlay per-call overrides on this config.
    ///
    /// A negative or NaN threshold keeps the configured one.
    pub fn apply(self, params: ClusterParams) -> Self {
        Self {
            depth: params.depth.unwrap_or(self.depth),
            threshold: params
                .threshold
                .filter(|t| *t >= 0.0)
                .unwrap_or(self.threshold),
        }
    }
}

/// Clusters images whose block-mean hashes are within a Hamming radius.
///
/// Every image seeds a candidate cluster, so an image may appear as a
/// member of several clusters. Candidates with identical member sets are
/// collapsed to the first one after sorting by size.
#[derive(Debug, Default)]
pub struct PerceptualSimilarity {
    hasher: BlockMeanHasher,
    table: FingerprintTable<PerceptualFingerprint>,
    config: PerceptualConfig,
}

impl PerceptualSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PerceptualConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PerceptualConfig {
        &self.config
    }

    /// Add an already computed fingerprint under `key`
    pub fn insert(&self, key: PathBuf, fingerprint: PerceptualFingerprint) {
        self.table.insert(key, fingerprint);
    }

    /// The `count` table entries closest to `fingerprint`, nearest first.
    ///
    /// `count` is clamped to the number of appended images.
    pub fn find_similar(
        &self,
        fingerprint: &PerceptualFingerprint,
        count: usize,
    ) -> Vec<ClusterMember> {
        let entries = self.table.lock();
        let count = count.min(entries.len());
        if count == 0 {
            return Vec::new();
        }

        let index = EntryIndex::build(&entries);
        let query = Entry {
            key: PathBuf::new(),
            fingerprint: *fingerprint,
        };

        index
            .nearest(&query, count)
            .into_iter()
            .map(|hit| ClusterMember {
                key: hit.item.key.clone(),
                distance: hit.distance,
            })
            .collect()
    }
}

impl ImageSimilarity for PerceptualSimilarity {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Perceptual
    }

    fn append_image(&self, path: &Path) -> Result<AppendOutcome, FingerprintError> {
        match self.hasher.fingerprint_file(path) {
            Ok(fingerprint) => {
                self.table.insert(path.to_path_buf(), fingerprint);
                Ok(AppendOutcome::Indexed)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping image");
                Ok(AppendOutcome::Skipped)
            }
        }
    }

    fn cluster_with_params(
        &mut self,
        progress: &mut dyn FnMut(usize, usize),
        params: ClusterParams,
    ) -> ClusterResult {
        let config = self.config.apply(params);
        let entries = self.table.entries_mut();
        let total = entries.len();
        if total == 0 || config.depth == 0 {
            return Vec::new();
        }

        let index = {
            let _span = debug_span!("build_index", images = total).entered();
            EntryIndex::build(entries)
        };

        let _span = debug_span!("sweep", depth = config.depth, threshold = config.threshold).entered();
        let mut candidates = Vec::with_capacity(total);

        for (processed, source) in entries.iter().enumerate() {
            let k = config.depth.min(total - processed);
            let mut cluster = Cluster::new(source.key.clone());

            for hit in index.nearest(source, k) {
                if hit.distance < config.threshold && hit.item.key != source.key {
                    cluster.push(hit.item.key.clone(), hit.distance);
                }
            }

            candidates.push(cluster);
            progress(processed + 1, total);
        }

        let clusters = dedup_by_members(sort_by_size(candidates));
        info!(
            images = total,
            clusters = clusters.len(),
            largest = clusters.first().map_or(0, Cluster::len),
            "perceptual clustering finished"
        );
        clusters
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn clear(&mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::FINGERPRINT_WORDS;

    /// Fingerprint with the lowest `bits` bits of word 0 set
    fn fp(bits: u32) -> PerceptualFingerprint {
        let mut words = [0u64; FINGERPRINT_WORDS];
        words[0] = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        PerceptualFingerprint::from_words(words)
    }

    fn strategy(entries: &[(&str, u32)]) -> PerceptualSimilarity {
        let strategy = PerceptualSimilarity::new();
        for (key, bits) in entries {
            strategy.insert(PathBuf::from(key), fp(*bits));
        }
        strategy
    }

    #[test]
    fn defaults() {
        let config = PerceptualConfig::default();
        assert_eq!(config.depth, 50);
        assert_eq!(config.threshold, 100.0);
    }

    #[test]
    fn apply_overrides_only_given_values() {
        let config = PerceptualConfig::default().apply(ClusterParams::default().depth(5));
        assert_eq!(config.depth, 5);
        assert_eq!(config.threshold, 100.0);
    }

    #[test]
    fn empty_table_returns_empty_result() {
        let mut strategy = PerceptualSimilarity::new();
        let mut calls = 0;
        assert!(strategy.cluster(&mut |_, _| calls += 1).is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn zero_depth_returns_empty_result() {
        let mut strategy = strategy(&[("/a", 0), ("/b", 1)]);
        let clusters =
            strategy.cluster_with_params(&mut |_, _| {}, ClusterParams::default().depth(0));
        assert!(clusters.is_empty());
    }

    #[test]
    fn mutual_neighbors_collapse_into_one_cluster() {
        let mut strategy = strategy(&[("/a", 0), ("/b", 2), ("/far", 64)]);
        let params = ClusterParams::default().threshold(10.0);
        let clusters = strategy.cluster_with_params(&mut |_, _| {}, params);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].representative(), Path::new("/a"));
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[0].members()[1].distance, 2.0);
        assert!(clusters[1].is_singleton());
        assert_eq!(clusters[1].representative(), Path::new("/far"));
    }

    #[test]
    fn overlapping_clusters_are_kept() {
        // a-b and b-c are within the threshold, a-c is not
        let mut strategy = strategy(&[("/b", 6), ("/a", 0), ("/c", 12)]);
        let params = ClusterParams::default().threshold(7.0);
        let clusters = strategy.cluster_with_params(&mut |_, _| {}, params);

        assert_eq!(clusters[0].representative(), Path::new("/b"));
        assert_eq!(clusters[0].len(), 3);
        let in_several = clusters.iter().filter(|c| c.contains(Path::new("/b"))).count();
        assert!(in_several > 1);
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut strategy = strategy(&[("/a", 0), ("/b", 4)]);
        let params = ClusterParams::default().threshold(4.0);
        let clusters = strategy.cluster_with_params(&mut |_, _| {}, params);

        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(Cluster::is_singleton));
    }

    #[test]
    fn negative_threshold_uses_configured_default() {
        let mut strategy = strategy(&[("/a", 0), ("/b", 2)]);
        let default_run = strategy.cluster(&mut |_, _| {});
        let negative_run =
            strategy.cluster_with_params(&mut |_, _| {}, ClusterParams::default().threshold(-1.0));

        assert_eq!(default_run[0].len(), 2);
        assert_eq!(negative_run, default_run);
        assert_eq!(
            PerceptualConfig::default()
                .apply(ClusterParams::default().threshold(f64::NAN))
                .threshold,
            100.0
        );
    }

    #[test]
    fn progress_counts_every_source() {
        let mut strategy = strategy(&[("/a", 0), ("/b", 1), ("/c", 2)]);
        let mut reports = Vec::new();
        strategy.cluster(&mut |processed, total| reports.push((processed, total)));
        assert_eq!(reports, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn find_similar_clamps_count() {
        let strategy = strategy(&[("/a", 0), ("/b", 3), ("/c", 9)]);
        let hits = strategy.find_similar(&fp(2), 10);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].key, PathBuf::from("/b"));
        assert_eq!(hits[0].distance, 1.0);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!(PerceptualSimilarity::new().find_similar(&fp(0), 5).is_empty());
    }

    #[test]
    fn undecodable_file_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();

        let strategy = PerceptualSimilarity::new();
        assert_eq!(strategy.append_image(&path).unwrap(), AppendOutcome::Skipped);
        assert_eq!(
            strategy
                .append_image(Path::new("/nonexistent/missing.png"))
                .unwrap(),
            AppendOutcome::Skipped
        );
        assert!(strategy.is_empty());
    }
}
