//! Histogram strategy: images with similar color composition.

use super::grouper::sort_by_size;
use super::table::{Entry, EntryIndex, FingerprintTable};
use super::traits::{AppendOutcome, ClusterParams, ImageSimilarity, StrategyKind};
use super::{Cluster, ClusterMember, ClusterResult};
use crate::core::fingerprint::{HistogramFingerprint, HistogramHasher, ImageFingerprinter};
use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, debug_span, info};

/// Tuning for [`HistogramSimilarity`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Neighbors examined per source image
    pub depth: usize,
    /// Maximum cosine distance (exclusive) from the representative
    pub threshold: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            depth: 100,
            threshold: 0.05,
        }
    }
}

impl HistogramConfig {
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

/// Clusters images by spatial color histogram.
///
/// The sweep is greedy: once an image lands in a cluster it is consumed
/// and takes no further part, so the result depends on append order.
#[derive(Debug, Default)]
pub struct HistogramSimilarity {
    hasher: HistogramHasher,
    table: FingerprintTable<HistogramFingerprint>,
    config: HistogramConfig,
}

impl HistogramSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HistogramConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    /// Add an already computed fingerprint under `key`
    pub fn insert(&self, key: PathBuf, fingerprint: HistogramFingerprint) {
        self.table.insert(key, fingerprint);
    }

    /// The `count` table entries closest to `fingerprint`, nearest first.
    ///
    /// `count` is clamped to the number of appended images.
    pub fn find_similar(
        &self,
        fingerprint: &HistogramFingerprint,
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
            fingerprint: fingerprint.clone(),
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

impl ImageSimilarity for HistogramSimilarity {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Histogram
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
        // Indexed by table position; tree hits carry the same positions
        let mut consumed = vec![false; total];
        let mut consumed_count = 0;
        let mut groups = Vec::new();

        for (position, source) in entries.iter().enumerate() {
            if consumed[position] {
                continue;
            }

            let k = config.depth.min(total - consumed_count);
            let mut cluster = Cluster::new(source.key.clone());
            consumed[position] = true;
            consumed_count += 1;

            for hit in index.nearest(source, k) {
                if hit.distance < config.threshold && !consumed[hit.index] {
                    consumed[hit.index] = true;
                    consumed_count += 1;
                    cluster.push(hit.item.key.clone(), hit.distance);
                }
            }

            groups.push(cluster);
            progress(consumed_count, total);
        }

        let clusters = sort_by_size(groups);
        info!(
            images = total,
            clusters = clusters.len(),
            largest = clusters.first().map_or(0, Cluster::len),
            "histogram clustering finished"
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
    use crate::core::fingerprint::{GRID_SIZE, HISTOGRAM_LEN};
    use std::collections::HashSet;

    /// Histogram with all mass in one bucket, plus `bleed` in a second one
    fn fp(bucket: usize, bleed: u64) -> HistogramFingerprint {
        let mut sums = vec![0u64; HISTOGRAM_LEN];
        sums[bucket] = 100;
        sums[(bucket + 1) % HISTOGRAM_LEN] += bleed;
        HistogramFingerprint::from_sums(sums).unwrap()
    }

    fn strategy(entries: Vec<(&str, HistogramFingerprint)>) -> HistogramSimilarity {
        let strategy = HistogramSimilarity::new();
        for (key, fingerprint) in entries {
            strategy.insert(PathBuf::from(key), fingerprint);
        }
        strategy
    }

    #[test]
    fn defaults() {
        let config = HistogramConfig::default();
        assert_eq!(config.depth, 100);
        assert_eq!(config.threshold, 0.05);
        assert_eq!(
            config.apply(ClusterParams::default().threshold(0.3)).threshold,
            0.3
        );
    }

    #[test]
    fn empty_table_or_zero_depth_returns_empty_result() {
        let mut empty = HistogramSimilarity::new();
        assert!(empty.cluster(&mut |_, _| {}).is_empty());

        let mut strategy = strategy(vec![("/a", fp(0, 0))]);
        let params = ClusterParams::default().depth(0);
        assert!(strategy.cluster_with_params(&mut |_, _| {}, params).is_empty());
    }

    #[test]
    fn similar_colors_group_under_first_source() {
        let mut strategy = strategy(vec![
            ("/red", fp(0, 0)),
            ("/blue", fp(GRID_SIZE * GRID_SIZE * 2, 0)),
            ("/red-ish", fp(0, 5)),
        ]);
        let clusters = strategy.cluster(&mut |_, _| {});

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].representative(), Path::new("/red"));
        assert!(clusters[0].contains(Path::new("/red-ish")));
        assert!(clusters[0].members()[1].distance < 0.05);
        assert_eq!(clusters[1].representative(), Path::new("/blue"));
        assert!(clusters[1].is_singleton());
    }

    #[test]
    fn each_image_lands_in_exactly_one_cluster() {
        let mut entries = Vec::new();
        let names: Vec<String> = (0..40).map(|i| format!("/{}.png", i)).collect();
        for (i, name) in names.iter().enumerate() {
            entries.push((name.as_str(), fp((i % 4) * 7, (i % 5) as u64)));
        }
        let mut strategy = strategy(entries);
        let clusters = strategy.cluster(&mut |_, _| {});

        let mut seen = HashSet::new();
        for cluster in &clusters {
            for key in cluster.keys() {
                assert!(seen.insert(key.to_path_buf()), "{:?} appears twice", key);
            }
        }
        assert_eq!(seen.len(), 40);
        assert!(clusters.windows(2).all(|w| w[0].len() >= w[1].len()));
    }

    #[test]
    fn zero_histogram_stays_alone() {
        let mut strategy = strategy(vec![
            ("/black-1", HistogramFingerprint::zeroed()),
            ("/black-2", HistogramFingerprint::zeroed()),
        ]);
        let clusters = strategy.cluster(&mut |_, _| {});

        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(Cluster::is_singleton));
    }

    #[test]
    fn negative_threshold_uses_configured_default() {
        let mut strategy = strategy(vec![("/a", fp(0, 0)), ("/b", fp(0, 0))]);
        let default_run = strategy.cluster(&mut |_, _| {});
        let params = ClusterParams::default().threshold(-0.5);
        let negative_run = strategy.cluster_with_params(&mut |_, _| {}, params);

        assert_eq!(default_run.len(), 1);
        assert_eq!(default_run[0].len(), 2);
        assert_eq!(negative_run, default_run);
    }

    #[test]
    fn progress_reports_consumed_images() {
        let mut strategy = strategy(vec![
            ("/a", fp(0, 0)),
            ("/b", fp(0, 1)),
            ("/c", fp(50, 0)),
        ]);
        let mut reports = Vec::new();
        strategy.cluster(&mut |consumed, total| reports.push((consumed, total)));

        assert_eq!(reports, vec![(2, 3), (3, 3)]);
    }

    #[test]
    fn find_similar_orders_by_distance() {
        let strategy = strategy(vec![
            ("/far", fp(10, 0)),
            ("/near", fp(0, 1)),
            ("/exact", fp(0, 0)),
        ]);
        let hits = strategy.find_similar(&fp(0, 0), 2);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, PathBuf::from("/exact"));
        assert_eq!(hits[1].key, PathBuf::from("/near"));
    }
}
