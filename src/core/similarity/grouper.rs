//! Final ordering and deduplication of candidate clusters.

use super::Cluster;
use std::collections::HashSet;
use std::path::PathBuf;

/// Sort clusters by descending member count.
///
/// The sort is stable: equal-sized clusters keep their sweep order.
pub fn sort_by_size(mut clusters: Vec<Cluster>) -> Vec<Cluster> {
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
    clusters
}

/// Keep only the first cluster for each distinct member set.
///
/// Two clusters are the same when their sorted key lists are equal,
/// regardless of which member is the representative.
pub fn dedup_by_members(clusters: Vec<Cluster>) -> Vec<Cluster> {
    let mut seen: HashSet<Vec<PathBuf>> = HashSet::with_capacity(clusters.len());
    clusters
        .into_iter()
        .filter(|cluster| seen.insert(cluster.member_set()))
        .collect()
}
