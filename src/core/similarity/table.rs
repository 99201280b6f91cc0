//! Fingerprint table shared by concurrent appends, and the index built over it.

use crate::core::fingerprint::Fingerprint;
use crate::core::index::{self, Metric, Neighbor, VpTree};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One appended image
#[derive(Debug, Clone)]
pub struct Entry<F> {
    pub key: PathBuf,
    pub fingerprint: F,
}

/// Insertion-ordered `(key, fingerprint)` entries.
///
/// Inserts lock only for the single push. A poisoned lock is recovered:
/// a panicking `Vec::push` cannot leave a half-written entry behind.
#[derive(Debug)]
pub struct FingerprintTable<F> {
    entries: Mutex<Vec<Entry<F>>>,
}

impl<F> FingerprintTable<F> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, key: PathBuf, fingerprint: F) {
        self.lock().push(Entry { key, fingerprint });
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared view for queries that run alongside appends
    pub fn lock(&self) -> MutexGuard<'_, Vec<Entry<F>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock-free view; the unique borrow already excludes appends.
    pub fn entries_mut(&mut self) -> &[Entry<F>] {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .as_slice()
    }

    pub fn clear(&mut self) {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<F> Default for FingerprintTable<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares table entries by their fingerprints
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryMetric;

impl<'e, F: Fingerprint> Metric<&'e Entry<F>> for EntryMetric {
    fn distance(&self, a: &&'e Entry<F>, b: &&'e Entry<F>) -> f64 {
        a.fingerprint.distance(&b.fingerprint)
    }
}

/// A vantage-point tree over borrowed table entries
pub struct EntryIndex<'t, F> {
    tree: VpTree<&'t Entry<F>>,
}

impl<'t, F: Fingerprint> EntryIndex<'t, F> {
    pub fn build(entries: &'t [Entry<F>]) -> Self {
        Self {
            tree: index::build(entries.iter().collect(), &EntryMetric),
        }
    }

    /// The `k` entries nearest to `query`, closest first
    pub fn nearest<'q>(&'q self, query: &'q Entry<F>, k: usize) -> Vec<Neighbor<'q, &'q Entry<F>>>
    where
        't: 'q,
    {
        let tree: &'q VpTree<&'q Entry<F>> = &self.tree;
        index::search(tree, &EntryMetric, &query, k)
    }
}
