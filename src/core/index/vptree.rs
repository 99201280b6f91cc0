//! Vantage-point tree construction and exact k-NN search.
//!
//! **Build**: pick a random vantage point, compute its distance to every
//! other item once, split at the median distance into an inside set
//! (distance <= radius) and an outside set (distance >= radius), recurse.
//!
//! **Search**: depth-first, nearer side first, keeping the k best hits in
//! a max-heap. A subtree is skipped only when the pruning bound proves it
//! cannot hold anything closer than the current k-th best (tau):
//! - inside is visited when `d(q, vp) - tau <= radius`
//! - outside is visited when `d(q, vp) + tau >= radius`

use super::metric::Metric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Seed used by [`build`], so repeated runs over the same data agree.
pub const DEFAULT_SEED: u64 = 0x5eed_0f7e_ee;

#[derive(Debug, Clone)]
struct Node {
    /// Index into `VpTree::items`
    item: usize,
    /// Median distance from the vantage point to the items below it
    radius: f64,
    inside: Option<usize>,
    outside: Option<usize>,
}

/// An immutable vantage-point tree over `T`.
///
/// The tree does not own a distance function; the same [`Metric`] must be
/// passed to [`build`] and [`search`].
#[derive(Debug, Clone)]
pub struct VpTree<T> {
    items: Vec<T>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl<T> VpTree<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Length of the longest root-to-leaf path (0 for an empty tree).
    pub fn depth(&self) -> usize {
        fn walk<T>(tree: &VpTree<T>, node: Option<usize>) -> usize {
            match node {
                None => 0,
                Some(index) => {
                    let node = &tree.nodes[index];
                    1 + walk(tree, node.inside).max(walk(tree, node.outside))
                }
            }
        }
        walk(self, self.root)
    }
}

/// A search hit
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a, T> {
    pub item: &'a T,
    /// Position of `item` in [`VpTree::items`]
    pub index: usize,
    pub distance: f64,
}

/// Build a tree with [`DEFAULT_SEED`] driving vantage point selection.
pub fn build<T, M: Metric<T>>(items: Vec<T>, metric: &M) -> VpTree<T> {
    build_with_seed(items, metric, DEFAULT_SEED)
}

/// Build a tree, choosing vantage points with an RNG seeded from `seed`.
///
/// Costs O(n log n) distance evaluations.
pub fn build_with_seed<T, M: Metric<T>>(items: Vec<T>, metric: &M, seed: u64) -> VpTree<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..items.len()).collect();
    let mut nodes = Vec::with_capacity(items.len());

    let root = build_node(&items, metric, &mut order, &mut nodes, &mut rng);

    VpTree { items, nodes, root }
}

fn build_node<T, M: Metric<T>>(
    items: &[T],
    metric: &M,
    slice: &mut [usize],
    nodes: &mut Vec<Node>,
    rng: &mut StdRng,
) -> Option<usize> {
    if slice.is_empty() {
        return None;
    }

    let pick = rng.gen_range(0..slice.len());
    slice.swap(0, pick);
    let (&mut vantage, rest) = slice.split_first_mut()?;

    let node_index = nodes.len();
    nodes.push(Node {
        item: vantage,
        radius: 0.0,
        inside: None,
        outside: None,
    });

    if rest.is_empty() {
        return Some(node_index);
    }

    let mut scored: Vec<(f64, usize)> = rest
        .iter()
        .map(|&index| (metric.distance(&items[vantage], &items[index]), index))
        .collect();

    let median = scored.len() / 2;
    scored.select_nth_unstable_by(median, |a, b| a.0.total_cmp(&b.0));
    let radius = scored[median].0;

    for (slot, &(_, index)) in rest.iter_mut().zip(scored.iter()) {
        *slot = index;
    }
    drop(scored);

    let (inside, outside) = rest.split_at_mut(median);
    let inside = build_node(items, metric, inside, nodes, rng);
    let outside = build_node(items, metric, outside, nodes, rng);

    let node = &mut nodes[node_index];
    node.radius = radius;
    node.inside = inside;
    node.outside = outside;

    Some(node_index)
}

/// Find the `k` items nearest to `query`.
///
/// Results are sorted by non-decreasing distance; equal distances keep
/// the order in which the traversal found them. Returns fewer than `k`
/// hits only when the tree holds fewer than `k` items.
pub fn search<'a, T, M: Metric<T>>(
    tree: &'a VpTree<T>,
    metric: &M,
    query: &T,
    k: usize,
) -> Vec<Neighbor<'a, T>> {
    let root = match tree.root {
        Some(root) if k > 0 => root,
        _ => return Vec::new(),
    };

    let mut state = KnnState {
        heap: BinaryHeap::with_capacity(k + 1),
        k,
        tau: f64::INFINITY,
        found: 0,
    };
    state.visit(tree, metric, query, root);

    state
        .heap
        .into_sorted_vec()
        .into_iter()
        .map(|hit| Neighbor {
            item: &tree.items[hit.index],
            index: hit.index,
            distance: hit.distance,
        })
        .collect()
}

/// Heap entry; the heap's top is the current k-th best.
#[derive(Debug, Clone, Copy)]
struct Hit {
    distance: f64,
    /// Discovery order, breaks distance ties
    sequence: usize,
    index: usize,
}

impl PartialEq for Hit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Hit {}

impl Ord for Hit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for Hit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct KnnState {
    heap: BinaryHeap<Hit>,
    k: usize,
    tau: f64,
    found: usize,
}

impl KnnState {
    fn offer(&mut self, index: usize, distance: f64) {
        self.heap.push(Hit {
            distance,
            sequence: self.found,
            index,
        });
        self.found += 1;

        if self.heap.len() > self.k {
            self.heap.pop();
        }
        if self.heap.len() == self.k {
            if let Some(worst) = self.heap.peek() {
                self.tau = worst.distance;
            }
        }
    }

    fn visit<T, M: Metric<T>>(&mut self, tree: &VpTree<T>, metric: &M, query: &T, node_index: usize) {
        let node = &tree.nodes[node_index];
        let distance = metric.distance(query, &tree.items[node.item]);

        if distance < self.tau {
            self.offer(node.item, distance);
        }

        if distance < node.radius {
            if let Some(inside) = node.inside {
                if distance - self.tau <= node.radius {
                    self.visit(tree, metric, query, inside);
                }
            }
            if let Some(outside) = node.outside {
                if distance + self.tau >= node.radius {
                    self.visit(tree, metric, query, outside);
                }
            }
        } else {
            if let Some(outside) = node.outside {
                if distance + self.tau >= node.radius {
                    self.visit(tree, metric, query, outside);
                }
            }
            if let Some(inside) = node.inside {
                if distance - self.tau <= node.radius {
                    self.visit(tree, metric, query, inside);
                }
            }
        }
    }
}
