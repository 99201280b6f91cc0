//! # Index Module
//!
//! An in-memory metric index for exact nearest-neighbor queries.
//!
//! The index is a vantage-point tree over items of any type. It knows
//! nothing about distances itself: [`build`] and [`search`] take the same
//! [`Metric`] so that one tree type serves Hamming, cosine or any other
//! caller-supplied dissimilarity.
//!
//! ## Example
//! ```rust,ignore
//! let hamming = |a: &u64, b: &u64| (a ^ b).count_ones() as f64;
//! let tree = index::build(hashes, &hamming);
//! for hit in index::search(&tree, &hamming, &query, 5) {
//!     println!("{:x} at {}", hit.item, hit.distance);
//! }
//! ```

mod metric;
mod vptree;

pub use metric::Metric;
pub use vptree::{build, build_with_seed, search, Neighbor, VpTree, DEFAULT_SEED};
