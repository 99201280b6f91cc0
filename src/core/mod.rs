//! # Core Module
//!
//! The image clustering engine.
//!
//! ## Modules
//! - `fingerprint` - Computes exact, perceptual and histogram fingerprints
//! - `index` - Vantage-point tree for k-nearest-neighbor queries
//! - `similarity` - Strategies that append images and cluster them
//! - `pipeline` - Orchestrates appending and clustering

pub mod fingerprint;
pub mod index;
pub mod pipeline;
pub mod similarity;

// Re-export commonly used types
pub use fingerprint::{ExactFingerprint, Fingerprint, HistogramFingerprint, PerceptualFingerprint};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineResult};
pub use similarity::{
    Cluster, ClusterMember, ClusterParams, ClusterResult, ExactSimilarity, HistogramSimilarity,
    ImageSimilarity, PerceptualSimilarity, SimilarityBuilder, StrategyKind,
};
