//! # Image Cluster
//!
//! Groups a collection of images into clusters of similar images.
//!
//! ## Strategies
//! - **Exact** - byte-identical files (CRC-32 of the content)
//! - **Perceptual** - near-duplicates (block-mean hash, Hamming distance)
//! - **Histogram** - similar color composition (spatial histogram, cosine distance)
//!
//! ## Architecture
//! - `core` - Fingerprints, the vantage-point index and the strategies
//! - `events` - Event-driven progress reporting
//! - `error` - Error types with path context
//!
//! ## Example
//! ```no_run
//! use image_cluster::core::{ImageSimilarity, SimilarityBuilder, StrategyKind};
//! use std::path::Path;
//!
//! let mut strategy = SimilarityBuilder::new(StrategyKind::Perceptual).build();
//! strategy.append_image(Path::new("a.jpg"))?;
//! strategy.append_image(Path::new("b.jpg"))?;
//! let clusters = strategy.cluster(&mut |done, total| println!("{}/{}", done, total));
//! # Ok::<(), image_cluster::FingerprintError>(())
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ClusterError, FingerprintError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Calling it more
/// than once is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
