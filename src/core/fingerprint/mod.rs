//! # Fingerprint Module
//!
//! Turns image files into fixed-shape fingerprints.
//!
//! ## Supported Fingerprints
//! - **Exact** - CRC-32 of the raw file bytes, compared by equality
//! - **Perceptual** - 1024-bit block-mean hash, compared by Hamming distance
//! - **Histogram** - 3x30x30 spatial color sums, compared by cosine distance
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for 1.5-2x faster JPEG decoding
//! - Uses `fast_image_resize` for SIMD-accelerated grayscale resizing
//!
//! ## Example
//! ```rust,ignore
//! use image_cluster::core::fingerprint::{BlockMeanHasher, Fingerprint, ImageFingerprinter};
//!
//! let hasher = BlockMeanHasher::new();
//! let a = hasher.fingerprint_file(&path_a)?;
//! let b = hasher.fingerprint_file(&path_b)?;
//! println!("{} bits differ", a.distance(&b));
//! ```

mod algorithms;
pub mod fast_decode;
pub mod fast_resize;
mod traits;

pub use algorithms::*;
pub use traits::{Fingerprint, ImageFingerprinter};
