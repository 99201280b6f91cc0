//! # Pipeline Module
//!
//! Drives a strategy over a flat list of image paths.
//!
//! ## Pipeline Stages
//! 1. **Append** - Fingerprint every image into the strategy's table
//! 2. **Cluster** - Group the table into clusters of similar images
//!
//! ## Parallelism
//! Uses rayon for parallel fingerprinting across multiple CPU cores.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
