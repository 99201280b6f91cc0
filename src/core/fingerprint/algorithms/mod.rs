//! Fingerprint algorithm implementations.

mod block_mean;
mod crc;
mod histogram;

pub use block_mean::{
    bit_count, BlockMeanHasher, PerceptualFingerprint, BLOCK_COUNT, FINGERPRINT_WORDS, HASH_BYTES,
};
pub use crc::{crc32, ContentHasher, ExactFingerprint};
pub use histogram::{
    HistogramFingerprint, HistogramHasher, CHANNELS, GRID_SIZE, HISTOGRAM_LEN, MAX_COSINE_DISTANCE,
};
