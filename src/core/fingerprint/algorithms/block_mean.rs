//! Block-mean hash (mode 1) implementation.
//!
//! Block-mean hashing works by:
//! 1. Converting to grayscale and resizing to 256x256
//! 2. Sliding a 16x16 block over the image with a step of 8 pixels,
//!    giving 31x31 = 961 overlapping blocks
//! 3. Setting one bit per block: 1 if the block mean is at least the
//!    mean of the whole image, 0 otherwise
//!
//! The 961 bits are packed LSB-first into 121 bytes, then repacked into
//! 16 little-endian `u64` words for fast Hamming distance.

use super::super::fast_resize::resize_to_grayscale;
use super::super::traits::{Fingerprint, ImageFingerprinter};
use crate::error::FingerprintError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

const RESIZED_SIZE: u32 = 256;
const BLOCK_SIZE: usize = 16;
const BLOCK_STEP: usize = BLOCK_SIZE / 2;
const BLOCKS_PER_SIDE: usize = (RESIZED_SIZE as usize - BLOCK_SIZE) / BLOCK_STEP + 1;

/// Number of bits in a block-mean hash
pub const BLOCK_COUNT: usize = BLOCKS_PER_SIDE * BLOCKS_PER_SIDE;
/// Length of the raw hash in bytes
pub const HASH_BYTES: usize = BLOCK_COUNT.div_ceil(8);
/// Length of the repacked fingerprint in 64-bit words
pub const FINGERPRINT_WORDS: usize = 16;

/// Population count using the bit-parallel (SWAR) reduction.
pub fn bit_count(value: u64) -> u32 {
    let mut v = value - ((value >> 1) & 0x5555_5555_5555_5555);
    v = (v & 0x3333_3333_3333_3333) + ((v >> 2) & 0x3333_3333_3333_3333);
    v = (v + (v >> 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    (v.wrapping_mul(0x0101_0101_0101_0101) >> 56) as u32
}

/// 1024-bit perceptual fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerceptualFingerprint([u64; FINGERPRINT_WORDS]);

impl PerceptualFingerprint {
    pub fn from_words(words: [u64; FINGERPRINT_WORDS]) -> Self {
        Self(words)
    }

    /// Repack a raw 121-byte hash: words 0..15 are 8-byte little-endian
    /// groups, word 15 is the single trailing byte.
    pub fn from_hash_bytes(bytes: &[u8; HASH_BYTES]) -> Self {
        let mut words = [0u64; FINGERPRINT_WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut group = [0u8; 8];
            group.copy_from_slice(chunk);
            *word = u64::from_le_bytes(group);
        }
        words[FINGERPRINT_WORDS - 1] = bytes[HASH_BYTES - 1] as u64;
        Self(words)
    }

    pub fn words(&self) -> &[u64; FINGERPRINT_WORDS] {
        &self.0
    }

    /// Number of differing bits
    pub fn hamming(&self, other: &Self) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| bit_count(a ^ b))
            .sum()
    }
}

impl Fingerprint for PerceptualFingerprint {
    fn distance(&self, other: &Self) -> f64 {
        self.hamming(other) as f64
    }
}

/// Block-mean hash (mode 1) implementation
#[derive(Debug, Clone, Default)]
pub struct BlockMeanHasher;

impl BlockMeanHasher {
    pub fn new() -> Self {
        Self
    }

    /// Compute the raw 121-byte hash
    pub fn hash_bytes(&self, image: &DynamicImage) -> Result<[u8; HASH_BYTES], FingerprintError> {
        let gray = resize_to_grayscale(image, RESIZED_SIZE, RESIZED_SIZE)?;
        let side = RESIZED_SIZE as usize;
        let pixels = gray.as_raw();

        let total: u64 = pixels.iter().map(|&p| p as u64).sum();
        let image_mean = total as f64 / pixels.len() as f64;
        let block_area = (BLOCK_SIZE * BLOCK_SIZE) as f64;

        let mut bytes = [0u8; HASH_BYTES];
        let mut index = 0;

        for block_y in 0..BLOCKS_PER_SIDE {
            for block_x in 0..BLOCKS_PER_SIDE {
                let top = block_y * BLOCK_STEP;
                let left = block_x * BLOCK_STEP;

                let block_sum: u32 = (top..top + BLOCK_SIZE)
                    .map(|row| {
                        let start = row * side + left;
                        pixels[start..start + BLOCK_SIZE]
                            .iter()
                            .map(|&p| p as u32)
                            .sum::<u32>()
                    })
                    .sum();

                if block_sum as f64 / block_area >= image_mean {
                    bytes[index / 8] |= 1 << (index % 8);
                }
                index += 1;
            }
        }

        Ok(bytes)
    }
}

impl ImageFingerprinter for BlockMeanHasher {
    type Output = PerceptualFingerprint;

    fn fingerprint_image(
        &self,
        image: &DynamicImage,
    ) -> Result<PerceptualFingerprint, FingerprintError> {
        let bytes = self.hash_bytes(image)?;
        Ok(PerceptualFingerprint::from_hash_bytes(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_solid_image(value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(100, 100, Rgb([value, value, value])))
    }

    fn create_left_to_right_gradient() -> DynamicImage {
        let img = ImageBuffer::from_fn(120, 90, |x, _| {
            let brightness = (x * 255 / 119) as u8;
            Rgb([brightness, brightness, brightness])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn create_right_to_left_gradient() -> DynamicImage {
        let img = ImageBuffer::from_fn(120, 90, |x, _| {
            let brightness = ((119 - x) * 255 / 119) as u8;
            Rgb([brightness, brightness, brightness])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn layout_constants() {
        assert_eq!(BLOCKS_PER_SIDE, 31);
        assert_eq!(BLOCK_COUNT, 961);
        assert_eq!(HASH_BYTES, 121);
    }

    #[test]
    fn bit_count_matches_count_ones() {
        for value in [
            0u64,
            1,
            u64::MAX,
            0x8000_0000_0000_0000,
            0xDEAD_BEEF_CAFE_BABE,
            0x5555_5555_5555_5555,
            0x0123_4567_89AB_CDEF,
        ] {
            assert_eq!(bit_count(value), value.count_ones(), "value {:#x}", value);
        }
    }

    #[test]
    fn repack_uses_little_endian_groups() {
        let mut bytes = [0u8; HASH_BYTES];
        bytes[0] = 0x01;
        bytes[7] = 0x80;
        bytes[8] = 0xFF;
        bytes[120] = 0x01;

        let fingerprint = PerceptualFingerprint::from_hash_bytes(&bytes);
        let words = fingerprint.words();
        assert_eq!(words[0], 0x8000_0000_0000_0001);
        assert_eq!(words[1], 0xFF);
        assert_eq!(words[15], 1);
    }

    #[test]
    fn hamming_distance() {
        let a = PerceptualFingerprint::from_words([0; FINGERPRINT_WORDS]);
        let mut words = [0; FINGERPRINT_WORDS];
        words[0] = 0b1011;
        words[15] = u64::MAX;
        let b = PerceptualFingerprint::from_words(words);

        assert_eq!(a.hamming(&b), 67);
        assert_eq!(b.hamming(&a), 67);
        assert_eq!(a.distance(&a), 0.0);
        assert_eq!(b.distance(&b), 0.0);
    }

    #[test]
    fn identical_images_produce_identical_hash() {
        let hasher = BlockMeanHasher::new();
        let image = create_left_to_right_gradient();

        let hash1 = hasher.fingerprint_image(&image).unwrap();
        let hash2 = hasher.fingerprint_image(&image).unwrap();

        assert_eq!(hash1.distance(&hash2), 0.0);
    }

    #[test]
    fn solid_image_sets_every_bit() {
        let hasher = BlockMeanHasher::new();
        let bytes = hasher.hash_bytes(&create_solid_image(128)).unwrap();

        assert!(bytes[..120].iter().all(|&b| b == 0xFF));
        assert_eq!(bytes[120], 0x01);
    }

    #[test]
    fn mirrored_gradients_are_far_apart() {
        let hasher = BlockMeanHasher::new();

        let hash1 = hasher.fingerprint_image(&create_left_to_right_gradient()).unwrap();
        let hash2 = hasher.fingerprint_image(&create_right_to_left_gradient()).unwrap();

        assert!(hash1.hamming(&hash2) > 800);
    }

    #[test]
    fn resized_copy_is_close() {
        let hasher = BlockMeanHasher::new();
        let original = create_left_to_right_gradient();
        let smaller = original.resize_exact(60, 45, image::imageops::FilterType::Triangle);

        let hash1 = hasher.fingerprint_image(&original).unwrap();
        let hash2 = hasher.fingerprint_image(&smaller).unwrap();

        assert!(hash1.hamming(&hash2) < 100);
    }
}
