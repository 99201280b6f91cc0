//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::FingerprintError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Image formats with a dedicated decode path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Other,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg" | "jfif") => Self::Jpeg,
            _ => Self::Other,
        }
    }
}

/// Fast image decoder that uses optimized decoders per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image from a file path using the fastest available decoder.
    ///
    /// JPEGs go through zune-jpeg first; anything it rejects, and every
    /// other format, is handed to the image crate.
    pub fn decode(path: &Path) -> Result<DynamicImage, FingerprintError> {
        match ImageFormat::from_path(path) {
            ImageFormat::Jpeg => Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path)),
            ImageFormat::Other => Self::decode_fallback(path),
        }
    }

    fn decode_jpeg(path: &Path) -> Result<DynamicImage, FingerprintError> {
        let file_bytes = fs::read(path).map_err(|e| FingerprintError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(&file_bytes, options);

        let pixels = decoder.decode().map_err(|e| FingerprintError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| FingerprintError::DecodeError {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;
        let buffer_error = |kind: &str| FingerprintError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("Failed to create {} buffer", kind),
        };

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGBA"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("Luma"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => return Self::decode_fallback(path),
        };

        Ok(image)
    }

    fn decode_fallback(path: &Path) -> Result<DynamicImage, FingerprintError> {
        image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => FingerprintError::IoError {
                path: path.to_path_buf(),
                source,
            },
            other => FingerprintError::DecodeError {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn format_detection_jpeg() {
        assert_eq!(ImageFormat::from_path(Path::new("photo.jpg")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("photo.JPEG")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("photo.jfif")), ImageFormat::Jpeg);
    }

    #[test]
    fn format_detection_other() {
        assert_eq!(ImageFormat::from_path(Path::new("image.png")), ImageFormat::Other);
        assert_eq!(ImageFormat::from_path(Path::new("image")), ImageFormat::Other);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = FastDecoder::decode(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(FingerprintError::IoError { .. })));
    }

    #[test]
    fn garbage_jpeg_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let result = FastDecoder::decode(&path);
        assert!(matches!(result, Err(FingerprintError::DecodeError { .. })));
    }

    #[test]
    fn decodes_png_through_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let image = FastDecoder::decode(&path).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }
}
