//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, WebP, GIF, BMP) | `image::load_from_memory` (format sniffed from bytes) |
//! | Resample | `DynamicImage::crop_imm` + `resize_exact` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (adaptive filtering) |

use super::backend::{BackendError, ImageBackend};
use super::params::{Compression, ResampleParams};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};
use std::sync::LazyLock;

/// Formats whose decoders are compiled in via the crate features.
const MEDIA_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_FORMATS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    MEDIA_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(name, _)| *name)
        .collect()
});

/// Returns the names of image formats that have working decoders compiled in.
pub fn supported_input_formats() -> &'static [&'static str] {
    &SUPPORTED_FORMATS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn compression_type(compression: Compression) -> CompressionType {
    match compression {
        Compression::Fast => CompressionType::Fast,
        Compression::Default => CompressionType::Default,
        Compression::Best => CompressionType::Best,
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        if bytes.is_empty() {
            return Err(BackendError::Decode("empty input".into()));
        }
        let format = image::guess_format(bytes)
            .map_err(|e| BackendError::Decode(format!("unrecognized format: {e}")))?;
        image::load_from_memory_with_format(bytes, format)
            .map_err(|e| BackendError::Decode(format!("failed to decode {format:?}: {e}")))
    }

    fn resample(
        &self,
        source: &DynamicImage,
        params: &ResampleParams,
    ) -> Result<RgbaImage, BackendError> {
        let region = params.region;
        if region.x + region.width > source.width() || region.y + region.height > source.height()
        {
            return Err(BackendError::ProcessingFailed(format!(
                "region {}x{}+{}+{} exceeds source {}x{}",
                region.width,
                region.height,
                region.x,
                region.y,
                source.width(),
                source.height()
            )));
        }
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ProcessingFailed(
                "output size must be non-zero".into(),
            ));
        }

        let cropped = source.crop_imm(region.x, region.y, region.width, region.height);
        let resized = cropped.resize_exact(
            params.width,
            params.height,
            params.filter.to_filter_type(),
        );
        Ok(resized.to_rgba8())
    }

    fn encode_png(
        &self,
        image: &RgbaImage,
        compression: Compression,
    ) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buf, compression_type(compression), PngFilter::Adaptive);
        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Filter;
    use crate::imaging::calculations::PixelRect;
    use crate::test_helpers::{gradient_png, gradient_jpeg};

    #[test]
    fn supported_formats_match_decodable_formats() {
        let formats = supported_input_formats();
        for expected in &["png", "jpeg", "webp", "gif", "bmp"] {
            assert!(
                formats.contains(expected),
                "expected {expected} in supported formats"
            );
        }
    }

    #[test]
    fn decode_synthetic_png() {
        let backend = RustBackend::new();
        let img = backend.decode(&gradient_png(200, 150)).unwrap();
        assert_eq!((img.width(), img.height()), (200, 150));
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let backend = RustBackend::new();
        let img = backend.decode(&gradient_jpeg(64, 48)).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[test]
    fn decode_text_is_error() {
        let backend = RustBackend::new();
        let result = backend.decode(b"definitely not an image");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_empty_is_error() {
        let backend = RustBackend::new();
        assert!(matches!(backend.decode(&[]), Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_truncated_png_is_error() {
        let backend = RustBackend::new();
        let png = gradient_png(50, 50);
        assert!(backend.decode(&png[..png.len() / 2]).is_err());
    }

    #[test]
    fn resample_produces_exact_output_size() {
        let backend = RustBackend::new();
        let source = backend.decode(&gradient_png(400, 300)).unwrap();
        let out = backend
            .resample(&source, &ResampleParams {
                region: PixelRect {
                    x: 50,
                    y: 0,
                    width: 225,
                    height: 300,
                },
                width: 240,
                height: 320,
                filter: Filter::Lanczos3,
            })
            .unwrap();
        assert_eq!(out.dimensions(), (240, 320));
    }

    #[test]
    fn resample_out_of_bounds_region_errors() {
        let backend = RustBackend::new();
        let source = DynamicImage::new_rgba8(10, 10);
        let result = backend.resample(&source, &ResampleParams {
            region: PixelRect {
                x: 5,
                y: 5,
                width: 10,
                height: 10,
            },
            width: 3,
            height: 4,
            filter: Filter::Nearest,
        });
        assert!(result.is_err());
    }

    #[test]
    fn encode_png_round_trips_pixels() {
        let backend = RustBackend::new();
        let img = RgbaImage::from_fn(17, 9, |x, y| image::Rgba([x as u8 * 10, y as u8 * 20, 7, 255]));
        let png = backend.encode_png(&img, Compression::Best).unwrap();
        let decoded = backend.decode(&png).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn encode_png_is_deterministic() {
        let backend = RustBackend::new();
        let img = RgbaImage::from_fn(32, 32, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
        let a = backend.encode_png(&img, Compression::Default).unwrap();
        let b = backend.encode_png(&img, Compression::Default).unwrap();
        assert_eq!(a, b);
    }
}
