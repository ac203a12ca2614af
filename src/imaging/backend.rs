//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the crop engine,
//! compositor and exporter need: decode, resample, and PNG encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and built on
//! the `image` crate.

use super::params::{Compression, ResampleParams};
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Not a decodable image: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Bitmap dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<&DynamicImage> for Dimensions {
    fn from(img: &DynamicImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
        }
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all three operations so the rest of the
/// codebase is backend-agnostic. Implementations must be deterministic: the
/// same input always yields the same pixels and the same encoded bytes.
pub trait ImageBackend {
    /// Decode an in-memory image of any supported format.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Crop `params.region` from `source` and scale it to the output size.
    fn resample(
        &self,
        source: &DynamicImage,
        params: &ResampleParams,
    ) -> Result<RgbaImage, BackendError>;

    /// Encode an RGBA bitmap as PNG.
    fn encode_png(&self, image: &RgbaImage, compression: Compression)
    -> Result<Vec<u8>, BackendError>;
}
