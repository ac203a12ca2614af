//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the crop engine and compositor (which decide what region
//! to sample and at which size) and the [`backend`](super::backend) (which
//! does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing the geometry.
//!
//! ## Types
//!
//! - [`Filter`]: resampling filter, configurable from `config.toml`.
//! - [`Compression`]: PNG compression effort. Never affects pixels.
//! - [`ResampleParams`]: source region and output size of one resample.

use super::calculations::PixelRect;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Resampling filter used when scaling a region to its output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    #[default]
    Lanczos3,
}

impl Filter {
    pub fn to_filter_type(self) -> FilterType {
        match self {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// PNG compression effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    Fast,
    #[default]
    Default,
    Best,
}

/// Parameters for a region resample: crop `region` out of the source, then
/// scale it to exactly `width` x `height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleParams {
    pub region: PixelRect,
    pub width: u32,
    pub height: u32,
    pub filter: Filter,
}
