//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory_with_format` |
//! | **Crop + resample** | `crop_imm` + `resize_exact` (Lanczos3 by default) |
//! | **Encode** | `PngEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure geometry for crop rectangles and placement (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{PixelRect, Rect, Viewport, calculate_slot_dimensions};
pub use params::{Compression, Filter, ResampleParams};
pub use rust_backend::{RustBackend, supported_input_formats};

/// A decoded RGBA bitmap, as produced by the crop engine and compositor.
pub type RasterImage = image::RgbaImage;
