//! Interactive illustration cropping.
//!
//! A crop session is an explicit [`CropSelection`] value owned by the caller:
//!
//! ```text
//! begin_crop(bytes)          → CropSelection   (decode, fit into viewport)
//! update_selection(sel, Δ)   → CropSelection   (pan / zoom, clamped)
//! confirm_crop(sel)          → RasterImage     (slot-sized bitmap)
//! cancel_crop(sel)                             (drops the decoded source)
//! ```
//!
//! The crop rectangle lives in source-pixel coordinates and always keeps the
//! configured aspect ratio. The overlay shows the source fitted ("contain")
//! into a fixed viewport, so pan deltas arrive in display units and are
//! divided by the display scale. On confirm the display rectangle is mapped
//! back with `(displayRect - displayOrigin) / displayScale`, snapped to whole
//! pixels and resampled to the slot size.
//!
//! Nothing here touches a [`CardModel`](crate::card::CardModel); callers store
//! the confirmed bitmap themselves, so a failed confirm leaves the card's
//! previous illustration in place.

use crate::card::Illustration;
use crate::config::DesignerConfig;
use crate::imaging::calculations::{
    clamp_rect, display_to_source, fit_viewport, max_aspect_rect, snap_to_pixels,
    source_to_display, zoom_rect,
};
use crate::imaging::{
    BackendError, Compression, Dimensions, Filter, ImageBackend, RasterImage, Rect,
    ResampleParams, Viewport, supported_input_formats,
};
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),
    #[error("Crop region {width}x{height} is smaller than one pixel")]
    DegenerateCrop { width: u32, height: u32 },
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
}

/// Crop settings, taken from the `[illustration]` config section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropConfig {
    pub aspect_ratio: (u32, u32),
    /// Pixel size of the confirmed bitmap.
    pub slot: (u32, u32),
    pub zoom_max: f64,
    pub viewport: (u32, u32),
    pub filter: Filter,
}

impl CropConfig {
    pub fn from_designer_config(config: &DesignerConfig) -> Self {
        let ill = &config.illustration;
        Self {
            aspect_ratio: (ill.aspect_ratio[0], ill.aspect_ratio[1]),
            slot: ill.slot_dimensions(),
            zoom_max: ill.zoom_max,
            viewport: ill.viewport_dimensions(),
            filter: ill.filter,
        }
    }

    /// Width / height.
    pub fn aspect(&self) -> f64 {
        self.aspect_ratio.0 as f64 / self.aspect_ratio.1 as f64
    }
}

impl Default for CropConfig {
    fn default() -> Self {
        Self::from_designer_config(&DesignerConfig::default())
    }
}

/// Transient crop state. Never persisted.
pub struct CropSelection {
    source: DynamicImage,
    /// The zoom-1 rectangle; zoomed rectangles are this size divided by zoom.
    base: Rect,
    rect: Rect,
    zoom: f64,
    viewport: Viewport,
    config: CropConfig,
}

impl CropSelection {
    /// Crop rectangle in source pixels.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn source_dimensions(&self) -> Dimensions {
        Dimensions::from(&self.source)
    }

    fn bounds(&self) -> (u32, u32) {
        (self.source.width(), self.source.height())
    }

    /// The crop rectangle as drawn on the overlay, in display units.
    pub fn display_rect(&self) -> Rect {
        source_to_display(self.rect, self.viewport)
    }
}

impl std::fmt::Debug for CropSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropSelection")
            .field("source", &self.source_dimensions())
            .field("rect", &self.rect)
            .field("zoom", &self.zoom)
            .field("viewport", &self.viewport)
            .finish()
    }
}

/// A pan and/or zoom gesture. Absent or non-finite values are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionUpdate {
    /// Display-unit delta.
    pub pan: Option<(f64, f64)>,
    /// Absolute zoom factor, clamped to `[1.0, zoom_max]`.
    pub zoom: Option<f64>,
}

impl SelectionUpdate {
    pub fn pan(dx: f64, dy: f64) -> Self {
        Self {
            pan: Some((dx, dy)),
            zoom: None,
        }
    }

    pub fn zoom(zoom: f64) -> Self {
        Self {
            pan: None,
            zoom: Some(zoom),
        }
    }
}

/// Decode `bytes` and open a crop session at zoom 1 with the largest
/// centered rectangle of the configured aspect.
pub fn begin_crop(
    backend: &impl ImageBackend,
    bytes: &[u8],
    config: &CropConfig,
) -> Result<CropSelection, CropError> {
    let source = backend
        .decode(bytes)
        .map_err(|e| {
            CropError::UnsupportedMedia(format!(
                "{e} (supported: {})",
                supported_input_formats().join(", ")
            ))
        })?;
    let dims = Dimensions::from(&source);
    if dims.width == 0 || dims.height == 0 {
        return Err(CropError::UnsupportedMedia("image has no pixels".into()));
    }

    let bounds = (dims.width, dims.height);
    let base = max_aspect_rect(bounds, config.aspect());
    let viewport = fit_viewport(bounds, config.viewport);
    tracing::debug!(
        width = dims.width,
        height = dims.height,
        scale = viewport.scale,
        "crop session started"
    );

    Ok(CropSelection {
        source,
        base,
        rect: base,
        zoom: 1.0,
        viewport,
        config: *config,
    })
}

/// Apply a pan/zoom gesture. The rectangle keeps its aspect and never leaves
/// the source bounds.
pub fn update_selection(mut selection: CropSelection, update: SelectionUpdate) -> CropSelection {
    let bounds = selection.bounds();
    let mut rect = selection.rect;

    if let Some((dx, dy)) = update.pan.filter(|(dx, dy)| dx.is_finite() && dy.is_finite()) {
        let scale = selection.viewport.scale;
        rect.x += dx / scale;
        rect.y += dy / scale;
    }

    if let Some(zoom) = update.zoom.filter(|z| z.is_finite()) {
        let zoom = zoom.clamp(1.0, selection.config.zoom_max.max(1.0));
        rect = zoom_rect(selection.base, rect.center(), zoom);
        selection.zoom = zoom;
    }

    selection.rect = clamp_rect(rect, bounds);
    selection
}

/// Work out the exact source region and output size a confirm would use.
pub fn plan_confirm(selection: &CropSelection) -> Result<ResampleParams, CropError> {
    let source_rect = display_to_source(selection.display_rect(), selection.viewport);
    let region = snap_to_pixels(source_rect, selection.bounds());
    if region.is_degenerate() {
        return Err(CropError::DegenerateCrop {
            width: region.width,
            height: region.height,
        });
    }

    let (width, height) = selection.config.slot;
    Ok(ResampleParams {
        region,
        width,
        height,
        filter: selection.config.filter,
    })
}

/// Resample the selected region into a slot-sized bitmap.
///
/// Deterministic: an unchanged selection always yields identical pixels.
pub fn confirm_crop(
    backend: &impl ImageBackend,
    selection: &CropSelection,
) -> Result<RasterImage, CropError> {
    let params = plan_confirm(selection)?;
    tracing::debug!(
        x = params.region.x,
        y = params.region.y,
        width = params.region.width,
        height = params.region.height,
        "confirming crop"
    );
    Ok(backend.resample(&selection.source, &params)?)
}

/// Encode a confirmed crop as the card's illustration.
pub fn encode_illustration(
    backend: &impl ImageBackend,
    raster: &RasterImage,
    compression: Compression,
) -> Result<Illustration, CropError> {
    Ok(Illustration::from_png(backend.encode_png(raster, compression)?))
}

/// End a session without producing anything.
pub fn cancel_crop(selection: CropSelection) {
    tracing::debug!(source = ?selection.source_dimensions(), "crop cancelled");
    drop(selection);
}
