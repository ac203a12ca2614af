//! Pure geometry for crop selection and layer placement.
//!
//! All functions here are pure and testable without any I/O or images.
//! Rectangles are axis-aligned; `Rect` uses floating-point coordinates for
//! interactive state, `PixelRect` is the whole-pixel region actually sampled.

/// Axis-aligned rectangle in floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Same size, re-centered on `center`.
    pub fn centered_on(&self, center: (f64, f64)) -> Self {
        Self {
            x: center.0 - self.width / 2.0,
            y: center.1 - self.height / 2.0,
            ..*self
        }
    }

    /// Whether the rectangle lies inside `(0, 0, bounds.0, bounds.1)`.
    pub fn is_within(&self, bounds: (u32, u32)) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= -EPS
            && self.y >= -EPS
            && self.x + self.width <= bounds.0 as f64 + EPS
            && self.y + self.height <= bounds.1 as f64 + EPS
    }
}

/// Whole-pixel region of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// A region smaller than one pixel in either direction cannot be sampled.
    pub fn is_degenerate(&self) -> bool {
        self.width < 1 || self.height < 1
    }
}

/// Placement of a source image inside the on-screen crop viewport.
///
/// `scale` is `displayedImageSize / sourceImageSize`; `origin` is where the
/// source's top-left corner lands in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: (f64, f64),
    pub scale: f64,
}

/// Calculate slot dimensions from aspect ratio and short edge size.
///
/// # Examples
/// ```
/// # use card_designer::imaging::calculate_slot_dimensions;
/// // 3:4 portrait with short edge 240px → 240x320
/// assert_eq!(calculate_slot_dimensions((3, 4), 240), (240, 320));
///
/// // 16:9 landscape with short edge 180px → 320x180
/// assert_eq!(calculate_slot_dimensions((16, 9), 180), (320, 180));
/// ```
pub fn calculate_slot_dimensions(aspect: (u32, u32), short_edge: u32) -> (u32, u32) {
    let (aspect_w, aspect_h) = aspect;

    if aspect_w <= aspect_h {
        // Portrait or square: width is the short edge
        let w = short_edge;
        let h = (w as f64 * aspect_h as f64 / aspect_w as f64).round() as u32;
        (w, h)
    } else {
        // Landscape: height is the short edge
        let h = short_edge;
        let w = (h as f64 * aspect_w as f64 / aspect_h as f64).round() as u32;
        (w, h)
    }
}

/// Fit a source image inside the viewport ("contain"), centered.
pub fn fit_viewport(source: (u32, u32), viewport: (u32, u32)) -> Viewport {
    let (src_w, src_h) = (source.0 as f64, source.1 as f64);
    let (view_w, view_h) = (viewport.0 as f64, viewport.1 as f64);

    let scale = (view_w / src_w).min(view_h / src_h);
    let origin = ((view_w - src_w * scale) / 2.0, (view_h - src_h * scale) / 2.0);
    Viewport { origin, scale }
}

/// Largest rectangle of the given aspect (width / height) that fits in the
/// source, centered.
pub fn max_aspect_rect(source: (u32, u32), aspect: f64) -> Rect {
    let (src_w, src_h) = (source.0 as f64, source.1 as f64);

    let (width, height) = if src_w / src_h > aspect {
        // Source is wider than the crop: height is the limit
        (src_h * aspect, src_h)
    } else {
        (src_w, src_w / aspect)
    };
    Rect::new((src_w - width) / 2.0, (src_h - height) / 2.0, width, height)
}

/// Resize `base` by `1 / zoom` around `center`, preserving its aspect.
pub fn zoom_rect(base: Rect, center: (f64, f64), zoom: f64) -> Rect {
    Rect::new(0.0, 0.0, base.width / zoom, base.height / zoom).centered_on(center)
}

/// Move (and if necessary shrink) a rectangle so it lies inside `bounds`.
///
/// Shrinking scales both sides by the same factor about the rectangle's
/// center, so the aspect ratio is unchanged.
pub fn clamp_rect(rect: Rect, bounds: (u32, u32)) -> Rect {
    let (bound_w, bound_h) = (bounds.0 as f64, bounds.1 as f64);

    let shrink = (bound_w / rect.width).min(bound_h / rect.height).min(1.0);
    let width = rect.width * shrink;
    let height = rect.height * shrink;
    let (cx, cy) = rect.center();

    let x = (cx - width / 2.0).clamp(0.0, bound_w - width);
    let y = (cy - height / 2.0).clamp(0.0, bound_h - height);
    Rect::new(x, y, width, height)
}

/// Map a source-pixel rectangle into display coordinates.
pub fn source_to_display(rect: Rect, viewport: Viewport) -> Rect {
    Rect::new(
        rect.x * viewport.scale + viewport.origin.0,
        rect.y * viewport.scale + viewport.origin.1,
        rect.width * viewport.scale,
        rect.height * viewport.scale,
    )
}

/// Map a display rectangle back to source pixels:
/// `sourceRect = (displayRect - displayOrigin) / displayScale`.
pub fn display_to_source(rect: Rect, viewport: Viewport) -> Rect {
    Rect::new(
        (rect.x - viewport.origin.0) / viewport.scale,
        (rect.y - viewport.origin.1) / viewport.scale,
        rect.width / viewport.scale,
        rect.height / viewport.scale,
    )
}

/// Snap a rectangle to whole source pixels, clamped to `bounds`.
///
/// Edges are rounded independently (not origin + size), so a region never
/// grows or shrinks by accumulated rounding of its width.
pub fn snap_to_pixels(rect: Rect, bounds: (u32, u32)) -> PixelRect {
    let snap = |v: f64, max: u32| -> u32 {
        if v.is_finite() {
            v.round().clamp(0.0, max as f64) as u32
        } else {
            0
        }
    };
    let x0 = snap(rect.x, bounds.0);
    let y0 = snap(rect.y, bounds.1);
    let x1 = snap(rect.x + rect.width, bounds.0);
    let y1 = snap(rect.y + rect.height, bounds.1);

    PixelRect {
        x: x0,
        y: y0,
        width: x1.saturating_sub(x0),
        height: y1.saturating_sub(y0),
    }
}

/// Intersect an integer placement with the canvas.
///
/// Returns `None` when nothing of the placement is visible.
pub fn visible_region(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    canvas: (u32, u32),
) -> Option<PixelRect> {
    let x0 = (x as i64).clamp(0, canvas.0 as i64);
    let y0 = (y as i64).clamp(0, canvas.1 as i64);
    let x1 = (x as i64 + width as i64).clamp(0, canvas.0 as i64);
    let y1 = (y as i64 + height as i64).clamp(0, canvas.1 as i64);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}
