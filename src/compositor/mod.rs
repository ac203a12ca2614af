//! Card rendering.
//!
//! [`Compositor::render`] turns a [`CardModel`] into a fixed-size RGBA
//! [`VisualArtifact`]. Layers, back to front:
//!
//! ```text
//! white body
//! illustration        (cover-scaled into its frame, clipped to the canvas)
//! header band         (card color, name, optional mana badge)
//! type label          (grey, top of the body)
//! bottom container    (translucent backdrop + wrapped description)
//! stats footer        (card color, attack / health icons and values)
//! rounded mask        (transparent corners, 1px whitesmoke border)
//! ```
//!
//! The same artifact backs the preview and every export: a
//! [`PreviewSurface`] keeps the last render and export captures exactly that
//! value, so the exported PNG is pixel-identical to what was shown.

mod draw;
pub mod layout;

use crate::card::{CardModel, CardType, IllustrationFrame};
use crate::config::DesignerConfig;
use crate::imaging::calculations::{max_aspect_rect, snap_to_pixels, visible_region};
use crate::imaging::{ImageBackend, RasterImage, ResampleParams};
use image::{Rgba, imageops};
use layout::{LayoutRules, METRICS, ManaBadge, rules_for};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use draw::wrap_text;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const WHITESMOKE: Rgba<u8> = Rgba([245, 245, 245, 255]);
const LABEL_GREY: Rgba<u8> = Rgba([0x7f, 0x8c, 0x8d, 0xff]);
const TEXT_DARK: Rgba<u8> = Rgba([0x2c, 0x3e, 0x50, 0xff]);
const MANA_BLUE: Rgba<u8> = Rgba([0x29, 0x80, 0xb9, 0xff]);
const BACKDROP: Rgba<u8> = Rgba([255, 255, 255, 140]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaptureError {
    #[error("nothing has been rendered yet")]
    NotRendered,
    #[error("rendered artifact is empty ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },
}

/// A rendered card.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualArtifact {
    image: RasterImage,
    card_type: CardType,
}

impl VisualArtifact {
    pub fn new(image: RasterImage, card_type: CardType) -> Self {
        Self { image, card_type }
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// SHA-256 over the dimensions and raw pixels, as hex.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.image.width().to_le_bytes());
        hasher.update(self.image.height().to_le_bytes());
        hasher.update(self.image.as_raw());
        format!("{:x}", hasher.finalize())
    }
}

/// Renders cards using one configuration and imaging backend.
pub struct Compositor<'a, B: ImageBackend> {
    backend: &'a B,
    config: &'a DesignerConfig,
}

impl<'a, B: ImageBackend> Compositor<'a, B> {
    pub fn new(backend: &'a B, config: &'a DesignerConfig) -> Self {
        Self { backend, config }
    }

    /// The frame the illustration will occupy for `card`, clamped to the
    /// canvas. `None` when the frame lies entirely off-canvas or is empty.
    pub fn illustration_frame(&self, card: &CardModel) -> Option<IllustrationFrame> {
        let canvas = &self.config.canvas;
        let frame = card.illustration_frame.unwrap_or_else(|| {
            rules_for(card.card_type())
                .default_frame(canvas, self.config.illustration.slot_dimensions())
        });
        let visible = visible_region(
            frame.x,
            frame.y,
            frame.width,
            frame.height,
            (canvas.width, canvas.height),
        )?;
        Some(IllustrationFrame {
            x: visible.x as i32,
            y: visible.y as i32,
            width: visible.width,
            height: visible.height,
        })
    }

    /// Lay out and rasterize `card`. Never fails: an illustration that
    /// cannot be decoded is left out.
    pub fn render(&self, card: &CardModel) -> VisualArtifact {
        let canvas = &self.config.canvas;
        let rules = rules_for(card.card_type());
        let color = self.config.colors.resolve(&card.color);
        tracing::debug!(
            card_type = %card.card_type(),
            color = %card.color,
            "rendering card"
        );

        let mut img = RasterImage::from_pixel(canvas.width, canvas.height, WHITE);

        self.draw_illustration(&mut img, card);
        self.draw_header(&mut img, card, &rules, color);

        draw::draw_text_centered(
            &mut img,
            (canvas.width / 2) as i32,
            (canvas.header_height + METRICS.label_top) as i32,
            card.card_type().label(),
            1,
            LABEL_GREY,
        );

        self.draw_bottom(&mut img, card, &rules, color);
        self.apply_mask(&mut img);

        VisualArtifact::new(img, card.card_type())
    }

    fn draw_illustration(&self, img: &mut RasterImage, card: &CardModel) {
        let Some(illustration) = card.illustration.as_ref().filter(|i| !i.is_empty()) else {
            return;
        };
        let Some(frame) = self.illustration_frame(card) else {
            return;
        };

        let source = match self.backend.decode(illustration.as_bytes()) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(card = %card.name, error = %e, "skipping undecodable illustration");
                return;
            }
        };

        // Cover: sample the largest centered region with the frame's aspect.
        let bounds = (source.width(), source.height());
        let aspect = frame.width as f64 / frame.height as f64;
        let region = snap_to_pixels(max_aspect_rect(bounds, aspect), bounds);
        if region.is_degenerate() {
            tracing::warn!(card = %card.name, "illustration too small to place");
            return;
        }

        let params = ResampleParams {
            region,
            width: frame.width,
            height: frame.height,
            filter: self.config.illustration.filter,
        };
        match self.backend.resample(&source, &params) {
            Ok(layer) => imageops::overlay(img, &layer, frame.x as i64, frame.y as i64),
            Err(e) => {
                tracing::warn!(card = %card.name, error = %e, "skipping illustration")
            }
        }
    }

    fn draw_header(
        &self,
        img: &mut RasterImage,
        card: &CardModel,
        rules: &LayoutRules,
        color: Rgba<u8>,
    ) {
        let canvas = &self.config.canvas;
        let header = canvas.header_height;
        draw::fill_rect(img, 0, 0, canvas.width, header, color);

        // Keep the name clear of a badge on either side.
        let reserved = 2 * (METRICS.badge_inset + METRICS.badge_radius + 4);
        let glyph = draw::GLYPH * METRICS.name_scale;
        let max_chars = (canvas.width.saturating_sub(reserved) / glyph) as usize;
        let name: String = card.name.trim().chars().take(max_chars).collect();
        draw::draw_text_centered(
            img,
            (canvas.width / 2) as i32,
            (header / 2) as i32 - (glyph / 2) as i32,
            &name,
            METRICS.name_scale,
            WHITE,
        );

        let Some(mana) = card.kind.mana_cost() else {
            return;
        };
        let center_x = match rules.mana_badge {
            ManaBadge::None => return,
            ManaBadge::BesideName => METRICS.badge_inset,
            ManaBadge::TopRight => canvas.width.saturating_sub(METRICS.badge_inset),
        };
        draw_badge(img, center_x as f64, header as f64 / 2.0, mana);
    }

    fn draw_bottom(
        &self,
        img: &mut RasterImage,
        card: &CardModel,
        rules: &LayoutRules,
        color: Rgba<u8>,
    ) {
        let canvas = &self.config.canvas;
        let margin = METRICS.container_margin;
        let width = canvas.width.saturating_sub(2 * margin);
        let bottom = canvas.height.saturating_sub(margin);
        let top = bottom.saturating_sub(METRICS.container_height);
        let stats = if rules.stats_footer {
            card.kind.combat_stats()
        } else {
            None
        };
        let text_bottom = match stats {
            Some(_) => bottom.saturating_sub(METRICS.footer_height),
            None => bottom,
        };

        let description = card.description.trim();
        if !description.is_empty() {
            draw::fill_rect(img, margin as i32, top as i32, width, bottom - top, BACKDROP);

            let pad = METRICS.text_padding;
            let max_chars = (width.saturating_sub(2 * pad) / draw::GLYPH) as usize;
            let room = text_bottom.saturating_sub(top + 2 * pad);
            let max_lines = (room / METRICS.line_height) as usize;
            for (i, line) in wrap_text(description, max_chars)
                .iter()
                .take(max_lines)
                .enumerate()
            {
                draw::draw_text(
                    img,
                    (margin + pad) as i32,
                    (top + pad) as i32 + (i as u32 * METRICS.line_height) as i32,
                    line,
                    1,
                    TEXT_DARK,
                );
            }
        }

        if let Some((attack, health)) = stats {
            draw_stats_footer(img, margin, text_bottom, width, attack, health, color);
        }
    }

    fn apply_mask(&self, img: &mut RasterImage) {
        let canvas = &self.config.canvas;
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            match draw::rounded_rect_coverage(
                x,
                y,
                canvas.width,
                canvas.height,
                canvas.corner_radius,
                1,
            ) {
                draw::Coverage::Outside => *pixel = TRANSPARENT,
                draw::Coverage::Border => *pixel = WHITESMOKE,
                draw::Coverage::Inside => {}
            }
        }
    }
}

fn draw_badge(img: &mut RasterImage, cx: f64, cy: f64, value: u32) {
    let radius = METRICS.badge_radius as f64;
    draw::fill_disc(img, cx, cy, radius + 2.0, WHITE);
    draw::fill_disc(img, cx, cy, radius, MANA_BLUE);

    let text = value.to_string();
    let scale = if text.len() <= 2 { 2 } else { 1 };
    let half_glyph = (draw::GLYPH * scale / 2) as i32;
    draw::draw_text_centered(img, cx as i32, cy as i32 - half_glyph, &text, scale, WHITE);
}

fn draw_stats_footer(
    img: &mut RasterImage,
    x: u32,
    y: u32,
    width: u32,
    attack: u32,
    health: u32,
    color: Rgba<u8>,
) {
    let height = METRICS.footer_height;
    draw::fill_rect(img, x as i32, y as i32, width, height, color);

    let icon = 20;
    let icon_y = (y + (height - icon) / 2) as i32;
    let text_y = (y + height / 2) as i32 - draw::GLYPH as i32;
    let left = (x + 10) as i32;
    let right = (x + width - 10) as i32;

    draw::draw_sword_icon(img, left, icon_y, icon, WHITE);
    draw::draw_text(img, left + icon as i32 + 6, text_y, &attack.to_string(), 2, WHITE);

    let health_text = health.to_string();
    draw::draw_heart_icon(img, right - icon as i32, icon_y, icon, WHITE);
    let text_x = right - icon as i32 - 6 - draw::text_width(&health_text, 2) as i32;
    draw::draw_text(img, text_x, text_y, &health_text, 2, WHITE);
}

/// The last rendered card, as shown to the user.
#[derive(Debug, Default)]
pub struct PreviewSurface {
    artifact: Option<VisualArtifact>,
}

impl PreviewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render `card` and keep the result.
    pub fn refresh<B: ImageBackend>(
        &mut self,
        compositor: &Compositor<'_, B>,
        card: &CardModel,
    ) -> &VisualArtifact {
        self.artifact.insert(compositor.render(card))
    }

    /// Show an already-rendered artifact.
    pub fn mount(&mut self, artifact: VisualArtifact) {
        self.artifact = Some(artifact);
    }

    pub fn clear(&mut self) {
        self.artifact = None;
    }

    /// The artifact currently shown, for export. Fails when nothing is
    /// mounted or the artifact has no pixels.
    pub fn capture(&self) -> Result<&VisualArtifact, CaptureError> {
        let artifact = self.artifact.as_ref().ok_or(CaptureError::NotRendered)?;
        let (width, height) = artifact.dimensions();
        if width == 0 || height == 0 {
            return Err(CaptureError::ZeroSized { width, height });
        }
        Ok(artifact)
    }
}
