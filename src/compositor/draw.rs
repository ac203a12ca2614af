//! Raster primitives for card composition.
//!
//! Everything draws with source-over blending and no anti-aliasing, so a
//! render is a pure function of its inputs. Shapes are clipped to the image.
//! Text uses the 8x8 `font8x8` glyphs scaled by an integer factor.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};

/// Glyph cell size at scale 1.
pub const GLYPH: u32 = 8;

/// Source-over `src` onto `dst`.
pub fn blend(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = u32::from(src[3]);
    if a == 0 {
        return dst;
    }
    if a == 255 {
        return src;
    }
    let inv = 255 - a;
    let mix = |d: u8, s: u8| ((u32::from(d) * inv + u32::from(s) * a + 127) / 255) as u8;
    let out_a = (u32::from(dst[3]) * inv + 255 * a + 127) / 255;
    Rgba([
        mix(dst[0], src[0]),
        mix(dst[1], src[1]),
        mix(dst[2], src[2]),
        out_a as u8,
    ])
}

fn blend_at(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    *dst = blend(*dst, color);
}

pub fn fill_rect(img: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width as i32).min(img.width() as i32);
    let y1 = (y + height as i32).min(img.height() as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            blend_at(img, px, py, color);
        }
    }
}

/// Filled circle; a pixel is inside when its center is within `radius`.
pub fn fill_disc(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
    let min_x = (cx - radius).floor() as i32;
    let max_x = (cx + radius).ceil() as i32;
    let min_y = (cy - radius).floor() as i32;
    let max_y = (cy + radius).ceil() as i32;
    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                blend_at(img, x, y, color);
            }
        }
    }
}

fn edge(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// Filled triangle, either winding.
pub fn fill_triangle(
    img: &mut RgbaImage,
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    color: Rgba<u8>,
) {
    let min_x = a.0.min(b.0).min(c.0).floor() as i32;
    let max_x = a.0.max(b.0).max(c.0).ceil() as i32;
    let min_y = a.1.min(b.1).min(c.1).floor() as i32;
    let max_y = a.1.max(b.1).max(c.1).ceil() as i32;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (f64::from(x) + 0.5, f64::from(y) + 0.5);
            let e0 = edge(a, b, p);
            let e1 = edge(b, c, p);
            let e2 = edge(c, a, p);
            let inside = (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0)
                || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0);
            if inside {
                blend_at(img, x, y, color);
            }
        }
    }
}

/// Where a pixel sits relative to a rounded rectangle's outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Outside,
    /// Within `border` pixels of the outline.
    Border,
    Inside,
}

/// Classify pixel `(x, y)` against the rounded rectangle `(0, 0, width,
/// height)` with corner `radius`.
pub fn rounded_rect_coverage(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    radius: u32,
    border: u32,
) -> Coverage {
    let (w, h) = (f64::from(width), f64::from(height));
    let r = f64::from(radius.min(width / 2).min(height / 2));
    let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);

    // Distance from the outline, measured inward.
    let depth = if r > 0.0 && (px < r || px > w - r) && (py < r || py > h - r) {
        let cx = if px < r { r } else { w - r };
        let cy = if py < r { r } else { h - r };
        r - ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
    } else {
        px.min(w - px).min(py).min(h - py)
    };

    if depth < 0.0 {
        Coverage::Outside
    } else if depth < f64::from(border) {
        Coverage::Border
    } else {
        Coverage::Inside
    }
}

/// Pixel width of `text` at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH * scale
}

/// Draw a single line of text with its top-left corner at `(x, y)`.
/// Characters outside the basic Latin set render as `?`.
pub fn draw_text(img: &mut RgbaImage, x: i32, y: i32, text: &str, scale: u32, color: Rgba<u8>) {
    let scale = scale.max(1) as i32;
    let mut cursor = x;
    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH as i32 {
                    if (bits >> col) & 1 == 0 {
                        continue;
                    }
                    let px = cursor + col * scale;
                    let py = y + row as i32 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            blend_at(img, px + sx, py + sy, color);
                        }
                    }
                }
            }
        }
        cursor += GLYPH as i32 * scale;
    }
}

/// Draw `text` horizontally centered on `center_x`.
pub fn draw_text_centered(
    img: &mut RgbaImage,
    center_x: i32,
    y: i32,
    text: &str,
    scale: u32,
    color: Rgba<u8>,
) {
    let width = text_width(text, scale) as i32;
    draw_text(img, center_x - width / 2, y, text, scale, color);
}

/// Greedy word wrap to at most `max_chars` per line. Words longer than a
/// line are split. Explicit newlines are kept.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Crossed-blade attack icon fitting a `size` box at `(x, y)`.
pub fn draw_sword_icon(img: &mut RgbaImage, x: i32, y: i32, size: u32, color: Rgba<u8>) {
    let s = f64::from(size);
    let (x, y) = (f64::from(x), f64::from(y));
    // Blade
    fill_triangle(img, (x + s * 0.95, y), (x + s * 0.3, y + s * 0.55), (x + s * 0.45, y + s * 0.7), color);
    fill_triangle(img, (x + s * 0.95, y), (x + s * 0.45, y + s * 0.7), (x + s, y + s * 0.05), color);
    // Guard
    fill_triangle(img, (x + s * 0.15, y + s * 0.5), (x + s * 0.5, y + s * 0.85), (x + s * 0.42, y + s * 0.9), color);
    fill_triangle(img, (x + s * 0.15, y + s * 0.5), (x + s * 0.1, y + s * 0.58), (x + s * 0.42, y + s * 0.9), color);
    // Hilt
    fill_disc(img, x + s * 0.15, y + s * 0.85, s * 0.14, color);
}

/// Heart health icon fitting a `size` box at `(x, y)`.
pub fn draw_heart_icon(img: &mut RgbaImage, x: i32, y: i32, size: u32, color: Rgba<u8>) {
    let s = f64::from(size);
    let (x, y) = (f64::from(x), f64::from(y));
    let r = s * 0.26;
    fill_disc(img, x + s * 0.28, y + s * 0.32, r, color);
    fill_disc(img, x + s * 0.72, y + s * 0.32, r, color);
    fill_triangle(img, (x + s * 0.03, y + s * 0.42), (x + s * 0.97, y + s * 0.42), (x + s * 0.5, y + s * 0.95), color);
}
