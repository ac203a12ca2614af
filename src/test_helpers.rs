//! Shared test utilities for the card-designer test suite.
//!
//! Synthetic images are generated in memory, so no fixture files are needed.
//! Card builders cover one card of each type.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let card = with_solid_illustration(creep_card(), [200, 40, 40, 255]);
//! let artifact = Compositor::new(&RustBackend::new(), &DesignerConfig::default()).render(&card);
//! assert_pixel(artifact.image(), 150, 200, [200, 40, 40, 255]);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};

use crate::card::{CardColor, CardKind, CardModel, Illustration};

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

/// A horizontal/vertical color gradient encoded as PNG.
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// The same gradient encoded as JPEG.
pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A single-color PNG, handy for checking where the illustration lands.
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

// =========================================================================
// Cards
// =========================================================================

/// The default card: Axe, Red Hero, 7/11.
pub fn axe_hero() -> CardModel {
    CardModel::default()
}

pub fn creep_card() -> CardModel {
    CardModel {
        id: 3,
        name: "Mud Golem".to_string(),
        color: CardColor::Green,
        description: "Splits into two smaller golems when it dies.".to_string(),
        kind: CardKind::Creep {
            attack: 3,
            health: 5,
            mana_cost: 4,
        },
        ..CardModel::default()
    }
}

pub fn spell_card() -> CardModel {
    CardModel {
        id: 40,
        name: "Arcane Bolt".to_string(),
        color: CardColor::Blue,
        description: "Deal 4 damage to a unit.".to_string(),
        kind: CardKind::Spell { mana_cost: 2 },
        ..CardModel::default()
    }
}

/// Attach a solid-color illustration the size of the default slot.
pub fn with_solid_illustration(mut card: CardModel, rgba: [u8; 4]) -> CardModel {
    card.set_illustration(Illustration::from_png(solid_png(240, 320, rgba)));
    card
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Assert one pixel of a bitmap. Panics with the actual value on mismatch.
pub fn assert_pixel(image: &RgbaImage, x: u32, y: u32, expected: [u8; 4]) {
    let actual = image.get_pixel(x, y).0;
    assert_eq!(
        actual, expected,
        "pixel ({x}, {y}) is {actual:?}, expected {expected:?}"
    );
}
