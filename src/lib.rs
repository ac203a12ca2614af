//! # Card Designer
//!
//! Compose a game card from structured data (name, type, stats, description,
//! an optional cropped illustration) and export it as a PNG image, a JSON
//! data file, and a ZIP bundle of both.
//!
//! # Architecture: Model → Crop → Render → Export
//!
//! ```text
//! 1. Edit      raw input   →  CardModel       (field setters, lenient coercion)
//! 2. Crop      image bytes →  illustration    (pan/zoom selection → slot bitmap)
//! 3. Render    CardModel   →  VisualArtifact  (fixed 300x420 canvas, per-type layout)
//! 4. Export    artifact    →  Deliverables    (PNG, JSON, ZIP)
//! ```
//!
//! Each stage returns values and never mutates its inputs, so a failed crop
//! or export leaves the card exactly as it was. The preview and every export
//! share one rendered artifact, which makes the exported PNG pixel-identical
//! to what was shown.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`card`] | The card record, per-type variant stats, JSON wire format |
//! | [`crop`] | Interactive crop selection and confirm/cancel |
//! | [`compositor`] | Per-type layout and rasterization; the preview surface |
//! | [`export`] | PNG / JSON / ZIP deliverables |
//! | [`delivery`] | Writing deliverables to a directory |
//! | [`persistence`] | Session store for the card being edited |
//! | [`config`] | `config.toml` loading, validation, and merging |
//! | [`naming`] | Export file names derived from the card name |
//! | [`imaging`] | Crop geometry and the pure-Rust image backend |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Tagged Card Variants
//!
//! Type-specific stats live in [`card::CardKind`], so a Spell simply has no
//! `attack` field to get wrong. Layout and serialization dispatch on the tag
//! exhaustively; adding a card type is a compile error everywhere it matters.
//!
//! ## Explicit Crop Sessions
//!
//! A [`crop::CropSelection`] is an ordinary value owned by the caller. There
//! is no global "current crop": begin returns one, update consumes and
//! returns it, cancel drops it.
//!
//! ## Deterministic Output
//!
//! Text is drawn from built-in 8x8 bitmap glyphs and shapes are drawn without
//! anti-aliasing, so renders do not depend on installed fonts. ZIP entries
//! carry a fixed timestamp. The same card always produces the same bytes.

pub mod card;
pub mod compositor;
pub mod config;
pub mod crop;
pub mod delivery;
pub mod export;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod persistence;

#[cfg(test)]
pub(crate) mod test_helpers;
