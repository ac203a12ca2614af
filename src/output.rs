//! CLI output formatting.
//!
//! Every command prints a short, information-first summary: the card's
//! identity on the header line, details on indented context lines.
//!
//! ## Card
//!
//! ```text
//! Axe (Hero, Red)
//!     id: 21
//!     attack: 7
//!     health: 11
//!     illustration: none
//!     frame: default
//! ```
//!
//! ## Crop
//!
//! ```text
//! Crop 450x600+175+0 at zoom 1.00 → 240x320
//! ```
//!
//! ## Export
//!
//! ```text
//! Exported
//!     Axe_card.png (12345 bytes) → out/Axe_card.png
//!     Axe_card.json (98 bytes) → out/Axe_card.json
//! ```
//!
//! # Architecture
//!
//! Each command has a pure `format_*` function returning lines (testable
//! without stdout) and a `print_*` wrapper that writes them.

use crate::card::{CardKind, CardModel};
use crate::compositor::VisualArtifact;
use crate::imaging::ResampleParams;
use std::path::{Path, PathBuf};

/// Truncate to `max` characters, appending `...` when cut.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

// ============================================================================
// Card
// ============================================================================

pub fn format_card(card: &CardModel) -> Vec<String> {
    let name = if card.name.is_empty() {
        "(unnamed)"
    } else {
        card.name.as_str()
    };
    let color = if card.color.name().is_empty() {
        "no color"
    } else {
        card.color.name()
    };

    let mut lines = vec![format!("{name} ({}, {color})", card.card_type())];
    lines.push(format!("    id: {}", card.id));
    match card.kind {
        CardKind::Hero { attack, health } => {
            lines.push(format!("    attack: {attack}"));
            lines.push(format!("    health: {health}"));
        }
        CardKind::Creep {
            attack,
            health,
            mana_cost,
        } => {
            lines.push(format!("    attack: {attack}"));
            lines.push(format!("    health: {health}"));
            lines.push(format!("    manaCost: {mana_cost}"));
        }
        CardKind::Spell { mana_cost } => lines.push(format!("    manaCost: {mana_cost}")),
    }
    if !card.description.is_empty() {
        lines.push(format!(
            "    description: {}",
            truncate_desc(&card.description, 40)
        ));
    }
    lines.push(match &card.illustration {
        Some(ill) => format!("    illustration: {} bytes", ill.as_bytes().len()),
        None => "    illustration: none".to_string(),
    });
    lines.push(match card.illustration_frame {
        Some(f) => format!("    frame: {}x{}+{}+{}", f.width, f.height, f.x, f.y),
        None => "    frame: default".to_string(),
    });
    lines
}

pub fn print_card(card: &CardModel) {
    for line in format_card(card) {
        println!("{}", line);
    }
}

// ============================================================================
// Crop
// ============================================================================

pub fn format_crop(params: &ResampleParams, zoom: f64) -> String {
    let r = params.region;
    format!(
        "Crop {}x{}+{}+{} at zoom {:.2} → {}x{}",
        r.width, r.height, r.x, r.y, zoom, params.width, params.height
    )
}

pub fn print_crop(params: &ResampleParams, zoom: f64) {
    println!("{}", format_crop(params, zoom));
}

// ============================================================================
// Preview and export
// ============================================================================

pub fn format_preview(artifact: &VisualArtifact, path: &Path) -> Vec<String> {
    let (w, h) = artifact.dimensions();
    vec![
        format!(
            "Preview {}x{} ({}) → {}",
            w,
            h,
            artifact.card_type(),
            path.display()
        ),
        format!("    sha256: {}", artifact.fingerprint()),
    ]
}

pub fn print_preview(artifact: &VisualArtifact, path: &Path) {
    for line in format_preview(artifact, path) {
        println!("{}", line);
    }
}

/// One line per delivered file: `(filename, size, destination)`.
pub fn format_exports(delivered: &[(String, usize, PathBuf)]) -> Vec<String> {
    let mut lines = vec!["Exported".to_string()];
    for (filename, size, path) in delivered {
        lines.push(format!(
            "    {} ({} bytes) → {}",
            filename,
            size,
            path.display()
        ));
    }
    lines
}

pub fn print_exports(delivered: &[(String, usize, PathBuf)]) {
    for line in format_exports(delivered) {
        println!("{}", line);
    }
}
