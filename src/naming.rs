//! Centralized file naming for exports.
//!
//! Every deliverable is named from the card name: each run of whitespace
//! becomes a single `_`, and a fixed suffix says what the file is:
//!
//! - `Axe` → `Axe_card.png`, `Axe_card.json`, `Axe_card_package.zip`
//! - `Storm  Spirit` → `Storm_Spirit_card.png`
//!
//! Blank names use the configured fallback stem (`card` by default).
//! Path separators are replaced too, so a name can never point a delivery
//! outside its target directory.

/// File names for one card's exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNames {
    /// Name-derived stem shared by all three files.
    pub stem: String,
    pub image: String,
    pub data: String,
    pub archive: String,
}

/// Derive the export stem from a card name.
///
/// - `"Axe"` → `"Axe"`
/// - `"Storm Spirit"` → `"Storm_Spirit"`
/// - `" Lina\t "` → `"_Lina_"`
/// - `"a/b"` → `"a_b"`
/// - `"   "` → `fallback`
pub fn export_stem(name: &str, fallback: &str) -> String {
    if name.trim().is_empty() {
        return fallback.to_string();
    }
    let mut stem = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        stem.push(if matches!(ch, '/' | '\\') { '_' } else { ch });
    }
    stem
}

pub fn export_names(name: &str, fallback: &str) -> ExportNames {
    let stem = export_stem(name, fallback);
    ExportNames {
        image: format!("{stem}_card.png"),
        data: format!("{stem}_card.json"),
        archive: format!("{stem}_card_package.zip"),
        stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_name() {
        let n = export_names("Axe", "card");
        assert_eq!(n.stem, "Axe");
        assert_eq!(n.image, "Axe_card.png");
        assert_eq!(n.data, "Axe_card.json");
        assert_eq!(n.archive, "Axe_card_package.zip");
    }

    #[test]
    fn whitespace_runs_collapse_to_one_underscore() {
        assert_eq!(export_stem("Storm Spirit", "card"), "Storm_Spirit");
        assert_eq!(export_stem("Storm \t\n Spirit", "card"), "Storm_Spirit");
    }

    #[test]
    fn leading_and_trailing_whitespace_kept_as_underscores() {
        assert_eq!(export_stem(" Lina\t ", "card"), "_Lina_");
    }

    #[test]
    fn empty_name_uses_fallback() {
        assert_eq!(export_stem("", "card"), "card");
        assert_eq!(export_names("  ", "card").archive, "card_card_package.zip");
    }

    #[test]
    fn custom_fallback() {
        assert_eq!(export_stem("", "untitled"), "untitled");
    }

    #[test]
    fn path_separators_replaced() {
        assert_eq!(export_stem("../etc/passwd", "card"), ".._etc_passwd");
        assert_eq!(export_stem("a\\b", "card"), "a_b");
    }

    #[test]
    fn unicode_names_preserved() {
        assert_eq!(export_stem("Crystal Maiden ❄", "card"), "Crystal_Maiden_❄");
    }
}
