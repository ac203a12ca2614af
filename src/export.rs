//! Export pipeline: PNG image, JSON data file, ZIP bundle.
//!
//! | Export | Contents | File name |
//! |--------|----------|-----------|
//! | image  | PNG of the previewed artifact, native size | `<stem>_card.png` |
//! | data   | Card JSON without the illustration | `<stem>_card.json` |
//! | bundle | ZIP: full JSON (illustration as data URL) + the PNG | `<stem>_card_package.zip` |
//!
//! Images are always taken from the [`PreviewSurface`]: whatever was last
//! shown is what gets exported, never a fresh layout. Bundle entries carry a
//! fixed timestamp so identical cards produce identical archives.
//!
//! Exports only build [`Deliverable`]s; writing them anywhere is the job of a
//! [`Delivery`](crate::delivery::Delivery).

use crate::card::CardModel;
use crate::compositor::{CaptureError, PreviewSurface, VisualArtifact};
use crate::config::DesignerConfig;
use crate::imaging::{BackendError, ImageBackend};
use crate::naming::{ExportNames, export_names};
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] ZipError),
    #[error("Image encoding failed: {0}")]
    Imaging(#[from] BackendError),
}

/// A named export, ready to hand to a delivery sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deliverable {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// What to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Image,
    Data,
    Bundle,
}

impl ExportKind {
    pub const ALL: [ExportKind; 3] = [ExportKind::Image, ExportKind::Data, ExportKind::Bundle];
}

pub struct ExportPipeline<'a, B: ImageBackend> {
    backend: &'a B,
    config: &'a DesignerConfig,
}

impl<'a, B: ImageBackend> ExportPipeline<'a, B> {
    pub fn new(backend: &'a B, config: &'a DesignerConfig) -> Self {
        Self { backend, config }
    }

    pub fn names(&self, card: &CardModel) -> ExportNames {
        export_names(&card.name, &self.config.export.fallback_name)
    }

    /// PNG bytes of an artifact at its native resolution.
    pub fn encode_artifact(&self, artifact: &VisualArtifact) -> Result<Vec<u8>, ExportError> {
        Ok(self
            .backend
            .encode_png(artifact.image(), self.config.export.compression)?)
    }

    /// The previewed card as `<stem>_card.png`.
    pub fn export_image(
        &self,
        card: &CardModel,
        surface: &PreviewSurface,
    ) -> Result<Deliverable, ExportError> {
        let artifact = surface.capture()?;
        let deliverable = Deliverable {
            filename: self.names(card).image,
            bytes: self.encode_artifact(artifact)?,
        };
        tracing::info!(filename = %deliverable.filename, bytes = deliverable.bytes.len(), "exported image");
        Ok(deliverable)
    }

    /// The card as `<stem>_card.json`, without the illustration.
    pub fn export_data(&self, card: &CardModel) -> Result<Deliverable, ExportError> {
        let deliverable = Deliverable {
            filename: self.names(card).data,
            bytes: card.to_json_pretty(false)?.into_bytes(),
        };
        tracing::info!(filename = %deliverable.filename, "exported data");
        Ok(deliverable)
    }

    /// A two-entry ZIP: full JSON first, then the PNG.
    pub fn export_bundle(
        &self,
        card: &CardModel,
        surface: &PreviewSurface,
    ) -> Result<Deliverable, ExportError> {
        let artifact = surface.capture()?;
        let names = self.names(card);
        let json = card.to_json_pretty(true)?;
        let png = self.encode_artifact(artifact)?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut buf = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buf);
        zip.start_file(names.data.as_str(), options)?;
        zip.write_all(json.as_bytes()).map_err(ZipError::from)?;
        zip.start_file(names.image.as_str(), options)?;
        zip.write_all(&png).map_err(ZipError::from)?;
        zip.finish()?;

        let deliverable = Deliverable {
            filename: names.archive,
            bytes: buf.into_inner(),
        };
        tracing::info!(filename = %deliverable.filename, bytes = deliverable.bytes.len(), "exported bundle");
        Ok(deliverable)
    }

    pub fn export(
        &self,
        kind: ExportKind,
        card: &CardModel,
        surface: &PreviewSurface,
    ) -> Result<Deliverable, ExportError> {
        match kind {
            ExportKind::Image => self.export_image(card, surface),
            ExportKind::Data => self.export_data(card),
            ExportKind::Bundle => self.export_bundle(card, surface),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardType;
    use crate::compositor::Compositor;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::Compression;
    use crate::test_helpers::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn previewed(card: &CardModel, backend: &RustBackend, config: &DesignerConfig) -> PreviewSurface {
        let mut surface = PreviewSurface::new();
        surface.refresh(&Compositor::new(backend, config), card);
        surface
    }

    fn entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    // =========================================================================
    // Image
    // =========================================================================

    #[test]
    fn image_export_matches_preview_pixels() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let card = with_solid_illustration(creep_card(), [200, 10, 10, 255]);
        let surface = previewed(&card, &backend, &config);

        let out = ExportPipeline::new(&backend, &config)
            .export_image(&card, &surface)
            .unwrap();
        assert_eq!(out.filename, "Mud_Golem_card.png");

        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(&decoded, surface.capture().unwrap().image());
    }

    #[test]
    fn image_export_without_preview_is_capture_error() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let result = ExportPipeline::new(&backend, &config)
            .export_image(&axe_hero(), &PreviewSurface::new());
        assert!(matches!(
            result,
            Err(ExportError::Capture(CaptureError::NotRendered))
        ));
    }

    #[test]
    fn image_export_uses_configured_compression() {
        let backend = MockBackend::new();
        let mut config = DesignerConfig::default();
        config.export.compression = Compression::Best;
        let mut surface = PreviewSurface::new();
        surface.mount(VisualArtifact::new(
            image::RgbaImage::new(300, 420),
            CardType::Hero,
        ));

        ExportPipeline::new(&backend, &config)
            .export_image(&axe_hero(), &surface)
            .unwrap();
        assert_eq!(backend.get_operations(), vec![RecordedOp::EncodePng {
            width: 300,
            height: 420,
            compression: Compression::Best,
        }]);
    }

    #[test]
    fn exported_image_is_the_mounted_artifact_not_a_rerender() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let card = axe_hero();
        let mut surface = PreviewSurface::new();
        let stale = VisualArtifact::new(
            image::RgbaImage::from_pixel(3, 4, image::Rgba([1, 2, 3, 255])),
            CardType::Hero,
        );
        surface.mount(stale.clone());

        let out = ExportPipeline::new(&backend, &config)
            .export_image(&card, &surface)
            .unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(&decoded, stale.image());
    }

    // =========================================================================
    // Data
    // =========================================================================

    #[test]
    fn data_export_excludes_illustration_and_round_trips() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let card = with_solid_illustration(spell_card(), [0, 0, 0, 255]);

        let out = ExportPipeline::new(&backend, &config)
            .export_data(&card)
            .unwrap();
        assert_eq!(out.filename, "Arcane_Bolt_card.json");

        let text = String::from_utf8(out.bytes.clone()).unwrap();
        assert!(!text.contains("illustration\""));
        assert!(text.starts_with("{\n  \"id\": 40,"));

        let loaded = CardModel::from_json(&out.bytes).unwrap();
        let mut expected = card.clone();
        expected.illustration = None;
        assert_eq!(loaded, expected);
    }

    #[test]
    fn data_export_needs_no_preview() {
        let backend = MockBackend::new();
        let config = DesignerConfig::default();
        ExportPipeline::new(&backend, &config)
            .export_data(&axe_hero())
            .unwrap();
        assert!(backend.get_operations().is_empty());
    }

    // =========================================================================
    // Bundle
    // =========================================================================

    #[test]
    fn bundle_has_exactly_json_and_png() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let card = axe_hero();
        let surface = previewed(&card, &backend, &config);

        let out = ExportPipeline::new(&backend, &config)
            .export_bundle(&card, &surface)
            .unwrap();
        assert_eq!(out.filename, "Axe_card_package.zip");

        let files = entries(&out.bytes);
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Axe_card.json", "Axe_card.png"]);

        let image = ExportPipeline::new(&backend, &config)
            .export_image(&card, &surface)
            .unwrap();
        assert_eq!(files[1].1, image.bytes);
    }

    #[test]
    fn bundle_json_has_illustration_iff_card_has_one() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let pipeline = ExportPipeline::new(&backend, &config);

        let plain = axe_hero();
        let surface = previewed(&plain, &backend, &config);
        let files = entries(&pipeline.export_bundle(&plain, &surface).unwrap().bytes);
        let json: serde_json::Value = serde_json::from_slice(&files[0].1).unwrap();
        assert!(json.get("illustration").is_none());

        let illustrated = with_solid_illustration(axe_hero(), [5, 5, 5, 255]);
        let surface = previewed(&illustrated, &backend, &config);
        let files = entries(&pipeline.export_bundle(&illustrated, &surface).unwrap().bytes);
        let json: serde_json::Value = serde_json::from_slice(&files[0].1).unwrap();
        let url = json["illustration"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());

        let restored = CardModel::from_json(&files[0].1).unwrap();
        assert_eq!(restored, illustrated);
    }

    #[test]
    fn bundle_is_deterministic() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let card = creep_card();
        let surface = previewed(&card, &backend, &config);
        let pipeline = ExportPipeline::new(&backend, &config);

        let a = pipeline.export_bundle(&card, &surface).unwrap();
        let b = pipeline.export_bundle(&card, &surface).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn blank_name_uses_fallback_stem() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let mut card = axe_hero();
        card.name = "  ".into();
        let surface = previewed(&card, &backend, &config);

        let out = ExportPipeline::new(&backend, &config)
            .export_bundle(&card, &surface)
            .unwrap();
        assert_eq!(out.filename, "card_card_package.zip");
        let names: Vec<String> = entries(&out.bytes).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["card_card.json", "card_card.png"]);
    }

    #[test]
    fn export_dispatches_by_kind() {
        let backend = RustBackend::new();
        let config = DesignerConfig::default();
        let card = axe_hero();
        let surface = previewed(&card, &backend, &config);
        let pipeline = ExportPipeline::new(&backend, &config);

        let names: Vec<String> = ExportKind::ALL
            .iter()
            .map(|kind| pipeline.export(*kind, &card, &surface).unwrap().filename)
            .collect();
        assert_eq!(names, vec!["Axe_card.png", "Axe_card.json", "Axe_card_package.zip"]);
    }
}
