//! End-to-end export scenarios through the public API.
//!
//! Each test drives the full edit → crop → preview → export → deliver flow
//! and checks the files a user would receive.
//!
//! Run with: cargo test --test export_scenario

use card_designer::card::{CardField, CardKind, CardModel, CardType};
use card_designer::compositor::{Compositor, PreviewSurface};
use card_designer::config::DesignerConfig;
use card_designer::crop::{self, CropConfig, SelectionUpdate};
use card_designer::delivery::{Delivery, DirectoryDelivery};
use card_designer::export::{ExportKind, ExportPipeline};
use card_designer::imaging::{Compression, RustBackend};
use card_designer::persistence::SessionStore;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::io::{Cursor, Read};
use tempfile::TempDir;
use zip::ZipArchive;

fn source_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

fn json_keys(json: &str) -> Vec<String> {
    json.lines()
        .filter_map(|line| line.strip_prefix("  \""))
        .filter_map(|rest| rest.split_once("\":"))
        .map(|(key, _)| key.to_string())
        .collect()
}

fn zip_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
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

#[test]
fn axe_hero_exports_png_json_and_bundle() {
    let tmp = TempDir::new().unwrap();
    let backend = RustBackend::new();
    let config = DesignerConfig::default();
    let sink = DirectoryDelivery::new(tmp.path());

    let mut card = CardModel::default();
    card.apply_input(CardField::Name, "Axe").unwrap();
    card.apply_input(CardField::CardType, "Hero").unwrap();
    card.apply_input(CardField::Attack, "7").unwrap();
    card.apply_input(CardField::Health, "11").unwrap();

    let mut surface = PreviewSurface::new();
    surface.refresh(&Compositor::new(&backend, &config), &card);
    let pipeline = ExportPipeline::new(&backend, &config);

    let mut paths = Vec::new();
    for kind in ExportKind::ALL {
        let deliverable = pipeline.export(kind, &card, &surface).unwrap();
        paths.push(sink.deliver(&deliverable).unwrap());
    }
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![
        "Axe_card.png",
        "Axe_card.json",
        "Axe_card_package.zip"
    ]);

    // 300x420 PNG
    let png = std::fs::read(&paths[0]).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (300, 420));

    // JSON keys in order, no illustration
    let json = std::fs::read_to_string(&paths[1]).unwrap();
    assert_eq!(json_keys(&json), vec![
        "id",
        "name",
        "cardType",
        "color",
        "attack",
        "health",
        "description"
    ]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], "Axe");
    assert_eq!(value["cardType"], "Hero");
    assert_eq!(value["attack"], 7);
    assert_eq!(value["health"], 11);

    // Archive with exactly the two entries
    let bundle = std::fs::read(&paths[2]).unwrap();
    let entries = zip_entries(&bundle);
    let entry_names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(entry_names, vec!["Axe_card.json", "Axe_card.png"]);
    assert_eq!(entries[1].1, png);
}

#[test]
fn cropped_illustration_flows_into_bundle_and_session() {
    let tmp = TempDir::new().unwrap();
    let backend = RustBackend::new();
    let config = DesignerConfig::default();
    let store = SessionStore::new(tmp.path().join("session"));

    let mut card = store.load_or_default();
    let selection = crop::begin_crop(
        &backend,
        &source_png(900, 700),
        &CropConfig::from_designer_config(&config),
    )
    .unwrap();
    let selection = crop::update_selection(selection, SelectionUpdate {
        pan: Some((-30.0, 12.0)),
        zoom: Some(2.0),
    });
    let raster = crop::confirm_crop(&backend, &selection).unwrap();
    assert_eq!(raster.dimensions(), (240, 320));
    crop::cancel_crop(selection);

    let illustration = crop::encode_illustration(&backend, &raster, Compression::Fast).unwrap();
    card.set_illustration(illustration);
    store.save(&card).unwrap();

    let restored = store.load().unwrap();
    assert_eq!(restored, card);

    let mut surface = PreviewSurface::new();
    surface.refresh(&Compositor::new(&backend, &config), &restored);
    let bundle = ExportPipeline::new(&backend, &config)
        .export_bundle(&restored, &surface)
        .unwrap();

    let entries = zip_entries(&bundle.bytes);
    assert_eq!(entries.len(), 2);
    let json: serde_json::Value = serde_json::from_slice(&entries[0].1).unwrap();
    assert!(json["illustration"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[test]
fn type_switch_round_trip_keeps_shared_stats_and_illustration() {
    let backend = RustBackend::new();
    let config = DesignerConfig::default();
    let mut card = CardModel::default();
    let selection = crop::begin_crop(
        &backend,
        &source_png(300, 400),
        &CropConfig::from_designer_config(&config),
    )
    .unwrap();
    let raster = crop::confirm_crop(&backend, &selection).unwrap();
    card.set_illustration(crop::encode_illustration(&backend, &raster, Compression::Fast).unwrap());
    let illustration = card.illustration.clone();

    card.apply_input(CardField::CardType, "Spell").unwrap();
    assert_eq!(card.kind, CardKind::Spell { mana_cost: 0 });
    card.apply_input(CardField::ManaCost, "5").unwrap();

    card.apply_input(CardField::CardType, "Creep").unwrap();
    assert_eq!(card.kind, CardKind::Creep {
        attack: 0,
        health: 0,
        mana_cost: 5
    });

    card.set_card_type(CardType::Hero);
    assert_eq!(card.kind, CardKind::Hero {
        attack: 0,
        health: 0
    });
    assert_eq!(card.illustration, illustration);
}

#[test]
fn exported_png_matches_preview_pixels_for_every_type() {
    let backend = RustBackend::new();
    let config = DesignerConfig::default();
    let pipeline = ExportPipeline::new(&backend, &config);

    for card_type in CardType::ALL {
        let mut card = CardModel::default();
        card.set_card_type(card_type);
        card.description = "Rolls a d20 and hopes for the best.".to_string();

        let mut surface = PreviewSurface::new();
        let shown = surface
            .refresh(&Compositor::new(&backend, &config), &card)
            .clone();
        let png = pipeline.export_image(&card, &surface).unwrap();
        let decoded = image::load_from_memory(&png.bytes).unwrap().to_rgba8();
        assert_eq!(&decoded, shown.image(), "{card_type} export differs from preview");
    }
}

#[test]
fn data_export_round_trips_through_loader() {
    let backend = RustBackend::new();
    let config = DesignerConfig::default();
    let mut card = CardModel::default();
    card.apply_input(CardField::CardType, "Creep").unwrap();
    card.apply_input(CardField::ManaCost, "3abc").unwrap();
    card.apply_input(CardField::Color, "Magenta").unwrap();
    card.apply_input(CardField::Description, "Line one\nline \"two\"").unwrap();

    let data = ExportPipeline::new(&backend, &config)
        .export_data(&card)
        .unwrap();
    let loaded = CardModel::from_json(&data.bytes).unwrap();
    assert_eq!(loaded, card);
}
