use card_designer::card::{CardField, CardModel, IllustrationFrame};
use card_designer::compositor::{Compositor, PreviewSurface};
use card_designer::crop::{self, CropConfig, SelectionUpdate};
use card_designer::delivery::{Delivery, DirectoryDelivery};
use card_designer::export::{Deliverable, ExportKind, ExportPipeline};
use card_designer::imaging::RustBackend;
use card_designer::persistence::SessionStore;
use card_designer::{config, output};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level as TraceLevel;
use tracing_subscriber::FmtSubscriber;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "card-designer")]
#[command(about = "Compose game cards and export them as PNG, JSON and ZIP")]
#[command(long_about = "\
Compose game cards and export them as PNG, JSON and ZIP

The card being edited lives in the session directory and survives between
runs. Every command loads it, applies its change, and saves it back.

Session structure:

  .card-designer/
  ├── cardData.json      # The card (full JSON, illustration included)
  └── config.toml        # Canvas, crop, palette and export settings (optional)

Typical session:

  card-designer set name \"Storm Spirit\"
  card-designer set cardType Creep
  card-designer set manaCost 4
  card-designer crop portrait.jpg --zoom 1.5 --pan-x=-20
  card-designer export all        # → out/Storm_Spirit_card.png, .json, _package.zip

Fields: id, name, cardType, color, description, attack, health, manaCost.
Numeric fields accept any input; non-numbers become 0.

Run 'card-designer gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Session directory (saved card and config.toml)
    #[arg(long, default_value = ".card-designer", global = true)]
    session: PathBuf,

    /// Directory exports and previews are written to
    #[arg(long, default_value = "out", global = true)]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current card
    Show,
    /// Set one field from raw input
    Set {
        /// Field name (id, name, cardType, color, description, attack, health, manaCost)
        field: String,
        /// Raw value; numeric fields coerce junk to 0
        value: String,
    },
    /// Replace the card with the default card
    Reset,
    /// Crop an image into the card's illustration
    Crop(CropArgs),
    /// Place the illustration, or clear the placement
    #[command(allow_negative_numbers = true)]
    Frame(FrameArgs),
    /// Render the card to <out>/preview.png
    Preview,
    /// Export the card
    Export {
        #[arg(value_enum, default_value_t = ExportTarget::All)]
        target: ExportTarget,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct CropArgs {
    /// Source image (PNG, JPEG, WebP, GIF, BMP)
    image: PathBuf,
    /// Horizontal pan in crop-viewport units
    #[arg(long, allow_hyphen_values = true)]
    pan_x: Option<f64>,
    /// Vertical pan in crop-viewport units
    #[arg(long, allow_hyphen_values = true)]
    pan_y: Option<f64>,
    /// Zoom factor, clamped to [1, zoom_max]
    #[arg(long)]
    zoom: Option<f64>,
}

#[derive(clap::Args)]
struct FrameArgs {
    /// Remove the placement and use the per-type default frame
    #[arg(long, conflicts_with_all = ["x", "y", "width", "height"])]
    clear: bool,
    #[arg(required_unless_present = "clear")]
    x: Option<i32>,
    #[arg(required_unless_present = "clear")]
    y: Option<i32>,
    #[arg(required_unless_present = "clear")]
    width: Option<u32>,
    #[arg(required_unless_present = "clear")]
    height: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportTarget {
    Png,
    Json,
    Bundle,
    All,
}

impl ExportTarget {
    fn kinds(self) -> Vec<ExportKind> {
        match self {
            ExportTarget::Png => vec![ExportKind::Image],
            ExportTarget::Json => vec![ExportKind::Data],
            ExportTarget::Bundle => vec![ExportKind::Bundle],
            ExportTarget::All => ExportKind::ALL.to_vec(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.session)?;
    let store = SessionStore::new(&cli.session);
    let backend = RustBackend::new();
    let sink = DirectoryDelivery::new(&cli.out);
    let mut card = store.load_or_default();

    match cli.command {
        Command::Show => output::print_card(&card),
        Command::Set { field, value } => {
            let field: CardField = field.parse()?;
            card.apply_input(field, &value)?;
            store.save(&card)?;
            output::print_card(&card);
        }
        Command::Reset => {
            card = CardModel::default();
            store.save(&card)?;
            output::print_card(&card);
        }
        Command::Crop(args) => {
            let bytes = std::fs::read(&args.image)?;
            let crop_config = CropConfig::from_designer_config(&config);
            let selection = crop::begin_crop(&backend, &bytes, &crop_config)?;
            let selection = crop::update_selection(selection, SelectionUpdate {
                pan: (args.pan_x.is_some() || args.pan_y.is_some())
                    .then(|| (args.pan_x.unwrap_or(0.0), args.pan_y.unwrap_or(0.0))),
                zoom: args.zoom,
            });

            let plan = crop::plan_confirm(&selection)?;
            let raster = crop::confirm_crop(&backend, &selection)?;
            output::print_crop(&plan, selection.zoom());
            crop::cancel_crop(selection);

            let illustration =
                crop::encode_illustration(&backend, &raster, config.export.compression)?;
            card.set_illustration(illustration);
            store.save(&card)?;
        }
        Command::Frame(args) => {
            card.illustration_frame = match (args.x, args.y, args.width, args.height) {
                (Some(x), Some(y), Some(width), Some(height)) if !args.clear => {
                    Some(IllustrationFrame {
                        x,
                        y,
                        width,
                        height,
                    })
                }
                _ => None,
            };
            store.save(&card)?;
            output::print_card(&card);
        }
        Command::Preview => {
            let mut surface = PreviewSurface::new();
            surface.refresh(&Compositor::new(&backend, &config), &card);
            let artifact = surface.capture()?;
            let pipeline = ExportPipeline::new(&backend, &config);
            let path = sink.deliver(&Deliverable {
                filename: "preview.png".to_string(),
                bytes: pipeline.encode_artifact(artifact)?,
            })?;
            output::print_preview(artifact, &path);
        }
        Command::Export { target } => {
            let mut surface = PreviewSurface::new();
            surface.refresh(&Compositor::new(&backend, &config), &card);
            let pipeline = ExportPipeline::new(&backend, &config);

            let mut delivered = Vec::new();
            for kind in target.kinds() {
                let deliverable = pipeline.export(kind, &card, &surface)?;
                let path = sink.deliver(&deliverable)?;
                delivered.push((deliverable.filename, deliverable.bytes.len(), path));
            }
            output::print_exports(&delivered);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Log to stderr at the level named by `LOG_LEVEL` (default `info`).
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
