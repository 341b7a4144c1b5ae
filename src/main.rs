use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use log::{info, warn};

use shotscribe::capture::{self, CaptureSource, FileSource, SaveTarget};
use shotscribe::config::{Config, MemoryPreferences, PreferenceStore, TomlPreferences};
use shotscribe::draw::PangoRasterizer;
use shotscribe::geometry::Rect;
use shotscribe::script::AnnotationScript;
use shotscribe::session::Editor;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SHOTSCRIBE_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "shotscribe")]
#[command(version = VERSION, about = "Screenshot cropping and annotation tool")]
struct Cli {
    /// PNG image to annotate, standing in for the captured screen
    #[arg(long, short = 'i', value_name = "PNG")]
    input: Option<PathBuf>,

    /// TOML file with [[annotation]] tables to draw
    #[arg(long, short = 'a', value_name = "TOML")]
    annotations: Option<PathBuf>,

    /// Crop rectangle in screenshot pixels
    #[arg(long, value_name = "X0,Y0,X1,Y1", value_parser = parse_crop)]
    crop: Option<Rect>,

    /// Where to write the result (default: the configured save directory)
    #[arg(long, short = 'o', value_name = "PNG")]
    output: Option<PathBuf>,

    /// Configuration file to use instead of ~/.config/shotscribe/config.toml
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,
}

fn parse_crop(text: &str) -> Result<Rect, String> {
    shotscribe::util::parse_rect(text)
        .ok_or_else(|| format!("expected four integers x0,y0,x1,y1, got {text:?}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let Some(input) = cli.input.clone() else {
        print_usage();
        return Ok(());
    };

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let source = FileSource::new(&input);
    let image = runtime
        .block_on(async {
            let bounds = source.full_bounds().await?;
            capture::start_session(&source, bounds).await
        })
        .with_context(|| format!("Failed to capture from {}", input.display()))?;
    info!(
        "Captured {}x{} pixels from {}",
        image.width(),
        image.height(),
        input.display()
    );

    let mut editor = Editor::new(image, &config, runtime.handle().clone())
        .with_preferences(open_preferences());

    if let Some(crop) = cli.crop {
        editor
            .set_crop(crop)
            .map_err(|e| anyhow!("Cannot crop to {crop:?}: {e}"))?;
    }

    if let Some(path) = &cli.annotations {
        let script = AnnotationScript::load(path)?;
        let filters = script.to_filters(editor.settings(), &PangoRasterizer)?;
        for filter in filters {
            editor.add_filter(filter)?;
        }
        info!("Applied {} annotations", script.len());
    }

    let written = match &cli.output {
        Some(path) => {
            let png = capture::encode_png(&editor.snapshot())?;
            capture::file::write_private(path, &png)?;
            path.clone()
        }
        None => editor.save(&SaveTarget::from_config(&config.save))?,
    };

    if let Err(e) = editor.save_preferences() {
        warn!("Failed to save preferences: {:#}", e);
    }

    println!("{}", written.display());
    Ok(())
}

fn open_preferences() -> Box<dyn PreferenceStore> {
    match TomlPreferences::default_path().and_then(|path| TomlPreferences::open(&path)) {
        Ok(prefs) => Box::new(prefs),
        Err(e) => {
            warn!("Preferences unavailable, not remembering settings: {:#}", e);
            Box::new(MemoryPreferences::new())
        }
    }
}

fn print_usage() {
    println!("shotscribe: Screenshot cropping and annotation tool");
    println!();
    println!("Usage:");
    println!("  shotscribe --input shot.png [--crop X0,Y0,X1,Y1] [--annotations notes.toml]");
    println!("             [--output out.png] [--config config.toml]");
    println!("  shotscribe --help      Show help");
    println!();
    println!("Annotation scripts list [[annotation]] tables, each with a kind:");
    println!("  arrow, line, dotted-line, rectangle, shield-block, circle, pen, text");
    println!();
    println!("Without --output the result goes to the [save] directory of the config.");
}
