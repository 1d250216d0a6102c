//! Command line front-end for the deckcraft package codec.
//!
//! ```sh
//! deckcraft import deck.pptx -o slides/
//! deckcraft export slides/*.png -o deck.pptx
//! deckcraft inspect deck.pptx
//! ```

use clap::{Parser, Subcommand};
use deckcraft::config::DeckConfig;
use deckcraft::deck::ImageData;
use deckcraft::ooxml::pptx::{ImageFormat, read_package, write_package};
use deckcraft::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};

/// Import, export and inspect image-only slide decks
#[derive(Parser, Debug)]
#[command(name = "deckcraft", version)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one image per slide from a .pptx file
    Import {
        /// Package to read
        input: PathBuf,
        /// Directory receiving slide-NN.<ext> files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Build a .pptx file with one full-bleed image per slide
    Export {
        /// Images in slide order
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Package to write
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List the slide images recoverable from a .pptx file
    Inspect { input: PathBuf },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => DeckConfig::load(path)?,
        None => DeckConfig::default(),
    };

    match cli.command {
        Command::Import { input, output } => import(&input, &output),
        Command::Export { images, output } => export(&images, &output, &config),
        Command::Inspect { input } => inspect(&input),
    }
}

fn import(input: &Path, output: &Path) -> Result<()> {
    let entries = read_package(&fs::read(input)?)?;
    if entries.is_empty() {
        return Err(Error::EmptyImport);
    }

    fs::create_dir_all(output)?;
    for entry in &entries {
        let path = output.join(format!(
            "slide-{:02}.{}",
            entry.position,
            entry.format.extension()
        ));
        fs::write(&path, &entry.data)?;
        debug!(position = entry.position, path = %path.display(), "wrote slide image");
    }
    info!(slides = entries.len(), dir = %output.display(), "import complete");
    Ok(())
}

fn export(images: &[PathBuf], output: &Path, config: &DeckConfig) -> Result<()> {
    let images = images
        .iter()
        .map(|path| load_image(path))
        .collect::<Result<Vec<_>>>()?;

    let bytes = write_package(
        images.iter().map(|image| Some(image.as_slide_image())),
        config.slide_size(),
    )?;
    fs::write(output, bytes)?;
    info!(slides = images.len(), path = %output.display(), "export complete");
    Ok(())
}

/// Read an image file, trusting its signature over its extension.
fn load_image(path: &Path) -> Result<ImageData> {
    let data = fs::read(path)?;
    let format = ImageFormat::detect_from_bytes(&data).unwrap_or_else(|| {
        debug!(path = %path.display(), "unrecognized signature, using extension");
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        ImageFormat::from_media_extension(ext)
    });
    Ok(ImageData::new(data, format))
}

fn inspect(input: &Path) -> Result<()> {
    let entries = read_package(&fs::read(input)?)?;
    for entry in &entries {
        println!(
            "{:>3}  {:<10}  {} bytes",
            entry.position,
            entry.mime_type(),
            entry.data.len()
        );
    }
    println!("{} slide image(s)", entries.len());
    Ok(())
}
