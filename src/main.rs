//! # Placard CLI
//!
//! Command-line interface for the AI flyer designer.
//!
//! ## Usage
//!
//! ```bash
//! # Run the designer UI and HTTP API
//! placard serve --listen 0.0.0.0:8080
//!
//! # Render a flyer straight to a file
//! placard render --options flyer.json --logo logo.png --qr https://example.com
//!
//! # Render a variation as JPEG into ./out
//! placard render --options flyer.json --variation --format jpeg --out out
//!
//! # List canvas formats
//! placard formats
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use placard::{
    FlyerOptions, FlyerSession, PlacardError,
    export::{
        ASSET_TIMEOUT, ChromeRasterizer, ExportFormat, ExportPipeline, HttpAssetLoader,
    },
    flyer::CanvasFormat,
    generator::{GeminiClient, GeneratorConfig, markup_or_fallback, prompt::VARIATION_INSTRUCTION},
    intake::{ImageFile, ImageSlot},
    qr::PngQrEncoder,
    server::{self, ServerConfig},
};

/// Placard - AI flyer designer
#[derive(Parser, Debug)]
#[command(name = "placard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the designer web UI and HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        /// Generative Language API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Headless Chromium binary used for exports
        #[arg(long, default_value = "chromium")]
        chrome: PathBuf,

        /// Extra flag passed to the browser (repeatable, e.g. --chrome-arg=--no-sandbox)
        #[arg(long = "chrome-arg", allow_hyphen_values = true)]
        chrome_args: Vec<String>,

        /// Settle interval before an export is allowed, in milliseconds
        #[arg(long, default_value = "300")]
        settle_ms: u64,
    },

    /// Generate a flyer and write it to a file
    Render {
        /// JSON file with the flyer options (camelCase fields)
        #[arg(long, value_name = "FILE")]
        options: PathBuf,

        /// Logo image
        #[arg(long, value_name = "FILE")]
        logo: Option<PathBuf>,

        /// Speaker or product image
        #[arg(long, value_name = "FILE")]
        speaker: Option<PathBuf>,

        /// Background image file or http(s) URL
        #[arg(long, value_name = "FILE|URL")]
        background: Option<String>,

        /// Link to encode as a QR code
        #[arg(long, value_name = "URL")]
        qr: Option<String>,

        /// Output format: png or jpeg
        #[arg(long, default_value = "png")]
        format: String,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Ask for a completely different layout
        #[arg(long)]
        variation: bool,

        /// Generative Language API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Headless Chromium binary
        #[arg(long, default_value = "chromium")]
        chrome: PathBuf,

        /// Extra flag passed to the browser (repeatable)
        #[arg(long = "chrome-arg", allow_hyphen_values = true)]
        chrome_args: Vec<String>,
    },

    /// List canvas formats and their pixel sizes
    Formats,
}

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("placard=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `GEMINI_API_KEY` first, then the generic `API_KEY`.
fn resolve_api_key(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("API_KEY").ok())
        .filter(|k| !k.trim().is_empty())
}

async fn run() -> Result<(), PlacardError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            api_key,
            chrome,
            chrome_args,
            settle_ms,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                generator: GeneratorConfig {
                    api_key: resolve_api_key(api_key),
                    ..Default::default()
                },
                browser: chrome,
                browser_args: chrome_args,
                settle: Duration::from_millis(settle_ms),
            };
            server::serve(config).await
        }

        Commands::Render {
            options,
            logo,
            speaker,
            background,
            qr,
            format,
            out,
            variation,
            api_key,
            chrome,
            chrome_args,
        } => {
            let format = ExportFormat::parse(&format).ok_or_else(|| {
                PlacardError::Config(format!("Unknown format '{}', expected png or jpeg", format))
            })?;

            let json = tokio::fs::read_to_string(&options).await?;
            let options: FlyerOptions = serde_json::from_str(&json)
                .map_err(|e| PlacardError::Parse(format!("{}: {}", options.display(), e)))?;

            let generator = GeminiClient::new(GeneratorConfig {
                api_key: resolve_api_key(api_key),
                ..Default::default()
            })?;

            let mut rasterizer = ChromeRasterizer::new(chrome);
            rasterizer.extra_args = chrome_args;
            let loader = HttpAssetLoader::new(ASSET_TIMEOUT).map_err(PlacardError::Config)?;
            let export = ExportPipeline::new(
                Arc::new(rasterizer),
                Arc::new(loader),
                placard::export::DEFAULT_SETTLE,
            );

            let mut session = FlyerSession::new(export, Arc::new(PngQrEncoder::default()));
            session.set_options(options)?;
            if let Some(path) = logo {
                session.set_image(ImageSlot::Logo, Some(ImageFile::read(path).await?));
            }
            if let Some(path) = speaker {
                session.set_image(ImageSlot::Speaker, Some(ImageFile::read(path).await?));
            }
            if let Some(bg) = background {
                let image = if bg.starts_with("http://") || bg.starts_with("https://") {
                    ImageFile::from_stock(bg)
                } else {
                    ImageFile::read(bg).await?
                };
                session.set_image(ImageSlot::Background, Some(image));
            }
            if let Some(url) = qr {
                session.set_qr_url(&url);
            }

            println!("Generating {}...", session.options().canvas_format.label());
            let request = session.begin_generation();
            let markup = markup_or_fallback(
                &generator,
                &request.options,
                request.flags,
                variation.then_some(VARIATION_INSTRUCTION),
            )
            .await;
            session.finish_generation(request.ticket, markup);

            session.export().wait_ready().await;
            let download = session.export().export(format).await?;

            tokio::fs::create_dir_all(&out).await?;
            let path = out.join(&download.filename);
            tokio::fs::write(&path, &download.bytes).await?;
            println!("Saved {} ({} bytes)", path.display(), download.bytes.len());
            Ok(())
        }

        Commands::Formats => {
            println!("Canvas formats:");
            for format in CanvasFormat::all() {
                let dims = format.dimensions();
                println!("  {:<40} {}x{}", format.label(), dims.width, dims.height);
            }
            Ok(())
        }
    }
}
