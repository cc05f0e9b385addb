//! # Placard - AI Flyer Designer
//!
//! Placard turns a handful of form fields into a finished promotional flyer.
//! A hosted generative model writes the flyer markup; Placard fills in the
//! user's images, renders the result in an isolated document, and exports it
//! as a PNG or JPEG at the exact canvas size. It provides:
//!
//! - **Prompting**: flyer, copy and image prompts for the remote generator
//! - **Substitution**: image placeholder tokens replaced with real sources
//! - **Rendering**: sandboxed standalone documents and a scaled preview
//! - **Export**: a settle-gated pipeline driving a headless rasterizer
//! - **Server**: a per-session HTTP API and the embedded designer UI
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use placard::{
//!     export::{ChromeRasterizer, ExportFormat, ExportPipeline, HttpAssetLoader, ASSET_TIMEOUT, DEFAULT_SETTLE},
//!     generator::{markup_or_fallback, GeminiClient, GeneratorConfig},
//!     qr::PngQrEncoder,
//!     session::FlyerSession,
//! };
//!
//! # async fn example() -> Result<(), placard::PlacardError> {
//! let loader = HttpAssetLoader::new(ASSET_TIMEOUT).map_err(placard::PlacardError::Config)?;
//! let export = ExportPipeline::new(
//!     Arc::new(ChromeRasterizer::new("chromium")),
//!     Arc::new(loader),
//!     DEFAULT_SETTLE,
//! );
//! let mut session = FlyerSession::new(export, Arc::new(PngQrEncoder::default()));
//! session.set_qr_url("https://example.com/rsvp");
//!
//! let client = GeminiClient::new(GeneratorConfig::default())?;
//! let request = session.begin_generation();
//! let markup = markup_or_fallback(&client, &request.options, request.flags, None).await;
//! session.finish_generation(request.ticket, markup);
//!
//! session.export().wait_ready().await;
//! let download = session.export().export(ExportFormat::Png).await?;
//! std::fs::write(&download.filename, &download.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`flyer`] | Option fields, canvas formats, themes, palettes |
//! | [`intake`] | Uploaded and stock images as image sources |
//! | [`generator`] | Remote generator trait, prompts, Gemini client |
//! | [`placeholder`] | Image token substitution |
//! | [`render`] | Document composition and preview scaling |
//! | [`export`] | Readiness tracking and rasterization |
//! | [`qr`] | QR code images |
//! | [`session`] | One user's editable flyer state |
//! | [`server`] | HTTP API and embedded frontend |
//! | [`error`] | Error types |

pub mod error;
pub mod export;
pub mod flyer;
pub mod generator;
pub mod intake;
pub mod placeholder;
pub mod qr;
pub mod render;
pub mod server;
pub mod session;

// Re-exports for convenience
pub use error::{ExportError, PlacardError};
pub use flyer::{CanvasFormat, FlyerOptions};
pub use session::FlyerSession;
