//! # Export Pipeline
//!
//! Keeps a full-resolution copy of the current composed document and decides
//! when it is safe to rasterize.
//!
//! ## State machine
//!
//! ```text
//! rebuild() ─▶ Rebuilding ──assets loaded──▶ Settling ──settle interval──▶ Ready
//!     ▲                                                                      │
//!     └──────────────────────────── any new document ◀───────────────────────┘
//! ```
//!
//! `rebuild` flips readiness off synchronously before any settle work is
//! scheduled, and each settle task only advances the state while its
//! generation is still current. A newer document therefore can never be
//! exported as an older one's content.

mod assets;
pub mod raster;

pub use assets::{AssetLoader, HttpAssetLoader, remote_asset_urls};
pub use raster::{ChromeRasterizer, Rasterizer};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use crate::error::{ExportError, PlacardError};
use crate::render::ComposedDocument;

/// Grace period after load before the document counts as painted.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(300);

/// Upper bound on probing any single asset.
pub const ASSET_TIMEOUT: Duration = Duration::from_secs(10);

/// JPEG quality used for exports (0.98).
pub const JPEG_QUALITY: u8 = 98;

/// Base name of every downloaded file.
pub const DOWNLOAD_STEM: &str = "flyer-design";

/// Output encoding of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpeg" | "jpg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn filename(&self) -> String {
        format!("{}.{}", DOWNLOAD_STEM, self.extension())
    }
}

/// An encoded export offered to the user as a file.
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    /// No document has been supplied yet.
    Empty,
    Rebuilding,
    Settling,
    Ready,
}

/// Serializable view of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportStatus {
    pub phase: ExportPhase,
    pub ready: bool,
    pub generation: u64,
    /// Remote images that failed to load; exporting will fail while any remain.
    pub unreachable_assets: Vec<String>,
}

#[derive(Debug, Clone)]
struct PipelineState {
    generation: u64,
    phase: ExportPhase,
    document: Option<Arc<ComposedDocument>>,
    unreachable_assets: Vec<String>,
}

/// Off-screen, full-size copy of the composed document plus its readiness.
pub struct ExportPipeline {
    state: Arc<watch::Sender<PipelineState>>,
    settle_task: Mutex<Option<JoinHandle<()>>>,
    rasterizer: Arc<dyn Rasterizer>,
    loader: Arc<dyn AssetLoader>,
    settle: Duration,
}

impl ExportPipeline {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        loader: Arc<dyn AssetLoader>,
        settle: Duration,
    ) -> Self {
        let (tx, _rx) = watch::channel(PipelineState {
            generation: 0,
            phase: ExportPhase::Empty,
            document: None,
            unreachable_assets: Vec::new(),
        });
        Self {
            state: Arc::new(tx),
            settle_task: Mutex::new(None),
            rasterizer,
            loader,
            settle,
        }
    }

    pub fn status(&self) -> ExportStatus {
        let s = self.state.borrow();
        ExportStatus {
            phase: s.phase,
            ready: s.phase == ExportPhase::Ready,
            generation: s.generation,
            unreachable_assets: s.unreachable_assets.clone(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().phase == ExportPhase::Ready
    }

    /// Replace the off-screen document and restart settling.
    ///
    /// Readiness is false when this returns. Must be called inside a Tokio runtime.
    pub fn rebuild(&self, document: ComposedDocument) -> u64 {
        let document = Arc::new(document);
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            s.phase = ExportPhase::Rebuilding;
            s.document = Some(document.clone());
            s.unreachable_assets.clear();
            generation = s.generation;
        });

        let task = tokio::spawn(settle(
            self.state.clone(),
            self.loader.clone(),
            document,
            generation,
            self.settle,
        ));

        let mut slot = self.settle_task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
        generation
    }

    /// Wait until the current document is ready.
    pub async fn wait_ready(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|s| s.phase == ExportPhase::Ready).await;
    }

    /// Rasterize the ready document.
    pub async fn export(&self, format: ExportFormat) -> Result<Download, PlacardError> {
        let document = {
            let s = self.state.borrow();
            if s.phase != ExportPhase::Ready {
                return Err(ExportError::NotReady.into());
            }
            if let Some(url) = s.unreachable_assets.first() {
                return Err(ExportError::Rasterize(format!("could not load image {}", url)).into());
            }
            s.document.clone().ok_or(ExportError::NotReady)?
        };

        if !document.has_root_node() {
            return Err(ExportError::NodeMissing.into());
        }

        let bytes = match format {
            ExportFormat::Png => self.rasterizer.to_png(&document).await,
            ExportFormat::Jpeg => self.rasterizer.to_jpeg(&document, JPEG_QUALITY).await,
        }
        .map_err(ExportError::Rasterize)?;

        if bytes.is_empty() {
            return Err(ExportError::Rasterize("empty capture".to_string()).into());
        }

        tracing::info!(
            format = format.extension(),
            width = document.dimensions.width,
            height = document.dimensions.height,
            bytes = bytes.len(),
            "flyer exported"
        );

        Ok(Download {
            filename: format.filename(),
            content_type: format.content_type(),
            bytes,
        })
    }
}

impl Drop for ExportPipeline {
    fn drop(&mut self) {
        if let Some(task) = self.settle_task.lock().ok().and_then(|mut t| t.take()) {
            task.abort();
        }
    }
}

/// Load every remote asset, then wait the grace interval, then mark ready.
async fn settle(
    state: Arc<watch::Sender<PipelineState>>,
    loader: Arc<dyn AssetLoader>,
    document: Arc<ComposedDocument>,
    generation: u64,
    grace: Duration,
) {
    let mut checks = JoinSet::new();
    for url in remote_asset_urls(&document.html) {
        let loader = loader.clone();
        checks.spawn(async move {
            let outcome = match tokio::time::timeout(ASSET_TIMEOUT, loader.load(&url)).await {
                Ok(result) => result,
                Err(_) => Err(format!("timed out loading {}", url)),
            };
            (url, outcome)
        });
    }

    let mut unreachable = Vec::new();
    while let Some(joined) = checks.join_next().await {
        if let Ok((url, Err(e))) = joined {
            tracing::warn!(url = %url, error = %e, "flyer asset failed to load");
            unreachable.push(url);
        }
    }
    unreachable.sort();

    let current = state.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        s.phase = ExportPhase::Settling;
        s.unreachable_assets = unreachable;
        true
    });
    if !current {
        return;
    }

    tokio::time::sleep(grace).await;

    state.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        s.phase = ExportPhase::Ready;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flyer::CanvasFormat;
    use crate::render::compose;
    use async_trait::async_trait;

    struct NoopLoader;

    #[async_trait]
    impl AssetLoader for NoopLoader {
        async fn load(&self, _url: &str) -> Result<(), String> {
            Ok(())
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl AssetLoader for FailingLoader {
        async fn load(&self, url: &str) -> Result<(), String> {
            Err(format!("blocked {}", url))
        }
    }

    /// Returns the document size encoded as bytes.
    struct EchoRasterizer;

    #[async_trait]
    impl Rasterizer for EchoRasterizer {
        async fn to_png(&self, document: &ComposedDocument) -> Result<Vec<u8>, String> {
            Ok(format!("{}x{}", document.dimensions.width, document.dimensions.height).into_bytes())
        }

        async fn to_jpeg(&self, document: &ComposedDocument, quality: u8) -> Result<Vec<u8>, String> {
            Ok(format!("jpeg{}:{}", quality, document.dimensions.width).into_bytes())
        }
    }

    struct BrokenRasterizer;

    #[async_trait]
    impl Rasterizer for BrokenRasterizer {
        async fn to_png(&self, _document: &ComposedDocument) -> Result<Vec<u8>, String> {
            Err("tainted canvas".to_string())
        }
    }

    fn pipeline(rasterizer: Arc<dyn Rasterizer>, loader: Arc<dyn AssetLoader>) -> ExportPipeline {
        ExportPipeline::new(rasterizer, loader, DEFAULT_SETTLE)
    }

    async fn settle_for(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_only_after_settle_interval() {
        let p = pipeline(Arc::new(EchoRasterizer), Arc::new(NoopLoader));
        assert_eq!(p.status().phase, ExportPhase::Empty);

        p.rebuild(compose("<p/>", CanvasFormat::Square.dimensions()));
        assert!(!p.is_ready());

        settle_for(100).await;
        assert_eq!(p.status().phase, ExportPhase::Settling);

        settle_for(250).await;
        assert!(p.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuild_resets_ready_immediately() {
        let p = pipeline(Arc::new(EchoRasterizer), Arc::new(NoopLoader));
        p.rebuild(compose("<p/>", CanvasFormat::Square.dimensions()));
        p.wait_ready().await;
        assert!(p.is_ready());

        p.rebuild(compose("<p>2</p>", CanvasFormat::Story.dimensions()));
        assert!(!p.is_ready());
        assert_eq!(p.status().generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_settle_never_marks_ready() {
        let p = pipeline(Arc::new(EchoRasterizer), Arc::new(NoopLoader));
        p.rebuild(compose("<p/>", CanvasFormat::Square.dimensions()));
        settle_for(200).await;
        p.rebuild(compose("<p/>", CanvasFormat::Story.dimensions()));

        // first cycle's deadline passes; second is still settling
        settle_for(150).await;
        assert!(!p.is_ready());

        settle_for(200).await;
        assert!(p.is_ready());
        let download = p.export(ExportFormat::Png).await.unwrap();
        assert_eq!(download.bytes, b"1080x1920");
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_not_ready() {
        let p = pipeline(Arc::new(EchoRasterizer), Arc::new(NoopLoader));
        let err = p.export(ExportFormat::Png).await.unwrap_err();
        assert!(matches!(err, PlacardError::Export(ExportError::NotReady)));

        p.rebuild(compose("<p/>", CanvasFormat::Square.dimensions()));
        let err = p.export(ExportFormat::Png).await.unwrap_err();
        assert!(matches!(err, PlacardError::Export(ExportError::NotReady)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_names_and_formats() {
        let p = pipeline(Arc::new(EchoRasterizer), Arc::new(NoopLoader));
        p.rebuild(compose("<p/>", CanvasFormat::Landscape.dimensions()));
        p.wait_ready().await;

        let png = p.export(ExportFormat::Png).await.unwrap();
        assert_eq!(png.filename, "flyer-design.png");
        assert_eq!(png.content_type, "image/png");

        let jpeg = p.export(ExportFormat::Jpeg).await.unwrap();
        assert_eq!(jpeg.filename, "flyer-design.jpeg");
        assert_eq!(jpeg.bytes, b"jpeg98:1920");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rasterize_failure_is_export_error() {
        let p = pipeline(Arc::new(BrokenRasterizer), Arc::new(NoopLoader));
        p.rebuild(compose("<p/>", CanvasFormat::Square.dimensions()));
        p.wait_ready().await;
        let err = p.export(ExportFormat::Jpeg).await.unwrap_err();
        assert!(matches!(err, PlacardError::Export(ExportError::Rasterize(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_asset_blocks_export() {
        let p = pipeline(Arc::new(EchoRasterizer), Arc::new(FailingLoader));
        let markup = r#"<div style="background-image: url('https://stock.test/bg.jpg')"></div>"#;
        p.rebuild(compose(markup, CanvasFormat::Square.dimensions()));
        p.wait_ready().await;

        assert_eq!(p.status().unreachable_assets, vec!["https://stock.test/bg.jpg"]);
        let err = p.export(ExportFormat::Png).await.unwrap_err();
        assert!(err.to_string().contains("uploaded background"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_root_node() {
        let p = pipeline(Arc::new(EchoRasterizer), Arc::new(NoopLoader));
        let doc = ComposedDocument {
            html: "<html></html>".to_string(),
            dimensions: CanvasFormat::Square.dimensions(),
        };
        p.rebuild(doc);
        p.wait_ready().await;
        let err = p.export(ExportFormat::Png).await.unwrap_err();
        assert!(matches!(err, PlacardError::Export(ExportError::NodeMissing)));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("JPG"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::parse("gif"), None);
    }
}
