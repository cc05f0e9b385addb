//! Server state and configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::PlacardError;
use crate::export::{
    ASSET_TIMEOUT, AssetLoader, ChromeRasterizer, ExportPipeline, HttpAssetLoader, Rasterizer,
};
use crate::generator::{ContentGenerator, GeminiClient, GeneratorConfig};
use crate::qr::{PngQrEncoder, QrEncoder};
use crate::session::FlyerSession;

/// Sessions idle longer than this are dropped.
pub const SESSION_EXPIRATION_SECS: u64 = 3600;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Remote generator settings
    pub generator: GeneratorConfig,
    /// Headless browser used for exports
    pub browser: PathBuf,
    /// Extra flags passed to the browser
    pub browser_args: Vec<String>,
    /// Grace period between document load and export readiness
    pub settle: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            generator: GeneratorConfig::default(),
            browser: PathBuf::from("chromium"),
            browser_args: Vec::new(),
            settle: crate::export::DEFAULT_SETTLE,
        }
    }
}

pub type SharedSession = Arc<Mutex<FlyerSession>>;

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
    pub sessions: RwLock<HashMap<Uuid, SharedSession>>,
    pub generator: Arc<dyn ContentGenerator>,
    pub rasterizer: Arc<dyn Rasterizer>,
    pub loader: Arc<dyn AssetLoader>,
    pub qr: Arc<dyn QrEncoder>,
}

impl AppState {
    /// Build state with the production collaborators.
    pub fn new(config: ServerConfig) -> Result<Self, PlacardError> {
        let generator = Arc::new(GeminiClient::new(config.generator.clone())?);
        let mut rasterizer = ChromeRasterizer::new(config.browser.clone());
        rasterizer.extra_args = config.browser_args.clone();
        let loader = Arc::new(HttpAssetLoader::new(ASSET_TIMEOUT).map_err(PlacardError::Config)?);
        Ok(Self::with_services(
            config,
            generator,
            Arc::new(rasterizer),
            loader,
            Arc::new(PngQrEncoder::default()),
        ))
    }

    /// Build state around explicit collaborators.
    pub fn with_services(
        config: ServerConfig,
        generator: Arc<dyn ContentGenerator>,
        rasterizer: Arc<dyn Rasterizer>,
        loader: Arc<dyn AssetLoader>,
        qr: Arc<dyn QrEncoder>,
    ) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            config,
            boot_time,
            sessions: RwLock::new(HashMap::new()),
            generator,
            rasterizer,
            loader,
            qr,
        }
    }

    /// Create and register a fresh session.
    pub async fn create_session(&self) -> (Uuid, SharedSession) {
        let export = ExportPipeline::new(
            self.rasterizer.clone(),
            self.loader.clone(),
            self.config.settle,
        );
        let session = Arc::new(Mutex::new(FlyerSession::new(export, self.qr.clone())));
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, session.clone());
        (id, session)
    }

    /// Look up a session by its string id.
    pub async fn session(&self, id: &str) -> Result<SharedSession, PlacardError> {
        let id = Uuid::parse_str(id)
            .map_err(|_| PlacardError::Session("Invalid session ID".to_string()))?;
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PlacardError::Session("Session not found or expired".to_string()))
    }
}
