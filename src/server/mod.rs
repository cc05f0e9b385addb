//! # HTTP Server for Flyer Design
//!
//! Serves the designer UI and a JSON API over per-user in-memory sessions.
//!
//! ## Usage
//!
//! ```bash
//! GEMINI_API_KEY=... placard serve --listen 0.0.0.0:8080 --chrome chromium
//! ```
//!
//! Then open http://localhost:8080 in a browser.

mod handlers;
mod state;
mod static_files;

pub use state::{AppState, SESSION_EXPIRATION_SECS, ServerConfig, SharedSession};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;

use crate::error::PlacardError;

/// Uploads (logo, speaker, background) are capped at 20MB.
const UPLOAD_LIMIT: usize = 20 * 1024 * 1024;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Frontend
        .route("/", get(static_files::index_handler))
        .route("/assets/*path", get(static_files::asset_handler))
        // Catalog
        .route("/api/catalog", get(handlers::sessions::list_catalog))
        // Sessions
        .route("/api/sessions", post(handlers::sessions::create))
        .route("/api/sessions/:id", get(handlers::sessions::show))
        .route("/api/sessions/:id/options", put(handlers::sessions::update_options))
        .route("/api/sessions/:id/qr", put(handlers::sessions::update_qr))
        .route("/api/sessions/:id/viewport", put(handlers::sessions::observe_viewport))
        .route("/api/sessions/:id/preview", get(handlers::sessions::preview))
        // Images
        .route(
            "/api/sessions/:id/images/:slot",
            post(handlers::images::upload)
                .put(handlers::images::set_remote)
                .delete(handlers::images::clear)
                .layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        // Generation
        .route("/api/sessions/:id/generate", post(handlers::generate::flyer))
        .route("/api/sessions/:id/copy", post(handlers::generate::copy))
        .route(
            "/api/sessions/:id/background/prompt",
            post(handlers::generate::suggest_background_prompt),
        )
        .route(
            "/api/sessions/:id/background/generate",
            post(handlers::generate::background),
        )
        // Export
        .route("/api/sessions/:id/export", get(handlers::export::status))
        .route("/api/sessions/:id/export/:format", get(handlers::export::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use placard::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), placard::error::PlacardError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), PlacardError> {
    if config.generator.api_key.is_none() {
        tracing::warn!("no API key configured; generation requests will show an error fragment");
    }

    let app_state = Arc::new(AppState::new(config.clone())?);

    // Spawn background session cleanup task
    tokio::spawn(cleanup_sessions(app_state.clone()));

    let app = router(app_state);

    tracing::info!(
        listen = %config.listen_addr,
        browser = %config.browser.display(),
        "placard HTTP server starting"
    );

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            PlacardError::Config(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PlacardError::Io(std::io::Error::other(e)))?;

    Ok(())
}

/// Background task to drop idle sessions.
async fn cleanup_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    let expiration = Duration::from_secs(SESSION_EXPIRATION_SECS);

    loop {
        interval.tick().await;
        let now = Instant::now();

        let sessions: Vec<_> = state
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, s)| (*id, s.clone()))
            .collect();

        let mut expired = Vec::new();
        for (id, session) in sessions {
            // a busy session is in use, so not idle
            if let Ok(s) = session.try_lock()
                && now.duration_since(s.last_accessed) >= expiration
            {
                expired.push(id);
            }
        }

        if !expired.is_empty() {
            let mut map = state.sessions.write().await;
            for id in &expired {
                map.remove(id);
            }
            tracing::info!(
                removed = expired.len(),
                remaining = map.len(),
                "cleaned up expired sessions"
            );
        }
    }
}
