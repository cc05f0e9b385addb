//! Session lifecycle, option editing and the sandboxed preview.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::flyer::{FlyerOptions, catalog};
use crate::render::{self, ViewState};
use crate::session::SessionSnapshot;

use super::super::state::AppState;
use super::{ApiError, api_error, bad_request};

/// Response from session creation.
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub id: String,
    pub session: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct QrRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewportRequest {
    pub width: f64,
    /// Increases with every observation the page sends.
    #[serde(default)]
    pub seq: Option<u64>,
}

/// How the host page should size the preview frame.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportResponse {
    pub view: ViewState,
    /// Sequence number the view reflects.
    pub seq: Option<u64>,
    pub visible: bool,
    pub transform: String,
    pub transform_origin: &'static str,
    pub padding_bottom: Option<String>,
}

/// GET /api/catalog - Picker values for the designer UI.
pub async fn list_catalog() -> Json<catalog::Catalog> {
    Json(catalog::catalog())
}

/// POST /api/sessions - Start a session with default options.
pub async fn create(State(state): State<Arc<AppState>>) -> Json<CreateResponse> {
    let (id, session) = state.create_session().await;
    let snapshot = session.lock().await.snapshot();
    tracing::info!(session = %id, "session created");
    Json(CreateResponse {
        id: id.to_string(),
        session: snapshot,
    })
}

/// GET /api/sessions/:id - Current session state.
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.session(&id).await.map_err(api_error)?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(session.snapshot()))
}

/// PUT /api/sessions/:id/options - Replace all option fields.
pub async fn update_options(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(options): Json<FlyerOptions>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.session(&id).await.map_err(api_error)?;
    let mut session = session.lock().await;
    session.touch();
    session.set_options(options).map_err(api_error)?;
    Ok(Json(session.snapshot()))
}

/// PUT /api/sessions/:id/qr - Set or clear the QR link.
pub async fn update_qr(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<QrRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.session(&id).await.map_err(api_error)?;
    let mut session = session.lock().await;
    session.touch();
    session.set_qr_url(&req.url);
    Ok(Json(session.snapshot()))
}

/// PUT /api/sessions/:id/viewport - Report the preview container width.
pub async fn observe_viewport(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ViewportRequest>,
) -> Result<Json<ViewportResponse>, ApiError> {
    if !req.width.is_finite() || req.width < 0.0 {
        return Err(bad_request("width must be a non-negative number"));
    }
    let session = state.session(&id).await.map_err(api_error)?;
    let mut session = session.lock().await;
    session.touch();
    let view = match req.seq {
        Some(seq) => session.observe_viewport_sequenced(seq, req.width),
        None => session.observe_viewport(req.width),
    };
    let viewport = session.viewport();
    Ok(Json(ViewportResponse {
        view,
        seq: viewport.last_seq(),
        visible: viewport.is_visible(),
        transform: viewport.transform_css(),
        transform_origin: "top left",
        padding_bottom: viewport.padding_bottom_css(),
    }))
}

/// GET /api/sessions/:id/preview - The composed document, isolated from this origin.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.session(&id).await.map_err(api_error)?;
    let document = {
        let mut session = session.lock().await;
        session.touch();
        session.composed()
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CONTENT_SECURITY_POLICY, render::SANDBOX_CSP),
            (header::CACHE_CONTROL, "no-store"),
        ],
        document.html,
    ))
}
