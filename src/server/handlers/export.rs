//! Export readiness and downloads.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::export::{ExportFormat, ExportStatus};

use super::super::state::AppState;
use super::{ApiError, api_error, bad_request};

/// GET /api/sessions/:id/export - Whether the export copy has settled.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExportStatus>, ApiError> {
    let session = state.session(&id).await.map_err(api_error)?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(session.export().status()))
}

/// GET /api/sessions/:id/export/:format - Rasterize and download the flyer.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((id, format)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let format = ExportFormat::parse(&format)
        .ok_or_else(|| bad_request(format!("Unknown export format: {}", format)))?;
    let session = state.session(&id).await.map_err(api_error)?;

    // Clone the pipeline handle to release the lock before rasterizing
    let pipeline = {
        let mut session = session.lock().await;
        session.touch();
        session.export().clone()
    };

    let download = pipeline.export(format).await.map_err(api_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.filename),
            ),
        ],
        download.bytes,
    ))
}
