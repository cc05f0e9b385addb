//! Image slot handlers: uploads, stock/remote images and clearing.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::intake::{ImageFile, ImageSlot};
use crate::session::SessionSnapshot;

use super::super::state::AppState;
use super::{ApiError, api_error, bad_request};

#[derive(Debug, Deserialize)]
pub struct RemoteImageRequest {
    pub url: String,
}

fn parse_slot(slot: &str) -> Result<ImageSlot, ApiError> {
    ImageSlot::parse(slot).ok_or_else(|| bad_request(format!("Unknown image slot: {}", slot)))
}

/// POST /api/sessions/:id/images/:slot - Upload an image file.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let slot = parse_slot(&slot)?;
    let session = state.session(&id).await.map_err(api_error)?;

    // Extract the image field from multipart
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("Failed to read image: {}", e)))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) = upload.ok_or_else(|| bad_request("No image field found"))?;

    // Encoding a large upload is CPU work
    let image = tokio::task::spawn_blocking(move || ImageFile::from_bytes(filename, &bytes))
        .await
        .map_err(|e| bad_request(format!("Processing error: {}", e)))?
        .map_err(api_error)?;

    tracing::info!(session = %id, slot = ?slot, name = %image.name, "image uploaded");

    let mut session = session.lock().await;
    session.touch();
    session.set_image(slot, Some(image));
    Ok(Json(session.snapshot()))
}

/// PUT /api/sessions/:id/images/:slot - Use a stock or remote image by URL.
pub async fn set_remote(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(String, String)>,
    Json(req): Json<RemoteImageRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let slot = parse_slot(&slot)?;
    let url = req.url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(bad_request("Image URL must be http(s)"));
    }
    // The server fetches this URL before export, so it must be public.
    if let Err(reason) = state.loader.admit(url).await {
        tracing::warn!(session = %id, url = %url, reason = %reason, "remote image refused");
        return Err(bad_request(reason));
    }

    let session = state.session(&id).await.map_err(api_error)?;
    let mut session = session.lock().await;
    session.touch();
    session.set_image(slot, Some(ImageFile::from_stock(url)));
    Ok(Json(session.snapshot()))
}

/// DELETE /api/sessions/:id/images/:slot - Empty a slot.
pub async fn clear(
    State(state): State<Arc<AppState>>,
    Path((id, slot)): Path<(String, String)>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let slot = parse_slot(&slot)?;
    let session = state.session(&id).await.map_err(api_error)?;
    let mut session = session.lock().await;
    session.touch();
    session.set_image(slot, None);
    Ok(Json(session.snapshot()))
}
