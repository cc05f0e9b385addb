//! Handlers that call the remote content generator.
//!
//! The session lock is never held across a remote call. Inputs are captured
//! up front and results are applied afterwards, so edits made while a
//! request is in flight are not blocked.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::generator::{markup_or_fallback, prompt::VARIATION_INSTRUCTION};
use crate::intake::{ImageFile, ImageSlot};
use crate::session::SessionSnapshot;

use super::super::state::AppState;
use super::{ApiError, api_error};

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub variation: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// False when a newer generation request superseded this one.
    pub applied: bool,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct CopyResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct BackgroundRequest {
    pub prompt: String,
}

/// POST /api/sessions/:id/generate - Generate flyer markup.
///
/// A failed generation still succeeds at the HTTP level; the flyer shows the
/// error fragment instead.
pub async fn flyer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<GenerateRequest>>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let variation = body.map(|Json(b)| b.variation).unwrap_or(false);
    let session = state.session(&id).await.map_err(api_error)?;

    let request = {
        let mut session = session.lock().await;
        session.touch();
        session.begin_generation()
    };

    tracing::info!(
        session = %id,
        format = request.options.canvas_format.label(),
        variation,
        "generating flyer"
    );

    let markup = markup_or_fallback(
        state.generator.as_ref(),
        &request.options,
        request.flags,
        variation.then_some(VARIATION_INSTRUCTION),
    )
    .await;

    let mut session = session.lock().await;
    let applied = session.finish_generation(request.ticket, markup);
    Ok(Json(GenerateResponse {
        applied,
        session: session.snapshot(),
    }))
}

/// POST /api/sessions/:id/copy - Suggest primary text variants for the topic.
pub async fn copy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CopyResponse>, ApiError> {
    let session = state.session(&id).await.map_err(api_error)?;
    let (flyer_type, topic) = {
        let mut session = session.lock().await;
        session.touch();
        let options = session.options();
        (options.flyer_type, options.topic.clone())
    };

    let suggestions = state
        .generator
        .generate_copy_variants(flyer_type, &topic)
        .await
        .map_err(api_error)?;

    session
        .lock()
        .await
        .set_copy_suggestions(suggestions.clone());
    Ok(Json(CopyResponse { suggestions }))
}

/// POST /api/sessions/:id/background/prompt - Suggest a background image prompt.
pub async fn suggest_background_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PromptResponse>, ApiError> {
    let session = state.session(&id).await.map_err(api_error)?;
    let topic = {
        let mut session = session.lock().await;
        session.touch();
        session.options().topic.clone()
    };

    let prompt = state
        .generator
        .suggest_image_prompt(&topic)
        .await
        .map_err(api_error)?;
    Ok(Json(PromptResponse { prompt }))
}

/// POST /api/sessions/:id/background/generate - Generate a background image into its slot.
pub async fn background(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<BackgroundRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.session(&id).await.map_err(api_error)?;
    session.lock().await.touch();

    let data_url = state
        .generator
        .generate_image(&req.prompt)
        .await
        .map_err(api_error)?;
    let image = ImageFile::from_data_url("generated-background", &data_url).map_err(api_error)?;

    tracing::info!(session = %id, "background generated");

    let mut session = session.lock().await;
    session.set_image(ImageSlot::Background, Some(image));
    Ok(Json(session.snapshot()))
}
