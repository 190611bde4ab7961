use axum::Json;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use folio_core::models::generation::{AspectRatio, ImageSize};
use folio_core::models::image::InlineImage;
use folio_genai::client::SharedBackend;
use folio_genai::{image, speech};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub image_size: ImageSize,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    /// Data URI of the source image.
    pub image: String,
    pub instruction: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub image: String,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    /// Data URI of the produced image.
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub text: String,
}

fn backend(state: &AppState) -> Result<&SharedBackend, ApiError> {
    state
        .genai
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("API key not found".to_string()))
}

fn require(value: &str, what: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{what} is required")));
    }
    Ok(())
}

pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    require(&req.prompt, "prompt")?;
    let backend = backend(&state)?;
    let image = image::generate_image(
        backend,
        &state.models,
        &req.prompt,
        req.aspect_ratio,
        req.image_size,
    )
    .await?;
    Ok(Json(ImageResponse {
        image: image.to_data_uri(),
    }))
}

pub async fn edit(
    State(state): State<AppState>,
    Json(req): Json<EditRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    require(&req.instruction, "instruction")?;
    let source = InlineImage::from_data_uri(&req.image)?;
    let backend = backend(&state)?;
    let edited = image::edit_image(backend, &state.models, &source, &req.instruction).await?;
    Ok(Json(ImageResponse {
        image: edited.to_data_uri(),
    }))
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let source = InlineImage::from_data_uri(&req.image)?;
    let backend = backend(&state)?;
    let text = image::analyze_image(backend, &state.models, &source, &req.prompt).await?;
    Ok(Json(AnalysisResponse { text }))
}

/// Synthesized speech as a WAV file.
pub async fn speech(
    State(state): State<AppState>,
    Json(req): Json<SpeechRequest>,
) -> Result<Response, ApiError> {
    require(&req.text, "text")?;
    let backend = backend(&state)?;
    let audio = speech::generate_speech(backend, &state.models, &req.text).await?;
    Ok(([(CONTENT_TYPE, "audio/wav")], audio.to_wav()).into_response())
}
