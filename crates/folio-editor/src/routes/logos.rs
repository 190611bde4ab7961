use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use folio_core::models::report::ReportData;
use folio_storage::upload::image_from_upload;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogoRef {
    pub logo: String,
}

#[derive(Debug, Serialize)]
pub struct LogoSaved {
    pub logo: String,
    pub report: ReportData,
}

/// Save an uploaded image as the primary logo. The body is the raw image.
pub async fn upload_logo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LogoSaved>, ApiError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let image = image_from_upload(content_type, body.to_vec())?;

    let saved = state
        .with_store(move |store| {
            let logo = store.add_logo(&image);
            LogoSaved {
                logo,
                report: store.data().clone(),
            }
        })
        .await?;
    state.bridge.report_changed();
    Ok(Json(saved))
}

pub async fn select_primary(
    State(state): State<AppState>,
    Json(body): Json<LogoRef>,
) -> Result<Json<ReportData>, ApiError> {
    let data = state
        .with_store(move |store| {
            store.select_primary(&body.logo)?;
            Ok::<_, ApiError>(store.data().clone())
        })
        .await??;
    state.bridge.report_changed();
    Ok(Json(data))
}

pub async fn toggle_secondary(
    State(state): State<AppState>,
    Json(body): Json<LogoRef>,
) -> Result<Json<ReportData>, ApiError> {
    let data = state
        .with_store(move |store| {
            store.toggle_secondary(&body.logo)?;
            Ok::<_, ApiError>(store.data().clone())
        })
        .await??;
    state.bridge.report_changed();
    Ok(Json(data))
}

pub async fn remove_logo(
    State(state): State<AppState>,
    Json(body): Json<LogoRef>,
) -> Result<Json<ReportData>, ApiError> {
    let data = state
        .with_store(move |store| {
            store.remove_logo(&body.logo);
            store.data().clone()
        })
        .await?;
    state.bridge.report_changed();
    Ok(Json(data))
}
