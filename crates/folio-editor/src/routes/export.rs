use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use folio_export::print::{ExportOutcome, ExportSession};
use folio_export::render::image_sources;

use crate::error::ApiError;
use crate::state::AppState;

/// Run one export against the connected editor page.
///
/// Responds once the export reaches a terminal state. A second request
/// while one is running answers `already_running` immediately. The export
/// runs on its own task, so a client that hangs up does not cut it short.
pub async fn run_export(State(state): State<AppState>) -> Result<Json<ExportOutcome>, ApiError> {
    let data = state.store.lock().await.data().clone();

    let task = tokio::spawn(async move {
        let surface = state.bridge.surface(image_sources(&data));
        state
            .orchestrator
            .run(&data, &surface, state.bridge.as_ref())
            .await
    });
    let outcome = task
        .await
        .map_err(|e| ApiError::Internal(format!("export task failed: {e}")))?;
    tracing::info!(?outcome, "export finished");
    Ok(Json(outcome))
}

pub async fn get_session(State(state): State<AppState>) -> Json<ExportSession> {
    Json(state.orchestrator.session())
}

/// Posted by the page's `beforeprint` listener.
pub async fn print_started(State(state): State<AppState>) -> Json<Value> {
    let observed = state.bridge.print_started();
    Json(json!({ "observed": observed }))
}

/// Posted by the preview once `document.fonts.ready` resolves.
pub async fn fonts_ready(State(state): State<AppState>) -> StatusCode {
    state.bridge.fonts_ready();
    StatusCode::NO_CONTENT
}
