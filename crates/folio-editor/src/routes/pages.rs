use axum::Json;
use axum::extract::State;
use axum::response::{Html, Redirect};
use serde_json::{Value, json};

use folio_export::render::render_report;

use crate::error::ApiError;
use crate::state::AppState;

const EDITOR_PAGE: &str = include_str!("../../assets/editor.html");

pub async fn editor() -> Html<&'static str> {
    Html(EDITOR_PAGE)
}

/// The report as it will print, in the selected layout.
pub async fn preview(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let (data, template) = {
        let store = state.store.lock().await;
        (store.data().clone(), store.template())
    };
    let rendered = render_report(&data, template)?;
    Ok(Html(rendered.html))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn open_in_new_tab(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.fallback_url)
}
