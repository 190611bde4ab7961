use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use folio_core::models::template::ReportTemplate;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateBody {
    pub template: String,
}

pub async fn get_template(State(state): State<AppState>) -> Json<TemplateBody> {
    let template = state.store.lock().await.template();
    Json(TemplateBody {
        template: template.to_string(),
    })
}

pub async fn set_template(
    State(state): State<AppState>,
    Json(body): Json<TemplateBody>,
) -> Result<Json<TemplateBody>, ApiError> {
    let template: ReportTemplate = body.template.parse()?;
    state
        .with_store(move |store| store.set_template(template))
        .await?;
    state.bridge.report_changed();
    Ok(Json(TemplateBody {
        template: template.to_string(),
    }))
}
