use axum::Json;
use axum::extract::State;

use folio_core::models::field::FieldUpdate;
use folio_core::models::report::ReportData;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_report(State(state): State<AppState>) -> Json<ReportData> {
    Json(state.store.lock().await.data().clone())
}

/// Replace one field and persist.
pub async fn update_field(
    State(state): State<AppState>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<ReportData>, ApiError> {
    let data = state
        .with_store(move |store| {
            store.update(update)?;
            Ok::<_, ApiError>(store.data().clone())
        })
        .await??;
    state.bridge.report_changed();
    Ok(Json(data))
}
