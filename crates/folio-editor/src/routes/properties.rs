use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use folio_core::models::report::Property;

use crate::error::ApiError;
use crate::state::AppState;

/// A listing without an id; the server assigns one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PropertyDraft {
    pub title: String,
    pub address: String,
    pub price: String,
    pub features: Vec<String>,
    pub image: String,
}

pub async fn add_property(
    State(state): State<AppState>,
    Json(draft): Json<PropertyDraft>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    let property = Property {
        address: draft.address,
        price: draft.price,
        features: draft.features,
        image: draft.image,
        ..Property::new(draft.title)
    };
    let stored = property.clone();
    state
        .with_store(move |store| store.add_property(stored))
        .await?;
    state.bridge.report_changed();
    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut property): Json<Property>,
) -> Result<Json<Property>, ApiError> {
    property.id = id;
    let stored = property.clone();
    state
        .with_store(move |store| store.update_property(stored))
        .await??;
    state.bridge.report_changed();
    Ok(Json(property))
}

pub async fn remove_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>, ApiError> {
    let removed = state
        .with_store(move |store| store.remove_property(&id))
        .await??;
    state.bridge.report_changed();
    Ok(Json(removed))
}
