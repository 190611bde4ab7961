//! folio-editor
//!
//! Local web shell for the report editor: serves the editor page and the
//! rendered preview, exposes the store and AI gateway over JSON, and bridges
//! print requests to the browser.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware as axum_mw;
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod bridge;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

/// Largest accepted request body. Inline 4K images travel as base64 JSON.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let origins = state.allowed_origins.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _| {
                origin
                    .to_str()
                    .is_ok_and(|o| origins.iter().any(|a| a == o))
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(routes::pages::editor))
        .route("/preview", get(routes::pages::preview))
        .route("/health", get(routes::pages::health))
        .route("/open-in-new-tab", get(routes::pages::open_in_new_tab))
        .route(
            "/api/report",
            get(routes::report::get_report).patch(routes::report::update_field),
        )
        .route(
            "/api/template",
            get(routes::template::get_template).put(routes::template::set_template),
        )
        .route(
            "/api/logos",
            post(routes::logos::upload_logo).delete(routes::logos::remove_logo),
        )
        .route("/api/logos/primary", post(routes::logos::select_primary))
        .route("/api/logos/secondary", post(routes::logos::toggle_secondary))
        .route("/api/properties", post(routes::properties::add_property))
        .route(
            "/api/properties/{id}",
            put(routes::properties::update_property)
                .delete(routes::properties::remove_property),
        )
        .route("/api/export", post(routes::export::run_export))
        .route("/api/export/session", get(routes::export::get_session))
        .route("/api/events", get(routes::events::events))
        .route("/api/print/started", post(routes::export::print_started))
        .route("/api/surface/fonts-ready", post(routes::export::fonts_ready))
        .route("/api/ai/generate", post(routes::ai::generate))
        .route("/api/ai/edit", post(routes::ai::edit))
        .route("/api/ai/analyze", post(routes::ai::analyze))
        .route("/api/ai/speech", post(routes::ai::speech))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::same_origin,
        ))
        .layer(cors)
        .layer(axum_mw::from_fn(middleware::request_log))
        .with_state(state)
}
