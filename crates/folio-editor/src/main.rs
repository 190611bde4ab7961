use std::sync::Arc;

use eyre::Result;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use folio_editor::bridge::{self, PrintBridge};
use folio_editor::config;
use folio_editor::state::{self, AppState};
use folio_export::print::ExportOrchestrator;
use folio_genai::client::{GeminiClient, SharedBackend};
use folio_storage::backend::FileStorage;
use folio_storage::store::ReportStore;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("FOLIO_LOG_JSON").is_ok_and(|v| v == "1") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let mut config = config::load_or_init(&config::config_path()?)?;
    config.apply_overrides(|name| std::env::var(name).ok());

    let data_dir = config.resolved_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let store = ReportStore::open(FileStorage::new(data_dir.clone()));

    let genai = match config.api_key.as_deref() {
        Some(key) => match GeminiClient::new(key, &config.genai) {
            Ok(client) => Some(SharedBackend::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "generation service disabled");
                None
            }
        },
        None => {
            tracing::warn!("no API key configured, AI tools are disabled");
            None
        }
    };

    let orchestrator = Arc::new(ExportOrchestrator::new(config.timings));
    let print_bridge = Arc::new(PrintBridge::new());
    bridge::forward_sessions(print_bridge.clone(), orchestrator.subscribe());

    let listener = tokio::net::TcpListener::bind(config.bind.as_str()).await?;
    let addr = listener.local_addr()?;

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        orchestrator,
        bridge: print_bridge,
        genai,
        models: config.genai.models.clone(),
        fallback_url: config.fallback_url.clone(),
        allowed_origins: state::local_origins(addr),
    };

    let app = folio_editor::router(state);

    tracing::info!(
        addr = %addr,
        data_dir = %data_dir.display(),
        "folio editor listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
