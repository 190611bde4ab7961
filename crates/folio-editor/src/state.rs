use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;

use folio_export::print::ExportOrchestrator;
use folio_genai::client::{ModelSet, SharedBackend};
use folio_storage::store::ReportStore;

use crate::bridge::PrintBridge;
use crate::error::ApiError;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ReportStore>>,
    pub orchestrator: Arc<ExportOrchestrator>,
    pub bridge: Arc<PrintBridge>,
    /// `None` when no API key is configured.
    pub genai: Option<SharedBackend>,
    pub models: ModelSet,
    pub fallback_url: String,
    /// Origins allowed to call the API, e.g. `http://127.0.0.1:4173`.
    pub allowed_origins: Arc<[String]>,
}

impl AppState {
    /// Run `f` against the store on the blocking pool. Store mutations write
    /// through to disk.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut ReportStore) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&mut store.blocking_lock()))
            .await
            .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))
    }
}

/// Origins under which the editor page can be served from `addr`.
pub fn local_origins(addr: SocketAddr) -> Arc<[String]> {
    let mut origins = vec![format!("http://{addr}")];
    if addr.ip().is_loopback() {
        origins.push(format!("http://localhost:{}", addr.port()));
    }
    origins.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_binds_also_allow_localhost() {
        let origins = local_origins("127.0.0.1:4173".parse().unwrap());
        assert_eq!(
            origins.as_ref(),
            ["http://127.0.0.1:4173", "http://localhost:4173"]
        );

        let origins = local_origins("192.168.1.5:80".parse().unwrap());
        assert_eq!(origins.as_ref(), ["http://192.168.1.5:80"]);
    }
}
