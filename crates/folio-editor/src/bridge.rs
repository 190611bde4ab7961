//! The link between the export orchestrator and the editor page.
//!
//! The page holds an SSE connection open. A `print` event asks it to call
//! `window.print()`; its `beforeprint` listener posts back, which fires the
//! orchestrator's observation. Font readiness arrives the same way, and
//! image readiness is probed from the server side.
//!
//! With several pages open, only the most recently connected one is asked to
//! print.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot, watch};
use tracing::{debug, info};

use folio_core::models::image::{InlineImage, is_data_uri};
use folio_export::print::{ExportSession, PreviewSurface, PrintHost};

const EVENT_BUFFER: usize = 32;
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything pushed to connected editor pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// Call `window.print()` on the preview of the given page.
    Print { page: u64 },
    /// The report or template changed; reload the preview.
    Report,
    Session(ExportSession),
}

impl BridgeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Print { .. } => "print",
            Self::Report => "report",
            Self::Session(_) => "session",
        }
    }
}

pub struct PrintBridge {
    events: broadcast::Sender<BridgeEvent>,
    next_page: AtomicU64,
    /// Connected page ids, oldest first.
    pages: Arc<Mutex<Vec<u64>>>,
    armed: Mutex<Option<oneshot::Sender<()>>>,
    fonts: watch::Sender<bool>,
    agent: ureq::Agent,
}

/// One connected page. Dropping it disconnects.
pub struct BridgeClient {
    id: u64,
    events: broadcast::Receiver<BridgeEvent>,
    pages: Arc<Mutex<Vec<u64>>>,
}

impl BridgeClient {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event for this page. Print requests aimed at other pages are
    /// skipped.
    pub async fn recv(&mut self) -> Result<BridgeEvent, RecvError> {
        loop {
            let event = self.events.recv().await?;
            if let BridgeEvent::Print { page } = &event
                && *page != self.id
            {
                continue;
            }
            return Ok(event);
        }
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        let mut pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        pages.retain(|&p| p != self.id);
        debug!(page = self.id, remaining = pages.len(), "editor page disconnected");
    }
}

impl Default for PrintBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintBridge {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (fonts, _) = watch::channel(false);
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(PROBE_TIMEOUT))
            .build()
            .into();
        Self {
            events,
            next_page: AtomicU64::new(1),
            pages: Arc::new(Mutex::new(Vec::new())),
            armed: Mutex::new(None),
            fonts,
            agent,
        }
    }

    pub fn connect(&self) -> BridgeClient {
        let id = self.next_page.fetch_add(1, Ordering::Relaxed);
        let events = self.events.subscribe();
        let count = {
            let mut pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
            pages.push(id);
            pages.len()
        };
        info!(page = id, clients = count, "editor page connected");
        BridgeClient {
            id,
            events,
            pages: self.pages.clone(),
        }
    }

    pub fn client_count(&self) -> usize {
        self.pages.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn newest_page(&self) -> Option<u64> {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }

    /// Tell pages the report changed. Fonts must be reported ready again by
    /// the reloaded preview.
    pub fn report_changed(&self) {
        self.fonts.send_replace(false);
        let _ = self.events.send(BridgeEvent::Report);
    }

    pub fn publish_session(&self, session: ExportSession) {
        let _ = self.events.send(BridgeEvent::Session(session));
    }

    /// The page's `beforeprint` fired. Returns whether an export was
    /// waiting for it.
    pub fn print_started(&self) -> bool {
        let armed = self
            .armed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match armed {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    pub fn fonts_ready(&self) {
        self.fonts.send_replace(true);
    }

    /// A preview surface for the given image sources.
    pub fn surface(&self, image_sources: Vec<String>) -> BrowserSurface<'_> {
        BrowserSurface {
            bridge: self,
            image_sources,
        }
    }
}

/// Forward every session change to connected pages until the orchestrator
/// goes away.
pub fn forward_sessions(bridge: Arc<PrintBridge>, mut sessions: watch::Receiver<ExportSession>) {
    tokio::spawn(async move {
        while sessions.changed().await.is_ok() {
            let session = sessions.borrow_and_update().clone();
            bridge.publish_session(session);
        }
    });
}

impl PrintHost for PrintBridge {
    fn has_print_capability(&self) -> bool {
        self.client_count() > 0
    }

    fn arm_before_print(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        *self.armed.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        rx
    }

    fn print(&self) -> Result<(), String> {
        let page = self
            .newest_page()
            .ok_or_else(|| "no editor page is connected".to_string())?;
        self.events
            .send(BridgeEvent::Print { page })
            .map(|_| debug!(page, "print requested"))
            .map_err(|_| "no editor page is connected".to_string())
    }
}

pub struct BrowserSurface<'a> {
    bridge: &'a PrintBridge,
    image_sources: Vec<String>,
}

impl PreviewSurface for BrowserSurface<'_> {
    fn fonts_ready(&self) -> BoxFuture<'_, Result<(), String>> {
        let mut rx = self.bridge.fonts.subscribe();
        async move {
            rx.wait_for(|ready| *ready)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
        .boxed()
    }

    fn image_loads(&self) -> Vec<BoxFuture<'_, ()>> {
        self.image_sources
            .iter()
            .map(|src| probe_image(&self.bridge.agent, src))
            .collect()
    }
}

/// Settle one image. Success and failure both count as settled.
fn probe_image<'a>(agent: &ureq::Agent, src: &'a str) -> BoxFuture<'a, ()> {
    if is_data_uri(src) {
        if let Err(e) = InlineImage::from_data_uri(src) {
            debug!(error = %e, "inline image does not decode");
        }
        return futures::future::ready(()).boxed();
    }
    if !(src.starts_with("http://") || src.starts_with("https://")) {
        return futures::future::ready(()).boxed();
    }

    let agent = agent.clone();
    let url = src.to_string();
    async move {
        let probe = tokio::task::spawn_blocking(move || agent.head(&url).call().map(|r| r.status()));
        match probe.await {
            Ok(Ok(status)) => debug!(%status, "image reachable"),
            Ok(Err(e)) => debug!(error = %e, "image unreachable"),
            Err(e) => debug!(error = %e, "image probe task failed"),
        }
    }
    .boxed()
}
