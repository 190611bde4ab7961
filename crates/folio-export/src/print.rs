//! Export orchestration: validate the report, wait for the preview surface to
//! settle, then ask the host to print and watch whether a print dialog
//! actually opened.
//!
//! Every wait is bounded. A slow font or an image that never loads delays the
//! export by at most its timeout and is otherwise ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::{BoxFuture, join_all};
use serde::{Deserialize, Serialize, Serializer};
use tokio::sync::{oneshot, watch};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use folio_core::models::report::ReportData;

use crate::error::ExportError;

pub const STATUS_VALIDATING: &str = "Validating...";
pub const STATUS_LOADING_ASSETS: &str = "Loading assets...";
pub const STATUS_READY: &str = "Ready.";

pub const MSG_PRINT_OPENED: &str = "Print dialog opened.";
pub const MSG_PRINT_BLOCKED: &str =
    "Print blocked by the browser. Use the 'Open in new tab' button.";
pub const MSG_EXPORT_INTERRUPTED: &str = "Export interrupted.";

/// Bounds for each wait in an export, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportTimings {
    pub font_timeout_ms: u64,
    pub image_timeout_ms: u64,
    pub success_hold_ms: u64,
    pub print_delay_ms: u64,
    pub observation_window_ms: u64,
}

impl Default for ExportTimings {
    fn default() -> Self {
        Self {
            font_timeout_ms: 500,
            image_timeout_ms: 2000,
            success_hold_ms: 500,
            print_delay_ms: 50,
            observation_window_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintFeedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl PrintFeedback {
    fn success(message: &str) -> Self {
        Self {
            kind: FeedbackKind::Success,
            message: message.to_string(),
        }
    }

    fn info(message: &str) -> Self {
        Self {
            kind: FeedbackKind::Info,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            kind: FeedbackKind::Error,
            message: message.to_string(),
        }
    }
}

/// What the editor shows while and after an export runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSession {
    pub is_exporting: bool,
    pub progress: u8,
    pub status: String,
    pub success: bool,
    pub error: Option<String>,
    pub feedback: Option<PrintFeedback>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum ExportOutcome {
    PrintOpened,
    PrintBlocked,
    Failed(#[serde(serialize_with = "error_message")] ExportError),
    AlreadyRunning,
}

fn error_message<S: Serializer>(err: &ExportError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// The rendered document whose assets must settle before printing.
pub trait PreviewSurface: Send + Sync {
    /// Resolves once web fonts are usable.
    fn fonts_ready(&self) -> BoxFuture<'_, Result<(), String>>;

    /// One future per image, resolving when it has loaded or failed.
    fn image_loads(&self) -> Vec<BoxFuture<'_, ()>>;
}

/// The mechanism that actually prints.
pub trait PrintHost: Send + Sync {
    fn has_print_capability(&self) -> bool;

    /// Arm a one-shot observation that fires when a print dialog opens.
    /// Must be called before [`PrintHost::print`].
    fn arm_before_print(&self) -> oneshot::Receiver<()>;

    fn print(&self) -> Result<(), String>;
}

/// Check the fields a printable report cannot do without.
pub fn validate(data: &ReportData) -> Result<(), ExportError> {
    let mut missing = Vec::new();
    if data.company_name.trim().is_empty() {
        missing.push("company name");
    }
    if data.agent_name.trim().is_empty() {
        missing.push("agent name");
    }
    if data.properties.is_empty() {
        missing.push("property listings (at least 1)");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ExportError::Validation(format!(
            "Missing fields: {}.",
            missing.join(", ")
        )))
    }
}

/// Runs one export at a time and publishes its progress.
pub struct ExportOrchestrator {
    timings: ExportTimings,
    running: AtomicBool,
    session: watch::Sender<ExportSession>,
}

/// Clears the running flag even if the export future is dropped midway. A
/// session still marked as exporting at that point is reset.
struct RunGuard<'a> {
    running: &'a AtomicBool,
    session: &'a watch::Sender<ExportSession>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let interrupted = self.session.send_if_modified(|s| {
            if !s.is_exporting {
                return false;
            }
            *s = ExportSession {
                feedback: Some(PrintFeedback::info(MSG_EXPORT_INTERRUPTED)),
                ..Default::default()
            };
            true
        });
        if interrupted {
            warn!("export dropped before completion");
        }
        self.running.store(false, Ordering::Release);
    }
}

impl ExportOrchestrator {
    pub fn new(timings: ExportTimings) -> Self {
        let (session, _) = watch::channel(ExportSession::default());
        Self {
            timings,
            running: AtomicBool::new(false),
            session,
        }
    }

    pub fn timings(&self) -> ExportTimings {
        self.timings
    }

    pub fn session(&self) -> ExportSession {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExportSession> {
        self.session.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub async fn run<S, H>(&self, data: &ReportData, surface: &S, host: &H) -> ExportOutcome
    where
        S: PreviewSurface + ?Sized,
        H: PrintHost + ?Sized,
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("export already in progress, ignoring");
            return ExportOutcome::AlreadyRunning;
        }
        let _guard = RunGuard {
            running: &self.running,
            session: &self.session,
        };

        info!("export started");
        self.session.send_replace(ExportSession {
            is_exporting: true,
            progress: 10,
            status: STATUS_VALIDATING.to_string(),
            ..Default::default()
        });

        if let Err(e) = validate(data) {
            warn!(error = %e, "export validation failed");
            self.session.send_replace(ExportSession {
                error: Some(e.to_string()),
                ..Default::default()
            });
            return ExportOutcome::Failed(e);
        }

        self.session.send_modify(|s| {
            s.progress = 30;
            s.status = STATUS_LOADING_ASSETS.to_string();
        });
        self.wait_for_assets(surface).await;

        self.session.send_modify(|s| {
            s.progress = 100;
            s.success = true;
            s.status = STATUS_READY.to_string();
        });
        info!("export ready");

        sleep(Duration::from_millis(self.timings.success_hold_ms)).await;
        self.session.send_replace(ExportSession::default());
        sleep(Duration::from_millis(self.timings.print_delay_ms)).await;

        self.print(host).await
    }

    async fn wait_for_assets<S: PreviewSurface + ?Sized>(&self, surface: &S) {
        let font_limit = Duration::from_millis(self.timings.font_timeout_ms);
        match timeout(font_limit, surface.fonts_ready()).await {
            Ok(Ok(())) => debug!("fonts ready"),
            Ok(Err(e)) => debug!(error = %e, "font readiness failed, continuing"),
            Err(_) => debug!(timeout_ms = self.timings.font_timeout_ms, "font wait timed out"),
        }
        self.session.send_modify(|s| s.progress = 50);

        let images = surface.image_loads();
        let count = images.len();
        let image_limit = Duration::from_millis(self.timings.image_timeout_ms);
        match timeout(image_limit, join_all(images)).await {
            Ok(_) => debug!(count, "images settled"),
            Err(_) => debug!(
                count,
                timeout_ms = self.timings.image_timeout_ms,
                "image wait timed out, continuing"
            ),
        }
    }

    async fn print<H: PrintHost + ?Sized>(&self, host: &H) -> ExportOutcome {
        if !host.has_print_capability() {
            let e = ExportError::PrintUnavailable;
            error!("no print capability");
            self.session.send_modify(|s| s.error = Some(e.to_string()));
            return ExportOutcome::Failed(e);
        }

        let opened = host.arm_before_print();
        if let Err(detail) = host.print() {
            let e = ExportError::PrintInvocation(detail);
            error!(error = ?e, "print invocation failed");
            self.session
                .send_modify(|s| s.feedback = Some(PrintFeedback::error(&e.to_string())));
            return ExportOutcome::Failed(e);
        }

        let window = Duration::from_millis(self.timings.observation_window_ms);
        match timeout(window, opened).await {
            Ok(Ok(())) => {
                info!("print dialog opened");
                self.session
                    .send_modify(|s| s.feedback = Some(PrintFeedback::success(MSG_PRINT_OPENED)));
                ExportOutcome::PrintOpened
            }
            Ok(Err(_)) | Err(_) => {
                warn!(
                    window_ms = self.timings.observation_window_ms,
                    "no print dialog observed"
                );
                self.session
                    .send_modify(|s| s.feedback = Some(PrintFeedback::error(MSG_PRINT_BLOCKED)));
                ExportOutcome::PrintBlocked
            }
        }
    }
}
