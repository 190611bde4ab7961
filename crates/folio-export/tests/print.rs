use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, pending};
use tokio::sync::oneshot;
use tokio::time::Instant;

use folio_core::models::report::{Property, ReportData};
use folio_export::error::ExportError;
use folio_export::print::{
    ExportOrchestrator, ExportOutcome, ExportTimings, FeedbackKind, MSG_EXPORT_INTERRUPTED,
    MSG_PRINT_BLOCKED, MSG_PRINT_OPENED, PreviewSurface, PrintHost,
};

/// A surface whose fonts are ready and whose images never finish loading.
struct StuckSurface {
    images: usize,
}

impl PreviewSurface for StuckSurface {
    fn fonts_ready(&self) -> BoxFuture<'_, Result<(), String>> {
        async { Ok(()) }.boxed()
    }

    fn image_loads(&self) -> Vec<BoxFuture<'_, ()>> {
        (0..self.images).map(|_| pending::<()>().boxed()).collect()
    }
}

/// A surface whose fonts never report ready and whose images load at once.
struct FontlessSurface;

impl PreviewSurface for FontlessSurface {
    fn fonts_ready(&self) -> BoxFuture<'_, Result<(), String>> {
        pending::<Result<(), String>>().boxed()
    }

    fn image_loads(&self) -> Vec<BoxFuture<'_, ()>> {
        vec![async {}.boxed()]
    }
}

struct ReadySurface;

impl PreviewSurface for ReadySurface {
    fn fonts_ready(&self) -> BoxFuture<'_, Result<(), String>> {
        async { Err("font face failed".to_string()) }.boxed()
    }

    fn image_loads(&self) -> Vec<BoxFuture<'_, ()>> {
        vec![async {}.boxed(), async {}.boxed()]
    }
}

#[derive(Default)]
struct FakeHost {
    unsupported: bool,
    fail_print: bool,
    dialog_opens: bool,
    prints: AtomicUsize,
    armed: Mutex<Option<oneshot::Sender<()>>>,
}

impl FakeHost {
    fn opening() -> Self {
        Self {
            dialog_opens: true,
            ..Default::default()
        }
    }

    fn prints(&self) -> usize {
        self.prints.load(Ordering::SeqCst)
    }
}

impl PrintHost for FakeHost {
    fn has_print_capability(&self) -> bool {
        !self.unsupported
    }

    fn arm_before_print(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        *self.armed.lock().unwrap() = Some(tx);
        rx
    }

    fn print(&self) -> Result<(), String> {
        self.prints.fetch_add(1, Ordering::SeqCst);
        if self.fail_print {
            return Err("window.print threw".to_string());
        }
        if self.dialog_opens
            && let Some(tx) = self.armed.lock().unwrap().take()
        {
            let _ = tx.send(());
        }
        Ok(())
    }
}

fn valid_report() -> ReportData {
    let mut data = ReportData::default();
    data.company_name = "Acme".to_string();
    data.agent_name = "J. Doe".to_string();
    data.properties = vec![Property::new("Loft")];
    data
}

#[tokio::test(start_paused = true)]
async fn missing_company_fails_validation_without_printing() {
    let orchestrator = ExportOrchestrator::new(ExportTimings::default());
    let host = FakeHost::opening();
    let mut data = valid_report();
    data.company_name = String::new();

    let outcome = orchestrator.run(&data, &ReadySurface, &host).await;

    match outcome {
        ExportOutcome::Failed(ExportError::Validation(msg)) => {
            assert!(msg.contains("company"));
            assert!(!msg.contains("agent"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(host.prints(), 0);
    let session = orchestrator.session();
    assert!(!session.is_exporting);
    assert_eq!(
        session.error.as_deref(),
        Some("Missing fields: company name.")
    );
}

#[tokio::test(start_paused = true)]
async fn valid_report_reaches_full_progress_and_prints_once() {
    let orchestrator = ExportOrchestrator::new(ExportTimings::default());
    let host = FakeHost::opening();

    let mut rx = orchestrator.subscribe();
    let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
    let recorder = {
        let seen = seen.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let progress = rx.borrow_and_update().progress;
                seen.lock().unwrap().push(progress);
            }
        })
    };

    let outcome = orchestrator.run(&valid_report(), &ReadySurface, &host).await;
    recorder.abort();

    assert_eq!(outcome, ExportOutcome::PrintOpened);
    assert_eq!(host.prints(), 1);
    assert!(seen.lock().unwrap().contains(&100));

    let session = orchestrator.session();
    assert!(!session.is_exporting);
    let feedback = session.feedback.unwrap();
    assert_eq!(feedback.kind, FeedbackKind::Success);
    assert_eq!(feedback.message, MSG_PRINT_OPENED);
}

#[tokio::test(start_paused = true)]
async fn images_that_never_load_only_delay_by_the_timeout() {
    let timings = ExportTimings::default();
    let orchestrator = ExportOrchestrator::new(timings);
    let host = FakeHost::opening();
    let started = Instant::now();

    let outcome = orchestrator
        .run(&valid_report(), &StuckSurface { images: 3 }, &host)
        .await;

    assert_eq!(outcome, ExportOutcome::PrintOpened);
    let bound = timings.image_timeout_ms + timings.success_hold_ms + timings.print_delay_ms;
    assert!(started.elapsed() >= Duration::from_millis(timings.image_timeout_ms));
    assert!(started.elapsed() <= Duration::from_millis(bound + 10));
}

#[tokio::test(start_paused = true)]
async fn fonts_that_never_settle_only_delay_by_the_timeout() {
    let timings = ExportTimings::default();
    let orchestrator = ExportOrchestrator::new(timings);
    let host = FakeHost::opening();
    let started = Instant::now();

    let outcome = orchestrator
        .run(&valid_report(), &FontlessSurface, &host)
        .await;

    assert_eq!(outcome, ExportOutcome::PrintOpened);
    assert_eq!(host.prints(), 1);
    let bound = timings.font_timeout_ms + timings.success_hold_ms + timings.print_delay_ms;
    assert!(started.elapsed() >= Duration::from_millis(timings.font_timeout_ms));
    assert!(started.elapsed() <= Duration::from_millis(bound + 10));
}

#[tokio::test(start_paused = true)]
async fn dropping_a_run_midway_resets_the_session() {
    let orchestrator = ExportOrchestrator::new(ExportTimings::default());
    let host = FakeHost::opening();
    let data = valid_report();

    let cut_short = tokio::time::timeout(
        Duration::from_millis(100),
        orchestrator.run(&data, &StuckSurface { images: 1 }, &host),
    )
    .await;
    assert!(cut_short.is_err());

    assert!(!orchestrator.is_running());
    assert_eq!(host.prints(), 0);
    let session = orchestrator.session();
    assert!(!session.is_exporting);
    assert_eq!(session.progress, 0);
    let feedback = session.feedback.unwrap();
    assert_eq!(feedback.kind, FeedbackKind::Info);
    assert_eq!(feedback.message, MSG_EXPORT_INTERRUPTED);

    let again = orchestrator.run(&data, &ReadySurface, &host).await;
    assert_eq!(again, ExportOutcome::PrintOpened);
}

#[tokio::test(start_paused = true)]
async fn no_dialog_within_window_reports_blocked() {
    let orchestrator = ExportOrchestrator::new(ExportTimings::default());
    let host = FakeHost::default();

    let outcome = orchestrator.run(&valid_report(), &ReadySurface, &host).await;

    assert_eq!(outcome, ExportOutcome::PrintBlocked);
    assert_eq!(host.prints(), 1);
    let feedback = orchestrator.session().feedback.unwrap();
    assert_eq!(feedback.kind, FeedbackKind::Error);
    assert_eq!(feedback.message, MSG_PRINT_BLOCKED);
}

#[tokio::test(start_paused = true)]
async fn missing_print_capability_is_fatal() {
    let orchestrator = ExportOrchestrator::new(ExportTimings::default());
    let host = FakeHost {
        unsupported: true,
        ..Default::default()
    };

    let outcome = orchestrator.run(&valid_report(), &ReadySurface, &host).await;

    assert_eq!(outcome, ExportOutcome::Failed(ExportError::PrintUnavailable));
    assert_eq!(host.prints(), 0);
    assert!(host.armed.lock().unwrap().is_none());
    assert_eq!(
        orchestrator.session().error.as_deref(),
        Some("Browser not supported.")
    );
}

#[tokio::test(start_paused = true)]
async fn print_errors_surface_generic_feedback() {
    let orchestrator = ExportOrchestrator::new(ExportTimings::default());
    let host = FakeHost {
        fail_print: true,
        ..Default::default()
    };

    let outcome = orchestrator.run(&valid_report(), &ReadySurface, &host).await;

    assert!(matches!(
        outcome,
        ExportOutcome::Failed(ExportError::PrintInvocation(_))
    ));
    assert_eq!(
        orchestrator.session().feedback.unwrap().message,
        "Print failed."
    );
}

#[tokio::test(start_paused = true)]
async fn second_invocation_while_running_is_ignored() {
    let orchestrator = ExportOrchestrator::new(ExportTimings::default());
    let host = FakeHost::opening();
    let data = valid_report();

    let (first, second) = tokio::join!(
        orchestrator.run(&data, &ReadySurface, &host),
        orchestrator.run(&data, &ReadySurface, &host),
    );

    assert_eq!(first, ExportOutcome::PrintOpened);
    assert_eq!(second, ExportOutcome::AlreadyRunning);
    assert_eq!(host.prints(), 1);
    assert!(!orchestrator.is_running());

    let again = orchestrator.run(&data, &ReadySurface, &host).await;
    assert_eq!(again, ExportOutcome::PrintOpened);
}
