//! Remote error-reporter handler
//!
//! Converts events into [`Report`]s and submits them to a host-supplied
//! [`Reporter`] on a background worker thread. `handle` only enqueues, so a
//! slow or unreachable backend never stalls dispatch.

use super::breadcrumb::{Breadcrumb, BreadcrumbTrail};
use crate::core::{Handler, LogContext, LogEvent, LogLevel, LoggerError, Result};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for draining queued reports (5 seconds)
///
/// Used when the handler is dropped without explicit shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of reports that may wait for the worker
pub const DEFAULT_REPORT_QUEUE: usize = 256;

/// Severity vocabulary of the remote backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for ReportLevel {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => ReportLevel::Debug,
            LogLevel::Info => ReportLevel::Info,
            LogLevel::Warn => ReportLevel::Warning,
            LogLevel::Error | LogLevel::Critical => ReportLevel::Error,
        }
    }
}

/// Payload submitted to the remote backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub message: String,
    pub level: ReportLevel,
    pub logger: String,
    #[serde(default, skip_serializing_if = "LogContext::is_empty")]
    pub extra: LogContext,
    #[serde(default, skip_serializing_if = "LogContext::is_empty")]
    pub options: LogContext,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
    pub timestamp: DateTime<Utc>,
    /// Set for critical events: the host should ask the user for feedback
    pub request_feedback: bool,
}

impl Report {
    pub fn from_event(event: &LogEvent, breadcrumbs: Vec<Breadcrumb>) -> Self {
        Self {
            message: event.message.clone(),
            level: event.level.into(),
            logger: event.logger.clone(),
            extra: event.extra.clone(),
            options: event.options.clone(),
            breadcrumbs,
            timestamp: event.timestamp,
            request_feedback: event.level == LogLevel::Critical,
        }
    }
}

/// Remote error-reporting backend supplied by the host
pub trait Reporter: Send + Sync {
    fn capture_message(&self, report: &Report) -> Result<()>;

    /// Called after `capture_message` for reports with `request_feedback`
    fn show_report_dialog(&self, _report: &Report) -> Result<()> {
        Ok(())
    }
}

/// Writes each report as one JSON line
pub struct JsonLinesReporter<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Reporter for JsonLinesReporter<W> {
    fn capture_message(&self, report: &Report) -> Result<()> {
        let json = serde_json::to_string(report)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }
}

/// Handler registered as `"sentry"`.
///
/// # Example
///
/// ```
/// use rust_log_router::handlers::{BreadcrumbTrail, JsonLinesReporter, ReporterHandler};
/// use std::sync::Arc;
///
/// let trail = Arc::new(BreadcrumbTrail::new());
/// let handler = ReporterHandler::new(Arc::new(JsonLinesReporter::new(std::io::sink())))
///     .with_breadcrumbs(trail);
/// ```
pub struct ReporterHandler {
    sender: Option<Sender<Report>>,
    worker: Option<thread::JoinHandle<()>>,
    capacity: usize,
    pending: Arc<AtomicUsize>,
    breadcrumbs: Option<Arc<BreadcrumbTrail>>,
}

impl ReporterHandler {
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self::with_capacity(reporter, DEFAULT_REPORT_QUEUE)
    }

    pub fn with_capacity(reporter: Arc<dyn Reporter>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded::<Report>(capacity);
        let pending = Arc::new(AtomicUsize::new(0));
        let pending_clone = Arc::clone(&pending);

        let worker = thread::Builder::new()
            .name("log-reporter".to_string())
            .spawn(move || {
                // Runs until every sender is dropped and the queue is drained
                for report in receiver {
                    Self::submit(reporter.as_ref(), &report);
                    pending_clone.fetch_sub(1, Ordering::AcqRel);
                }
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to spawn reporter worker: {}", e);
                None
            }
        };

        Self {
            sender: worker.as_ref().map(|_| sender),
            worker,
            capacity,
            pending,
            breadcrumbs: None,
        }
    }

    /// Attach the shared breadcrumb trail to every report
    #[must_use]
    pub fn with_breadcrumbs(mut self, trail: Arc<BreadcrumbTrail>) -> Self {
        self.breadcrumbs = Some(trail);
        self
    }

    /// Reports queued or being submitted
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Submit one report with panic isolation
    fn submit(reporter: &dyn Reporter, report: &Report) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            reporter.capture_message(report)?;
            if report.request_feedback {
                reporter.show_report_dialog(report)?;
            }
            Ok::<(), LoggerError>(())
        }));

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!("[LOGGER ERROR] Reporter failed: {}", e),
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER CRITICAL] Reporter panicked: {}. Worker continues.",
                    panic_msg
                );
            }
        }
    }

    /// Wait up to `timeout` for queued reports to be submitted
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.pending() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Stop accepting reports and drain the queue within `timeout`
    ///
    /// Returns `true` if the worker finished in time.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        // Closing the channel lets the worker exit after the last report
        drop(self.sender.take());

        let Some(handle) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Reporter worker panicked during shutdown: {:?}", e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Reporter worker did not finish within {:?}. \
                     {} reports may be lost.",
                    timeout,
                    self.pending()
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Handler for ReporterHandler {
    fn handle(&self, event: &LogEvent) -> Result<()> {
        let Some(ref sender) = self.sender else {
            return Err(LoggerError::ReporterStopped);
        };

        let breadcrumbs = self
            .breadcrumbs
            .as_ref()
            .map(|trail| trail.snapshot())
            .unwrap_or_default();
        let report = Report::from_event(event, breadcrumbs);

        self.pending.fetch_add(1, Ordering::AcqRel);
        match sender.try_send(report) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                Err(LoggerError::queue_full(sender.len(), self.capacity))
            }
            Err(TrySendError::Disconnected(_)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                Err(LoggerError::ReporterStopped)
            }
        }
    }

    fn flush(&self) -> Result<()> {
        if self.wait_idle(DEFAULT_SHUTDOWN_TIMEOUT) {
            Ok(())
        } else {
            Err(LoggerError::other(format!(
                "reporter still has {} pending reports",
                self.pending()
            )))
        }
    }

    fn name(&self) -> &str {
        "sentry"
    }
}

impl Drop for ReporterHandler {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::BreadcrumbHandler;

    #[derive(Default)]
    struct RecordingReporter {
        captured: Mutex<Vec<Report>>,
        dialogs: AtomicUsize,
    }

    impl Reporter for RecordingReporter {
        fn capture_message(&self, report: &Report) -> Result<()> {
            self.captured.lock().push(report.clone());
            Ok(())
        }

        fn show_report_dialog(&self, _report: &Report) -> Result<()> {
            self.dialogs.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    /// Blocks every submission until released
    struct GatedReporter {
        gate: Mutex<()>,
    }

    impl Reporter for GatedReporter {
        fn capture_message(&self, _report: &Report) -> Result<()> {
            let _open = self.gate.lock();
            Ok(())
        }
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(ReportLevel::from(LogLevel::Warn), ReportLevel::Warning);
        assert_eq!(ReportLevel::from(LogLevel::Critical), ReportLevel::Error);
        assert_eq!(ReportLevel::from(LogLevel::Info), ReportLevel::Info);
    }

    #[test]
    fn test_critical_requests_feedback() {
        let reporter = Arc::new(RecordingReporter::default());
        let handler = ReporterHandler::new(reporter.clone());

        handler
            .handle(&LogEvent::new(LogLevel::Critical, "crashed", "app"))
            .unwrap();
        handler
            .handle(&LogEvent::new(LogLevel::Error, "failed", "app"))
            .unwrap();
        handler.flush().unwrap();

        let captured = reporter.captured.lock();
        assert_eq!(captured.len(), 2);
        assert!(captured[0].request_feedback);
        assert_eq!(captured[0].level, ReportLevel::Error);
        assert!(!captured[1].request_feedback);
        assert_eq!(reporter.dialogs.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_breadcrumbs_attached() {
        let reporter = Arc::new(RecordingReporter::default());
        let trail = Arc::new(BreadcrumbTrail::new());
        let crumbs = BreadcrumbHandler::new(Arc::clone(&trail));
        let handler = ReporterHandler::new(reporter.clone()).with_breadcrumbs(trail);

        crumbs
            .handle(&LogEvent::new(LogLevel::Info, "clicked save", "ui"))
            .unwrap();
        handler
            .handle(&LogEvent::new(LogLevel::Error, "save failed", "ui"))
            .unwrap();
        handler.flush().unwrap();

        let captured = reporter.captured.lock();
        assert_eq!(captured[0].breadcrumbs.len(), 1);
        assert_eq!(captured[0].breadcrumbs[0].message, "[UI] clicked save");
    }

    #[test]
    fn test_full_queue_is_handler_error() {
        let reporter = Arc::new(GatedReporter { gate: Mutex::new(()) });
        let guard = reporter.gate.lock();
        let handler = ReporterHandler::with_capacity(reporter.clone(), 1);

        let event = LogEvent::new(LogLevel::Error, "x", "app");
        // One report may be held by the worker, one fills the queue
        let mut results = Vec::new();
        for _ in 0..4 {
            results.push(handler.handle(&event));
        }

        assert!(results
            .iter()
            .any(|r| matches!(r, Err(LoggerError::QueueFull { .. }))));

        drop(guard);
        assert!(handler.wait_idle(Duration::from_secs(2)));
    }

    #[test]
    fn test_shutdown_rejects_new_reports() {
        let reporter = Arc::new(RecordingReporter::default());
        let mut handler = ReporterHandler::new(reporter.clone());

        handler
            .handle(&LogEvent::new(LogLevel::Warn, "before", "app"))
            .unwrap();
        assert!(handler.shutdown(Duration::from_secs(2)));

        let result = handler.handle(&LogEvent::new(LogLevel::Warn, "after", "app"));
        assert!(matches!(result, Err(LoggerError::ReporterStopped)));
        assert_eq!(reporter.captured.lock().len(), 1);
    }

    #[test]
    fn test_json_lines_reporter() {
        let reporter = JsonLinesReporter::new(Vec::new());
        let event = LogEvent::new(LogLevel::Warn, "slow", "app.db")
            .with_extra(LogContext::new().with_field("ms", 900));

        reporter
            .capture_message(&Report::from_event(&event, Vec::new()))
            .unwrap();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(value["level"], "warning");
        assert_eq!(value["logger"], "app.db");
        assert_eq!(value["extra"]["ms"], 900);
        assert!(value.get("breadcrumbs").is_none());
    }
}
