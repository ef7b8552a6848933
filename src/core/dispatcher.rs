//! Per-emission routing: resolve the rule, filter handler slots, invoke sinks

use super::{
    error::LoggerError,
    event::LogEvent,
    handler::HandlerRegistry,
    log_context::LogContext,
    log_level::LogLevel,
    logger::LoggerOptions,
    metrics::DispatchMetrics,
    store::ConfigurationStore,
};
use std::sync::Arc;

/// Receives every contained handler failure: `(logger name, error)`.
pub type DiagnosticCallback = Arc<dyn Fn(&str, &LoggerError) + Send + Sync>;

/// What happens to the remaining handler slots after one fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure and keep invoking the remaining handlers
    #[default]
    Isolate,
    /// Report the failure and skip the remaining handlers for this event
    FailFast,
}

pub struct Dispatcher {
    store: Arc<ConfigurationStore>,
    registry: Arc<HandlerRegistry>,
    metrics: Arc<DispatchMetrics>,
    failure_policy: FailurePolicy,
    on_failure: Option<DiagnosticCallback>,
}

impl Dispatcher {
    pub fn new(store: Arc<ConfigurationStore>, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            store,
            registry,
            metrics: Arc::new(DispatchMetrics::new()),
            failure_policy: FailurePolicy::default(),
            on_failure: None,
        }
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, callback: DiagnosticCallback) -> Self {
        self.on_failure = Some(callback);
        self
    }

    pub fn store(&self) -> &Arc<ConfigurationStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Route one emission.
    ///
    /// Every handler slot of the first matching rule is visited in table
    /// order and invoked when the logger's strict set permits it and the
    /// slot accepts `level`. Returns `true` when at least one slot was
    /// eligible, `false` when no rule matched or no slot took the event.
    /// Handler failures never reach the caller.
    ///
    /// The event's `extra` is exactly the emission's `extra`. Its `options`
    /// are the caller's overrides overlaid by the logger's bound options.
    pub fn dispatch(
        &self,
        options: &LoggerOptions,
        level: LogLevel,
        message: String,
        extra: &LogContext,
        overrides: &LogContext,
    ) -> bool {
        let configuration = self.store.snapshot_for_dispatch();
        let Some(table) = configuration.resolve(options.name()) else {
            self.metrics.record_unrouted();
            return false;
        };

        let event = LogEvent::new(level, message, options.name())
            .with_extra(extra.clone())
            .with_options(&overrides.merged_with(options.bound_options()));

        let mut eligible = false;
        for (idx, slot) in table.iter().enumerate() {
            if !options.permits(slot.handler()) || !slot.accepts(level) {
                continue;
            }
            eligible = true;

            if let Err(e) = self.invoke(slot.handler(), &event) {
                self.report(&event.logger, &e);

                if self.failure_policy == FailurePolicy::FailFast {
                    let skipped = table
                        .iter()
                        .skip(idx + 1)
                        .filter(|rest| options.permits(rest.handler()) && rest.accepts(level))
                        .count();
                    self.metrics.record_aborted(skipped as u64);
                    break;
                }
            }
        }

        if eligible {
            self.metrics.record_dispatched();
        } else {
            self.metrics.record_filtered();
        }
        eligible
    }

    /// Invoke a single handler with panic isolation
    fn invoke(&self, handler_id: &str, event: &LogEvent) -> Result<(), LoggerError> {
        let Some(handler) = self.registry.get(handler_id) else {
            self.metrics.record_unknown_handler();
            return Err(LoggerError::unknown_handler(handler_id));
        };

        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler.handle(event)));

        match result {
            Ok(Ok(())) => {
                self.metrics.record_invocation();
                Ok(())
            }
            Ok(Err(e)) => {
                self.metrics.record_failure();
                Err(LoggerError::handler_failed(handler_id, e.to_string()))
            }
            Err(panic_info) => {
                self.metrics.record_failure();
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                Err(LoggerError::handler_panicked(handler_id, panic_msg))
            }
        }
    }

    fn report(&self, logger: &str, error: &LoggerError) {
        if let Some(ref callback) = self.on_failure {
            callback(logger, error);
            return;
        }

        match error {
            LoggerError::HandlerPanicked { .. } => eprintln!(
                "[LOGGER CRITICAL] Logger '{}': {}. {}",
                logger,
                error,
                match self.failure_policy {
                    FailurePolicy::Isolate => "Other handlers continue to function.",
                    FailurePolicy::FailFast => "Remaining handlers skipped for this event.",
                }
            ),
            _ => eprintln!("[LOGGER ERROR] Logger '{}': {}", logger, error),
        }
    }
}
