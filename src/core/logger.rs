//! Named loggers and the manager that creates them

use super::{
    configuration::Configuration,
    dispatcher::{DiagnosticCallback, Dispatcher, FailurePolicy},
    error::Result,
    handler::{Handler, HandlerRegistry},
    log_context::{FieldValue, LogContext},
    log_level::LogLevel,
    metrics::DispatchMetrics,
    store::ConfigurationStore,
};
use std::fmt;
use std::sync::Arc;

/// Logger name used when none is given
pub const DEFAULT_LOGGER_NAME: &str = "unknown";

/// Identity of a logger: its name, bound options and strict handlers.
///
/// A bare name converts into options, so `manager.get_logger("app.db")` and
/// `manager.get_logger(LoggerOptions::new("app.db"))` are equivalent.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerOptions {
    logger: String,
    options: LogContext,
    strict_handlers: Vec<String>,
}

impl LoggerOptions {
    pub fn new(logger: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
            options: LogContext::new(),
            strict_handlers: Vec::new(),
        }
    }

    /// Option included in the `options` of every event from this logger,
    /// taking precedence over per-call overrides.
    ///
    /// Keys `level`, `logger` and `extra` are ignored: an event's extra is
    /// always exactly the extra given at emission time.
    #[must_use = "builder methods return a new value"]
    pub fn with_option<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.options.add_field(key, value);
        self
    }

    /// Restrict emissions to the given handler ids; empty means unrestricted.
    #[must_use = "builder methods return a new value"]
    pub fn strict_handlers<I, S>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strict_handlers.clear();
        for handler in handlers {
            let handler = handler.into();
            if !self.strict_handlers.contains(&handler) {
                self.strict_handlers.push(handler);
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.logger
    }

    pub fn bound_options(&self) -> &LogContext {
        &self.options
    }

    pub fn strict(&self) -> &[String] {
        &self.strict_handlers
    }

    /// Whether the strict set lets `handler` receive events
    #[inline]
    pub fn permits(&self, handler: &str) -> bool {
        self.strict_handlers.is_empty() || self.strict_handlers.iter().any(|h| h == handler)
    }
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self::new(DEFAULT_LOGGER_NAME)
    }
}

impl From<&str> for LoggerOptions {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for LoggerOptions {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Handle for emitting leveled events under one logger name.
///
/// Loggers are cheap to clone and immutable; every emission resolves the
/// current configuration afresh. Each emission returns `Some(self)` when at
/// least one handler slot took the event, and `None` when the logger name
/// matches no rule or no permitted handler accepts the level.
///
/// # Example
/// ```
/// use rust_log_router::prelude::*;
///
/// let manager = LogManager::builder()
///     .function("console", |event| {
///         println!("{} {}", event.level, event.message);
///         Ok(())
///     })
///     .configuration(
///         Configuration::from_json_str(
///             r#"{"loggers": {"^app\\.": {"console": ["warn", "error"]}}}"#,
///         )
///         .unwrap(),
///     )
///     .build()
///     .unwrap();
///
/// let logger = manager.get_logger("app.db");
/// assert!(logger.warn("slow query").is_some());
/// assert!(logger.debug("no handler accepts debug").is_none());
/// assert!(manager.get_logger("other").error("unconfigured").is_none());
/// ```
#[derive(Clone)]
pub struct Logger {
    options: Arc<LoggerOptions>,
    dispatcher: Arc<Dispatcher>,
}

impl Logger {
    fn new(options: LoggerOptions, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            options: Arc::new(options),
            dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        self.options.name()
    }

    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }

    pub fn strict_handlers(&self) -> &[String] {
        self.options.strict()
    }

    /// A new logger with the same options whose events only ever reach
    /// `handler`. The receiver is left unchanged.
    #[must_use]
    pub fn use_handler(&self, handler: impl Into<String>) -> Logger {
        let options = LoggerOptions::clone(&self.options).strict_handlers([handler.into()]);
        Logger::new(options, Arc::clone(&self.dispatcher))
    }

    /// Emit an event with explicit extra fields and override options.
    ///
    /// The event's `extra` is `extra` as given. Its `options` are
    /// `overrides` overlaid by the logger's bound options; keys `level`,
    /// `logger` and `extra` are ignored there.
    pub fn emit(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        extra: &LogContext,
        overrides: &LogContext,
    ) -> Option<&Self> {
        self.dispatcher
            .dispatch(&self.options, level, message.into(), extra, overrides)
            .then_some(self)
    }

    #[inline]
    fn send(&self, level: LogLevel, message: impl Into<String>, extra: &LogContext) -> Option<&Self> {
        self.emit(level, message, extra, &LogContext::new())
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) -> Option<&Self> {
        self.send(LogLevel::Debug, message, &LogContext::new())
    }

    /// Alias of [`Logger::debug`]
    #[inline]
    pub fn log(&self, message: impl Into<String>) -> Option<&Self> {
        self.debug(message)
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) -> Option<&Self> {
        self.send(LogLevel::Info, message, &LogContext::new())
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) -> Option<&Self> {
        self.send(LogLevel::Warn, message, &LogContext::new())
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) -> Option<&Self> {
        self.send(LogLevel::Error, message, &LogContext::new())
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) -> Option<&Self> {
        self.send(LogLevel::Critical, message, &LogContext::new())
    }

    pub fn debug_with(&self, message: impl Into<String>, extra: &LogContext) -> Option<&Self> {
        self.send(LogLevel::Debug, message, extra)
    }

    /// Alias of [`Logger::debug_with`]
    pub fn log_with(&self, message: impl Into<String>, extra: &LogContext) -> Option<&Self> {
        self.debug_with(message, extra)
    }

    pub fn info_with(&self, message: impl Into<String>, extra: &LogContext) -> Option<&Self> {
        self.send(LogLevel::Info, message, extra)
    }

    pub fn warn_with(&self, message: impl Into<String>, extra: &LogContext) -> Option<&Self> {
        self.send(LogLevel::Warn, message, extra)
    }

    pub fn error_with(&self, message: impl Into<String>, extra: &LogContext) -> Option<&Self> {
        self.send(LogLevel::Error, message, extra)
    }

    pub fn critical_with(&self, message: impl Into<String>, extra: &LogContext) -> Option<&Self> {
        self.send(LogLevel::Critical, message, extra)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Owns the configuration store, handler registry and dispatcher, and hands
/// out [`Logger`]s bound to them.
pub struct LogManager {
    dispatcher: Arc<Dispatcher>,
    validate_handlers: bool,
}

impl LogManager {
    /// Create a builder for LogManager
    #[must_use]
    pub fn builder() -> LogManagerBuilder {
        LogManagerBuilder::new()
    }

    /// Create a logger from a bare name or full [`LoggerOptions`].
    pub fn get_logger(&self, options: impl Into<LoggerOptions>) -> Logger {
        Logger::new(options.into(), Arc::clone(&self.dispatcher))
    }

    /// Replace the active configuration wholesale.
    ///
    /// When handler validation is on, a configuration naming a handler the
    /// registry lacks is rejected and the previous configuration stays.
    pub fn set_configuration(&self, configuration: Configuration) -> Result<()> {
        if self.validate_handlers {
            self.dispatcher.registry().validate(&configuration)?;
        }
        self.dispatcher.store().set_configuration(configuration);
        Ok(())
    }

    /// Install the configuration once; fails if one is already installed.
    pub fn initialize(&self, configuration: Configuration) -> Result<()> {
        if self.validate_handlers {
            self.dispatcher.registry().validate(&configuration)?;
        }
        self.dispatcher.store().initialize(configuration)
    }

    /// Snapshot of the active configuration
    pub fn configuration(&self) -> Arc<Configuration> {
        self.dispatcher.store().snapshot()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        self.dispatcher.registry()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        self.dispatcher.metrics()
    }

    /// Flush every registered handler
    pub fn flush(&self) -> Result<()> {
        self.dispatcher.registry().flush()
    }
}

impl fmt::Debug for LogManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogManager")
            .field("registry", self.dispatcher.registry())
            .field("failure_policy", &self.dispatcher.failure_policy())
            .field("validate_handlers", &self.validate_handlers)
            .finish()
    }
}

/// Builder for constructing LogManager with a fluent API
///
/// # Example
/// ```
/// use rust_log_router::prelude::*;
/// use std::sync::Arc;
///
/// let manager = LogManager::builder()
///     .handler(ConsoleHandler::new())
///     .failure_policy(FailurePolicy::Isolate)
///     .on_handler_failure(Arc::new(|logger: &str, err: &LoggerError| {
///         eprintln!("ALERT: {} lost an event: {}", logger, err);
///     }))
///     .build()
///     .unwrap();
///
/// assert!(manager.configuration().is_empty());
/// ```
pub struct LogManagerBuilder {
    registry: crate::core::handler::HandlerRegistryBuilder,
    configuration: Option<Configuration>,
    failure_policy: FailurePolicy,
    on_failure: Option<DiagnosticCallback>,
    validate_handlers: bool,
}

impl LogManagerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::builder(),
            configuration: None,
            failure_policy: FailurePolicy::default(),
            on_failure: None,
            validate_handlers: true,
        }
    }

    /// Register a handler under its own name
    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.registry = self.registry.handler(handler);
        self
    }

    /// Register a handler that is also held elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.registry = self.registry.shared(handler);
        self
    }

    /// Register a closure as a handler
    #[must_use = "builder methods return a new value"]
    pub fn function<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&super::event::LogEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.registry = self.registry.function(name, func);
        self
    }

    /// Initial configuration; without one every logger is unconfigured.
    #[must_use = "builder methods return a new value"]
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Callback receiving contained handler failures instead of stderr
    #[must_use = "builder methods return a new value"]
    pub fn on_handler_failure(mut self, callback: DiagnosticCallback) -> Self {
        self.on_failure = Some(callback);
        self
    }

    /// Check configured handler ids against the registry (default: on)
    #[must_use = "builder methods return a new value"]
    pub fn validate_handlers(mut self, validate: bool) -> Self {
        self.validate_handlers = validate;
        self
    }

    /// Build the LogManager
    pub fn build(self) -> Result<LogManager> {
        let registry = self.registry.build();

        let store = match self.configuration {
            Some(configuration) => {
                if self.validate_handlers {
                    registry.validate(&configuration)?;
                }
                ConfigurationStore::with_configuration(configuration)
            }
            None => ConfigurationStore::new(),
        };

        let mut dispatcher = Dispatcher::new(Arc::new(store), Arc::new(registry))
            .with_failure_policy(self.failure_policy);
        if let Some(callback) = self.on_failure {
            dispatcher = dispatcher.with_diagnostics(callback);
        }

        Ok(LogManager {
            dispatcher: Arc::new(dispatcher),
            validate_handlers: self.validate_handlers,
        })
    }
}

impl Default for LogManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
