//! Core routing types and traits

pub mod configuration;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod log_context;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod rule;
pub mod store;

pub use configuration::{Configuration, ConfigurationBuilder};
pub use dispatcher::{DiagnosticCallback, Dispatcher, FailurePolicy};
pub use error::{LoggerError, Result};
pub use event::LogEvent;
pub use handler::{FnHandler, Handler, HandlerRegistry, HandlerRegistryBuilder};
pub use log_context::{FieldValue, LogContext};
pub use log_level::LogLevel;
pub use logger::{LogManager, LogManagerBuilder, Logger, LoggerOptions, DEFAULT_LOGGER_NAME};
pub use metrics::DispatchMetrics;
pub use rule::{ActivationTable, HandlerActivation, Rule};
pub use store::ConfigurationStore;
