//! # Rust Log Router
//!
//! A named-logger dispatch engine. Application code asks for a logger by
//! name and emits leveled events; a configuration of regex rules over logger
//! names decides which handlers receive each event.
//!
//! ## Features
//!
//! - **First-match rules**: ordered regex patterns, no merging of overlaps
//! - **Per-handler level sets**: each handler accepts an explicit level list
//! - **Strict handlers**: narrow one logger to a single sink with `use_handler`
//! - **Contained failures**: a broken or missing handler never silences the others
//! - **Thread safe**: configuration snapshots can be swapped while emitting
//!
//! ```
//! use rust_log_router::prelude::*;
//!
//! let manager = LogManager::builder()
//!     .handler(ConsoleHandler::new())
//!     .configuration(
//!         Configuration::from_json_str(
//!             r#"{"loggers": {"^app\\.": {"console": ["warn", "error", "critical"]}}}"#,
//!         )
//!         .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let logger = manager.get_logger("app.db");
//! logger.warn("slow query");
//! logger.use_handler("console").error("connection lost");
//! ```

pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        ActivationTable, Configuration, DiagnosticCallback, DispatchMetrics, FailurePolicy,
        FieldValue, Handler, HandlerRegistry, LogContext, LogEvent, LogLevel, LogManager,
        Logger, LoggerError, LoggerOptions, Result,
    };
    pub use crate::handlers::{
        BreadcrumbHandler, BreadcrumbTrail, ConsoleHandler, Reporter, ReporterHandler,
    };
}

pub use crate::core::{
    ActivationTable, Configuration, ConfigurationBuilder, ConfigurationStore, DiagnosticCallback,
    DispatchMetrics, Dispatcher, FailurePolicy, FieldValue, FnHandler, Handler,
    HandlerActivation, HandlerRegistry, LogContext, LogEvent, LogLevel, LogManager,
    LogManagerBuilder, Logger, LoggerError, LoggerOptions, Result, Rule, DEFAULT_LOGGER_NAME,
};
pub use handlers::{
    Breadcrumb, BreadcrumbHandler, BreadcrumbTrail, ConsoleHandler, JsonLinesReporter, Report,
    ReportLevel, Reporter, ReporterHandler, DEFAULT_SHUTDOWN_TIMEOUT,
};
