//! Handler implementations
//!
//! Pluggable sinks for the three standard handler ids: `console`, `backlog`
//! (breadcrumb trail) and `sentry` (remote error reporter).

pub mod breadcrumb;
pub mod console;
pub mod reporter;

pub use breadcrumb::{Breadcrumb, BreadcrumbHandler, BreadcrumbTrail};
pub use console::ConsoleHandler;
pub use reporter::{
    JsonLinesReporter, Report, ReportLevel, Reporter, ReporterHandler, DEFAULT_SHUTDOWN_TIMEOUT,
};

pub use crate::core::Handler;
