//! Logging macros for ergonomic message formatting.
//!
//! Each macro formats its arguments like `format!` and emits through the
//! given [`Logger`](crate::Logger), returning the emission result.
//!
//! # Examples
//!
//! ```
//! use rust_log_router::prelude::*;
//! use rust_log_router::info;
//!
//! let manager = LogManager::builder().build().unwrap();
//! let logger = manager.get_logger("server");
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Emit a formatted message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let manager = LogManager::builder().build().unwrap();
/// # let logger = manager.get_logger("app");
/// use rust_log_router::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.emit(
            $level,
            format!($($arg)+),
            &$crate::LogContext::new(),
            &$crate::LogContext::new(),
        )
    };
}

/// Emit a formatted debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let manager = LogManager::builder().build().unwrap();
/// # let logger = manager.get_logger("app");
/// use rust_log_router::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Emit a formatted info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Emit a formatted warn-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let manager = LogManager::builder().build().unwrap();
/// # let logger = manager.get_logger("app");
/// use rust_log_router::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Emit a formatted error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Emit a formatted critical-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_router::prelude::*;
/// # let manager = LogManager::builder().build().unwrap();
/// # let logger = manager.get_logger("app");
/// use rust_log_router::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
