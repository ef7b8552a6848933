//! The normalized event handed to every handler

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Option keys that are owned by typed event fields
pub const RESERVED_OPTION_KEYS: [&str; 3] = ["level", "logger", "extra"];

thread_local! {
    static THREAD_NAME_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn current_thread_name() -> String {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let current = std::thread::current();
                current
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{:?}", current.id()))
            })
            .clone()
    })
}

/// One emission, created per call and dropped once dispatch returns.
///
/// `options` holds whatever the caller passed as override options, minus the
/// keys that are represented by `level`, `logger` and `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub logger: String,
    #[serde(default, skip_serializing_if = "LogContext::is_empty")]
    pub extra: LogContext,
    #[serde(default, skip_serializing_if = "LogContext::is_empty")]
    pub options: LogContext,
    pub timestamp: DateTime<Utc>,
    pub thread: String,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>, logger: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            logger: logger.into(),
            extra: LogContext::new(),
            options: LogContext::new(),
            timestamp: Utc::now(),
            thread: current_thread_name(),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, extra: LogContext) -> Self {
        self.extra = extra;
        self
    }

    /// Attach override options; reserved keys are discarded.
    #[must_use]
    pub fn with_options(mut self, options: &LogContext) -> Self {
        self.options = options.without(&RESERVED_OPTION_KEYS);
        self
    }

    /// Flattened view `{level, logger, extra, ...options}` as a JSON object
    pub fn options_json(&self) -> serde_json::Value {
        let mut map = match self.options.to_json_value() {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        map.insert(
            "level".to_string(),
            serde_json::Value::String(self.level.as_config_str().to_string()),
        );
        map.insert(
            "logger".to_string(),
            serde_json::Value::String(self.logger.clone()),
        );
        map.insert("extra".to_string(), self.extra.to_json_value());
        serde_json::Value::Object(map)
    }
}
