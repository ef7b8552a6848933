//! Console handler implementation

use crate::core::{Handler, LogEvent, LogLevel, Result};
#[cfg(feature = "console")]
use colored::Colorize;

/// Default strftime pattern for console timestamps
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Echoes events to the terminal as
/// `[timestamp] [LEVEL] [LOGGER] message key=value ...`.
///
/// Error and critical events go to stderr, everything else to stdout.
pub struct ConsoleHandler {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
    timestamp_format: Option<String>,
}

impl ConsoleHandler {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            timestamp_format: Some(DEFAULT_TIMESTAMP_FORMAT.to_string()),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Use a custom strftime-compatible timestamp format
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_log_router::handlers::ConsoleHandler;
    ///
    /// let handler = ConsoleHandler::new()
    ///     .with_timestamp_format("%H:%M:%S");
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format_str: &str) -> Self {
        self.timestamp_format = Some(format_str.to_string());
        self
    }

    /// Omit the timestamp column
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.timestamp_format = None;
        self
    }

    /// Escape line breaks so one event stays one line
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn format_level(&self, level: LogLevel) -> String {
        let padded = format!("{:8}", level.to_str());
        #[cfg(feature = "console")]
        if self.use_colors {
            return padded.color(level.color_code()).to_string();
        }
        padded
    }

    pub(crate) fn format_line(&self, event: &LogEvent) -> String {
        let mut line = String::new();
        if let Some(ref format) = self.timestamp_format {
            line.push_str(&format!("[{}] ", event.timestamp.format(format)));
        }

        line.push_str(&format!(
            "[{}] [{}] {}",
            self.format_level(event.level),
            event.logger.to_uppercase(),
            Self::sanitize_message(&event.message)
        ));

        if !event.extra.is_empty() {
            line.push(' ');
            line.push_str(&event.extra.format_fields());
        }
        line
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ConsoleHandler {
    fn handle(&self, event: &LogEvent) -> Result<()> {
        let output = self.format_line(event);

        match event.level {
            LogLevel::Error | LogLevel::Critical => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
