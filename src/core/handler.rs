//! Handler trait and the registry that maps handler ids to sinks

use super::configuration::Configuration;
use super::error::{LoggerError, Result};
use super::event::LogEvent;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A sink invoked for every event whose level its activation accepts.
///
/// Handlers are shared between threads and called through `&self`; any
/// mutable state lives behind the handler's own synchronization. A handler
/// that performs slow I/O should enqueue the work and return.
pub trait Handler: Send + Sync {
    fn handle(&self, event: &LogEvent) -> Result<()>;

    /// Identifier used in activation tables
    fn name(&self) -> &str;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Adapts a closure into a named [`Handler`]
pub struct FnHandler<F> {
    name: String,
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&LogEvent) -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&LogEvent) -> Result<()> + Send + Sync,
{
    fn handle(&self, event: &LogEvent) -> Result<()> {
        (self.func)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable handler id → sink table
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered ids, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Fail on the first handler id that `configuration` uses but this
    /// registry does not provide.
    pub fn validate(&self, configuration: &Configuration) -> Result<()> {
        match configuration
            .handler_ids()
            .into_iter()
            .find(|id| !self.contains(id))
        {
            Some(missing) => Err(LoggerError::unknown_handler(missing)),
            None => Ok(()),
        }
    }

    /// Flush every handler, returning the first error after trying all.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for name in self.names() {
            if let Some(handler) = self.handlers.get(name) {
                if let Err(e) = handler.flush() {
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistryBuilder {
    /// Register a handler under its own `name()`; a later registration
    /// with the same name replaces the earlier one.
    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(self, handler: H) -> Self {
        self.shared(Arc::new(handler))
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.insert(handler.name().to_string(), handler);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn function<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&LogEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.handler(FnHandler::new(name, func))
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use crate::core::rule::ActivationTable;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_function_handler_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let registry = HandlerRegistry::builder()
            .function("counter", move |_event| {
                calls_clone.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .build();

        let handler = registry.get("counter").unwrap();
        handler
            .handle(&LogEvent::new(LogLevel::Info, "hello", "app"))
            .unwrap();

        assert_eq!(handler.name(), "counter");
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_validate_reports_unknown_handler() {
        let registry = HandlerRegistry::builder()
            .function("console", |_| Ok(()))
            .build();

        let config = Configuration::builder()
            .rule(
                ".*",
                ActivationTable::new()
                    .with_handler("console", [LogLevel::Info])
                    .with_handler("sentry", [LogLevel::Error]),
            )
            .build()
            .unwrap();

        let err = registry.validate(&config).unwrap_err();
        assert!(matches!(err, LoggerError::UnknownHandler { ref handler } if handler == "sentry"));

        assert!(registry.validate(&Configuration::new()).is_ok());
    }

    #[test]
    fn test_names_sorted() {
        let registry = HandlerRegistry::builder()
            .function("sentry", |_| Ok(()))
            .function("backlog", |_| Ok(()))
            .build();

        assert_eq!(registry.names(), vec!["backlog", "sentry"]);
        assert_eq!(registry.len(), 2);
    }
}
