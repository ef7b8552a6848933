//! Breadcrumb trail handler
//!
//! Records a bounded history of recent events that the reporter attaches to
//! every report it submits, so an error arrives with the steps leading to it.

use crate::core::{Handler, LogContext, LogEvent, LogLevel, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Category stamped on every breadcrumb recorded by [`BreadcrumbHandler`]
pub const BREADCRUMB_CATEGORY: &str = "backlog";

/// Default number of breadcrumbs kept before the oldest are evicted
pub const DEFAULT_TRAIL_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub category: String,
    /// `[LOGGER] message`
    pub message: String,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "LogContext::is_empty")]
    pub data: LogContext,
    pub timestamp: DateTime<Utc>,
}

/// Bounded, thread-safe breadcrumb buffer shared by the breadcrumb handler
/// and the reporter.
#[derive(Debug)]
pub struct BreadcrumbTrail {
    capacity: usize,
    crumbs: Mutex<VecDeque<Breadcrumb>>,
}

impl BreadcrumbTrail {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TRAIL_CAPACITY)
    }

    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            crumbs: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn record(&self, crumb: Breadcrumb) {
        let mut crumbs = self.crumbs.lock();
        while crumbs.len() >= self.capacity {
            crumbs.pop_front();
        }
        crumbs.push_back(crumb);
    }

    /// Oldest-first copy of the current trail
    pub fn snapshot(&self) -> Vec<Breadcrumb> {
        self.crumbs.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.crumbs.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.crumbs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.crumbs.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BreadcrumbTrail {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BreadcrumbHandler {
    trail: Arc<BreadcrumbTrail>,
}

impl BreadcrumbHandler {
    pub fn new(trail: Arc<BreadcrumbTrail>) -> Self {
        Self { trail }
    }

    pub fn trail(&self) -> &Arc<BreadcrumbTrail> {
        &self.trail
    }
}

impl Handler for BreadcrumbHandler {
    fn handle(&self, event: &LogEvent) -> Result<()> {
        self.trail.record(Breadcrumb {
            category: BREADCRUMB_CATEGORY.to_string(),
            message: format!("[{}] {}", event.logger.to_uppercase(), event.message),
            level: event.level,
            data: event.extra.clone(),
            timestamp: event.timestamp,
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "backlog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb_shape() {
        let trail = Arc::new(BreadcrumbTrail::new());
        let handler = BreadcrumbHandler::new(Arc::clone(&trail));

        let event = LogEvent::new(LogLevel::Info, "opened socket", "dashboard.websocket")
            .with_extra(LogContext::new().with_field("attempt", 2));
        handler.handle(&event).unwrap();

        let crumbs = trail.snapshot();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].category, "backlog");
        assert_eq!(crumbs[0].message, "[DASHBOARD.WEBSOCKET] opened socket");
        assert_eq!(crumbs[0].level, LogLevel::Info);
        assert_eq!(crumbs[0].data.len(), 1);
    }

    #[test]
    fn test_trail_evicts_oldest() {
        let trail = Arc::new(BreadcrumbTrail::with_capacity(3));
        let handler = BreadcrumbHandler::new(Arc::clone(&trail));

        for i in 0..5 {
            handler
                .handle(&LogEvent::new(LogLevel::Debug, format!("step {}", i), "app"))
                .unwrap();
        }

        let messages: Vec<String> = trail.snapshot().into_iter().map(|c| c.message).collect();
        assert_eq!(messages, vec!["[APP] step 2", "[APP] step 3", "[APP] step 4"]);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let trail = BreadcrumbTrail::with_capacity(0);
        assert_eq!(trail.capacity(), 1);
    }
}
