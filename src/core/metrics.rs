//! Dispatch metrics for observability
//!
//! Counters describing what the dispatcher did with each emission and how
//! the handler slots fared.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for dispatcher observability
///
/// # Example
///
/// ```
/// use rust_log_router::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_invocation();
/// metrics.record_unrouted();
///
/// assert_eq!(metrics.events_dispatched(), 1);
/// assert_eq!(metrics.events_unrouted(), 1);
/// ```
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Emissions that reached at least one handler slot
    events_dispatched: AtomicU64,

    /// Emissions discarded because no rule matched the logger name
    events_unrouted: AtomicU64,

    /// Emissions whose rule matched but no slot accepted the level
    events_filtered: AtomicU64,

    /// Successful handler calls
    handler_invocations: AtomicU64,

    /// Handler calls that returned an error or panicked
    handler_failures: AtomicU64,

    /// Handler slots naming an id missing from the registry
    unknown_handlers: AtomicU64,

    /// Handler slots skipped because of a fail-fast abort
    handlers_aborted: AtomicU64,
}

impl DispatchMetrics {
    pub const fn new() -> Self {
        Self {
            events_dispatched: AtomicU64::new(0),
            events_unrouted: AtomicU64::new(0),
            events_filtered: AtomicU64::new(0),
            handler_invocations: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
            unknown_handlers: AtomicU64::new(0),
            handlers_aborted: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn events_unrouted(&self) -> u64 {
        self.events_unrouted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn events_filtered(&self) -> u64 {
        self.events_filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn handler_invocations(&self) -> u64 {
        self.handler_invocations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn unknown_handlers(&self) -> u64 {
        self.unknown_handlers.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn handlers_aborted(&self) -> u64 {
        self.handlers_aborted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_unrouted(&self) -> u64 {
        self.events_unrouted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.events_filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_invocation(&self) -> u64 {
        self.handler_invocations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failure(&self) -> u64 {
        self.handler_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_unknown_handler(&self) -> u64 {
        self.unknown_handlers.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_aborted(&self, count: u64) -> u64 {
        self.handlers_aborted.fetch_add(count, Ordering::Relaxed)
    }

    /// Failed handler calls as a percentage (0.0 - 100.0) of all calls
    pub fn failure_rate(&self) -> f64 {
        let failed = (self.handler_failures() + self.unknown_handlers()) as f64;
        let total = self.handler_invocations() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.events_dispatched.store(0, Ordering::Relaxed);
        self.events_unrouted.store(0, Ordering::Relaxed);
        self.events_filtered.store(0, Ordering::Relaxed);
        self.handler_invocations.store(0, Ordering::Relaxed);
        self.handler_failures.store(0, Ordering::Relaxed);
        self.unknown_handlers.store(0, Ordering::Relaxed);
        self.handlers_aborted.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchMetrics {
    /// Snapshot of the current counter values
    fn clone(&self) -> Self {
        Self {
            events_dispatched: AtomicU64::new(self.events_dispatched()),
            events_unrouted: AtomicU64::new(self.events_unrouted()),
            events_filtered: AtomicU64::new(self.events_filtered()),
            handler_invocations: AtomicU64::new(self.handler_invocations()),
            handler_failures: AtomicU64::new(self.handler_failures()),
            unknown_handlers: AtomicU64::new(self.unknown_handlers()),
            handlers_aborted: AtomicU64::new(self.handlers_aborted()),
        }
    }
}
