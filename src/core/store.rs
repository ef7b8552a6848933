//! Process-wide configuration snapshot
//!
//! Readers take an `Arc` snapshot under a short read lock and dispatch
//! without holding it, so a late reconfiguration never blocks or tears an
//! in-flight emission: each event sees either the old or the new
//! configuration in full.

use super::configuration::Configuration;
use super::error::{LoggerError, Result};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ConfigurationStore {
    current: RwLock<Arc<Configuration>>,
    initialized: AtomicBool,
    read: AtomicBool,
    replacements: AtomicU64,
}

impl ConfigurationStore {
    /// A store holding an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configuration(configuration: Configuration) -> Self {
        let store = Self::new();
        *store.current.write() = Arc::new(configuration);
        store.initialized.store(true, Ordering::Release);
        store
    }

    /// One-shot initialization; a second call is rejected.
    pub fn initialize(&self, configuration: Configuration) -> Result<()> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LoggerError::AlreadyConfigured);
        }
        *self.current.write() = Arc::new(configuration);
        Ok(())
    }

    /// Replace the whole configuration; the last write wins.
    ///
    /// Allowed at any time, but replacing a configuration that emissions have
    /// already read is reported on stderr. Inspecting it through
    /// [`snapshot`](Self::snapshot) does not count as a read.
    pub fn set_configuration(&self, configuration: Configuration) {
        let replacement = Arc::new(configuration);
        *self.current.write() = replacement;
        self.initialized.store(true, Ordering::Release);

        let count = self.replacements.fetch_add(1, Ordering::Relaxed) + 1;
        if self.read.load(Ordering::Acquire) {
            eprintln!(
                "[LOGGER WARNING] Logging configuration replaced after first use \
                 (replacement #{}). Emissions in flight keep the previous rules.",
                count
            );
        }
    }

    /// Current configuration snapshot, for inspection
    #[inline]
    pub fn snapshot(&self) -> Arc<Configuration> {
        Arc::clone(&self.current.read())
    }

    /// Snapshot taken by an emission; later replacements are reported
    #[inline]
    pub(crate) fn snapshot_for_dispatch(&self) -> Arc<Configuration> {
        if !self.read.load(Ordering::Relaxed) {
            self.read.store(true, Ordering::Release);
        }
        self.snapshot()
    }

    /// Whether any emission has read the configuration yet
    pub fn has_been_read(&self) -> bool {
        self.read.load(Ordering::Acquire)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Number of `set_configuration` calls so far
    pub fn replacement_count(&self) -> u64 {
        self.replacements.load(Ordering::Relaxed)
    }
}
