//! Per-tick context record
//!
//! The context handed to callbacks and debug logs: the target, the selector,
//! the effective configuration, and how many ticks have run.

use std::sync::Arc;

use watch_target::WatchTarget;

use crate::config::ConfigSnapshot;
use crate::detect::DetectionMode;

/// Snapshot of a session at one tick
#[derive(Debug, Clone)]
pub struct WatchContext {
    target: Arc<dyn WatchTarget>,
    selector: Arc<str>,
    config: ConfigSnapshot,
    attempts: u32,
}

impl WatchContext {
    pub(crate) fn new(
        target: Arc<dyn WatchTarget>,
        selector: Arc<str>,
        config: ConfigSnapshot,
        attempts: u32,
    ) -> Self {
        Self {
            target,
            selector,
            config,
            attempts,
        }
    }

    /// The watched target
    pub fn target(&self) -> &Arc<dyn WatchTarget> {
        &self.target
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Effective configuration of the session
    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    /// Ticks run so far, including the current one
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Detection mode the target currently supports
    pub fn mode(&self) -> DetectionMode {
        DetectionMode::of(self.target.as_ref())
    }
}
