//! Poll sessions
//!
//! A session owns the repeating timer and the attempt counter for one watch
//! call. It runs as a single task: wait for the next tick, run detection,
//! and stop itself on success or once the attempt budget is spent. The timer
//! is always dropped before a callback runs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use watch_target::WatchTarget;

use crate::config::{ConfigSnapshot, FailureCallback, SuccessCallback, WatchConfig};
use crate::context::WatchContext;
use crate::detect::detect;
use crate::error::{InvalidArgument, Result, WatchError, USAGE};

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing found yet; the timer keeps running
    Pending,
    /// Detection succeeded and the success callback ran
    Found,
    /// The attempt budget ran out and the failure callback ran
    Exhausted,
    /// The session had already resolved
    Stopped,
}

/// One polling invocation
///
/// Created (and validated) synchronously, then driven by [`PollSession::run`]
/// on a tokio runtime. The first tick fires one delay after creation.
pub struct PollSession {
    target: Arc<dyn WatchTarget>,
    selector: Arc<str>,
    config: ConfigSnapshot,

    /// Exact tick period; the snapshot only keeps whole milliseconds
    delay: Duration,

    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,

    /// When the first tick is due
    first_tick: Instant,

    /// Repeating timer, present only while the session is being driven
    timer: Option<Interval>,

    running: bool,
    attempts: u32,
}

impl PollSession {
    /// Validate the arguments and prepare a session
    ///
    /// Fails before any timer exists when the target is not an object, the
    /// selector is empty, or the configuration is invalid. A delay too large
    /// to schedule is a configuration error.
    pub fn new(
        target: Arc<dyn WatchTarget>,
        selector: impl Into<String>,
        config: WatchConfig,
    ) -> Result<Self> {
        let selector: String = selector.into();
        validate_arguments(target.as_ref(), &selector)?;
        config.validate()?;

        let first_tick = Instant::now().checked_add(config.delay).ok_or_else(|| {
            WatchError::Configuration(format!("Delay {:?} is too large to schedule", config.delay))
        })?;

        let snapshot = config.snapshot();
        Ok(Self {
            target,
            selector: Arc::from(selector),
            config: snapshot,
            delay: config.delay,
            on_success: Some(config.on_success),
            on_failure: Some(config.on_failure),
            first_tick,
            timer: None,
            running: true,
            attempts: 0,
        })
    }

    /// Drive the session until it resolves
    pub async fn run(mut self) {
        tracing::debug!(
            selector = %self.selector,
            attempts = self.config.attempts,
            delay_ms = self.config.delay_ms,
            "obj_watch session started"
        );

        if self.running {
            let mut timer = time::interval_at(self.first_tick, self.delay);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.timer = Some(timer);
        }

        while let Some(timer) = self.timer.as_mut() {
            timer.tick().await;
            self.tick();
        }

        tracing::debug!(
            selector = %self.selector,
            attempts = self.attempts,
            "obj_watch session ended"
        );
    }

    /// Run one detection check
    pub(crate) fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }

        self.attempts = self.attempts.saturating_add(1);
        let context = self.context();

        if self.config.debug {
            tracing::info!(tick = self.attempts, ?context, "obj_watch.watch");
        }

        if let Some(detected) = detect(self.target.as_ref(), &self.selector) {
            self.stop();
            if let Some(on_success) = self.on_success.take() {
                on_success(detected, &context);
            }
            return TickOutcome::Found;
        }

        if self.config.attempts > 0 && self.attempts >= self.config.attempts {
            self.stop();
            if let Some(on_failure) = self.on_failure.take() {
                on_failure(&context);
            }
            return TickOutcome::Exhausted;
        }

        TickOutcome::Pending
    }

    /// Clear the timer; no further ticks run
    pub(crate) fn stop(&mut self) {
        self.running = false;
        self.timer = None;
    }

    fn context(&self) -> WatchContext {
        WatchContext::new(
            Arc::clone(&self.target),
            Arc::clone(&self.selector),
            self.config,
            self.attempts,
        )
    }

    /// Ticks run so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the session is still waiting to resolve
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    /// Configured delay between ticks
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl fmt::Debug for PollSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollSession")
            .field("target", &self.target)
            .field("selector", &self.selector)
            .field("config", &self.config)
            .field("delay", &self.delay)
            .field("running", &self.running)
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

/// Check the target and selector, logging usage on failure
pub(crate) fn validate_arguments(target: &dyn WatchTarget, selector: &str) -> Result<()> {
    let reason = if !target.is_object() {
        InvalidArgument::TargetNotObject
    } else if selector.is_empty() {
        InvalidArgument::EmptySelector
    } else {
        return Ok(());
    };

    tracing::error!(
        usage = USAGE,
        defaults = ?ConfigSnapshot::default(),
        %reason,
        "obj_watch invalid arguments"
    );
    Err(WatchError::invalid_argument(reason))
}
