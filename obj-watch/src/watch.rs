//! Starting watches
//!
//! `watch` is fire-and-forget: it validates, spawns the session on the
//! current tokio runtime, and reports the outcome only through callbacks.
//! `wait_for` wraps the same session in a future that resolves with the
//! outcome.

use std::sync::Arc;

use tokio::sync::mpsc;
use watch_target::WatchTarget;

use crate::config::WatchConfig;
use crate::context::WatchContext;
use crate::detect::Detected;
use crate::error::{Result, WatchError};
use crate::session::PollSession;

/// Start polling `target` for `selector`
///
/// Returns once the session is scheduled. Argument errors are returned
/// synchronously, before any timer exists, and no callback ever runs for
/// them. Must be called from within a tokio runtime.
///
/// # Example
///
/// ```rust,no_run
/// use obj_watch::{watch, WatchConfig};
/// use watch_target::ObjectTarget;
///
/// # #[tokio::main]
/// # async fn main() -> obj_watch::Result<()> {
/// let target = ObjectTarget::new();
///
/// watch(
///     target.clone(),
///     "ready",
///     WatchConfig::new()
///         .with_attempts(10)
///         .on_success(|value, ctx| println!("ready = {:?} after {} ticks", value, ctx.attempts()))
///         .on_failure(|ctx| println!("gave up after {} ticks", ctx.attempts())),
/// )?;
///
/// target.set("ready", true);
/// # Ok(())
/// # }
/// ```
pub fn watch<T>(target: T, selector: impl Into<String>, config: WatchConfig) -> Result<()>
where
    T: WatchTarget + 'static,
{
    let session = PollSession::new(Arc::new(target), selector, config)?;
    let handle = tokio::runtime::Handle::try_current().map_err(|_| WatchError::NoRuntime)?;
    handle.spawn(session.run());
    Ok(())
}

/// How a session resolved
#[derive(Debug, Clone)]
pub enum WatchOutcome {
    /// Detection succeeded
    Found {
        detected: Detected,
        context: WatchContext,
    },
    /// The attempt budget ran out
    Exhausted { context: WatchContext },
}

impl WatchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, WatchOutcome::Found { .. })
    }

    pub fn context(&self) -> &WatchContext {
        match self {
            WatchOutcome::Found { context, .. } | WatchOutcome::Exhausted { context } => context,
        }
    }

    /// Ticks run before the session resolved
    pub fn attempts(&self) -> u32 {
        self.context().attempts()
    }

    pub fn detected(&self) -> Option<&Detected> {
        match self {
            WatchOutcome::Found { detected, .. } => Some(detected),
            WatchOutcome::Exhausted { .. } => None,
        }
    }

    pub fn into_detected(self) -> Option<Detected> {
        match self {
            WatchOutcome::Found { detected, .. } => Some(detected),
            WatchOutcome::Exhausted { .. } => None,
        }
    }
}

/// Start a watch and wait for it to resolve
///
/// Callbacks in `config` still run, before the future completes. With
/// unlimited attempts the future only completes on success; bound it with
/// `tokio::time::timeout` where that matters. If a callback panics the
/// session ends without an outcome and `WatchError::WorkerStopped` is
/// returned.
pub async fn wait_for<T>(
    target: T,
    selector: impl Into<String>,
    config: WatchConfig,
) -> Result<WatchOutcome>
where
    T: WatchTarget + 'static,
{
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let success_tx = outcome_tx.clone();

    let WatchConfig {
        attempts,
        delay,
        debug,
        on_success,
        on_failure,
    } = config;

    let config = WatchConfig {
        attempts,
        delay,
        debug,
        on_success: Box::new(move |detected, context| {
            on_success(detected.clone(), context);
            let _ = success_tx.send(WatchOutcome::Found {
                detected,
                context: context.clone(),
            });
        }),
        on_failure: Box::new(move |context| {
            on_failure(context);
            let _ = outcome_tx.send(WatchOutcome::Exhausted {
                context: context.clone(),
            });
        }),
    };

    watch(target, selector, config)?;
    outcome_rx.recv().await.ok_or(WatchError::WorkerStopped)
}
