//! Background worker thread for callers without a runtime
//!
//! Spawns a thread with its own single-threaded tokio runtime. Sessions are
//! validated on the caller's thread and then handed to the worker, whose
//! event loop drives every session's timer.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use watch_target::WatchTarget;

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::session::PollSession;

/// Commands sent from `WatchWorker` to the background event loop
#[derive(Debug)]
enum Command {
    /// Start driving a validated session
    Start(PollSession),
    /// Stop the event loop, dropping unresolved sessions
    Shutdown,
}

/// Synchronous handle to a background watch runtime
///
/// # Example
///
/// ```rust,no_run
/// use obj_watch::{WatchConfig, WatchWorker};
/// use watch_target::ObjectTarget;
///
/// let worker = WatchWorker::spawn()?;
/// let target = ObjectTarget::new();
///
/// worker.watch(
///     target.clone(),
///     "ready",
///     WatchConfig::new().on_success(|value, _| println!("ready: {:?}", value)),
/// )?;
///
/// target.set("ready", true);
/// # Ok::<(), obj_watch::WatchError>(())
/// ```
pub struct WatchWorker {
    command_tx: mpsc::UnboundedSender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl WatchWorker {
    /// Start the background worker
    pub fn spawn() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let thread = thread::Builder::new()
            .name("obj-watch-worker".to_string())
            .spawn(move || {
                runtime.block_on(run_event_loop(command_rx));
            })?;

        Ok(Self {
            command_tx,
            thread: Some(thread),
        })
    }

    /// Start polling `target` for `selector` on the worker
    ///
    /// Argument errors are returned here, on the caller's thread.
    pub fn watch<T>(&self, target: T, selector: impl Into<String>, config: WatchConfig) -> Result<()>
    where
        T: WatchTarget + 'static,
    {
        let session = PollSession::new(Arc::new(target), selector, config)?;
        self.command_tx
            .send(Command::Start(session))
            .map_err(|_| WatchError::WorkerStopped)
    }

    /// Check if the worker still accepts sessions
    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Stop the worker and wait for its thread to exit
    ///
    /// Unresolved sessions are dropped without invoking their callbacks.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            thread.join().map_err(|_| WatchError::WorkerStopped)?;
        }
        Ok(())
    }
}

impl Drop for WatchWorker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("obj_watch worker did not stop cleanly: {}", e);
        }
    }
}

/// Main event loop running inside the worker runtime
async fn run_event_loop(mut command_rx: mpsc::UnboundedReceiver<Command>) {
    tracing::debug!("obj_watch worker started");

    while let Some(command) = command_rx.recv().await {
        match command {
            Command::Start(session) => {
                tracing::debug!(selector = session.selector(), "obj_watch worker starting session");
                tokio::spawn(session.run());
            }
            Command::Shutdown => {
                tracing::debug!("obj_watch worker received shutdown command");
                break;
            }
        }
    }

    tracing::debug!("obj_watch worker shut down");
}
