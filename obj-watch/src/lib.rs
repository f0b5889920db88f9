//! # obj-watch
//!
//! Poll a target on a fixed delay until a property appears or a selector
//! matches, then call back.
//!
//! ## Overview
//!
//! A watch checks its target once per tick. Document-like targets (those
//! exposing [`watch_target::Queryable`]) are queried with the selector and
//! succeed on one or more matches. Every other target is checked for a
//! property named by the selector. The first success stops the timer and
//! calls `on_success` with the detected value; with a non-zero attempt
//! budget, running out stops the timer and calls `on_failure`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use obj_watch::{wait_for, WatchConfig};
//! use watch_target::{Document, Element};
//!
//! # #[tokio::main]
//! # async fn main() -> obj_watch::Result<()> {
//! let doc = Document::new();
//! let writer = doc.clone();
//!
//! tokio::spawn(async move {
//!     tokio::time::sleep(std::time::Duration::from_millis(50)).await;
//!     writer.append_child(Element::new("div").with_id("app"));
//! });
//!
//! let outcome = wait_for(doc, "#app", WatchConfig::new().with_delay_millis(10)).await?;
//! assert!(outcome.is_found());
//! # Ok(())
//! # }
//! ```
//!
//! ## Entry points
//!
//! - [`watch`]: fire-and-forget on the current tokio runtime
//! - [`wait_for`]: the same session as a future resolving to [`WatchOutcome`]
//! - [`WatchWorker`]: synchronous facade with its own runtime thread
//!
//! ## Session lifecycle
//!
//! ```text
//! watch()/wait_for()/WatchWorker::watch()
//!     │  validate target + selector + config  ──► Err(InvalidArgument)
//!     ▼
//! PollSession ── interval tick ──► attempts += 1 ──► detect
//!     ▲                                               │
//!     └───────────── Pending ◄────────────────────────┤
//!                                                     ├─► Found: stop, on_success(detected, ctx)
//!                                                     └─► Exhausted: stop, on_failure(ctx)
//! ```

pub mod config;
pub mod context;
pub mod detect;
pub mod error;
pub mod logging;
pub mod session;
pub mod watch;
pub mod worker;

// Re-export main types for convenience
pub use config::{ConfigSnapshot, FailureCallback, SuccessCallback, WatchConfig};
pub use context::WatchContext;
pub use detect::{Detected, DetectionMode};
pub use error::{InvalidArgument, Result, WatchError, USAGE};
pub use session::{PollSession, TickOutcome};
pub use watch::{wait_for, watch, WatchOutcome};
pub use worker::WatchWorker;

// Re-export commonly used target types
pub use watch_target::{Document, Element, NodeList, ObjectTarget, Queryable, WatchTarget};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        wait_for, watch, Detected, Document, Element, ObjectTarget, Result, WatchConfig,
        WatchContext, WatchError, WatchOutcome, WatchTarget, WatchWorker,
    };
}
