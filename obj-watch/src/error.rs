//! Error types for the obj-watch crate.

use thiserror::Error;

use crate::config::ConfigSnapshot;

/// Expected call shape, reported alongside argument errors
pub const USAGE: &str = "obj_watch::watch( <target> , <selector> [ , <config> ] )";

/// Why the arguments to a watch call were rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// The target is a scalar rather than an object
    #[error("target must be an object")]
    TargetNotObject,

    /// The selector is the empty string
    #[error("selector must be a non-empty string")]
    EmptySelector,
}

/// Errors that can occur when starting a watch
#[derive(Debug, Error)]
pub enum WatchError {
    /// Target or selector failed validation; no session was started
    #[error("obj_watch - invalid arguments: {reason}")]
    InvalidArgument {
        /// What was wrong with the arguments
        reason: InvalidArgument,
        /// Expected call shape
        usage: &'static str,
        /// The default configuration, for diagnostics
        defaults: ConfigSnapshot,
    },

    /// The supplied configuration is unusable
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// An environment override could not be parsed
    #[error("Invalid environment variable {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    /// `watch` was called outside a tokio runtime
    #[error("No tokio runtime available to drive the watch timer")]
    NoRuntime,

    /// The background worker runtime or thread could not be created
    #[error("Failed to start watch worker: {0}")]
    Runtime(#[from] std::io::Error),

    /// The worker (or session) ended before the watch could resolve
    #[error("Watch worker is not running")]
    WorkerStopped,
}

impl WatchError {
    pub(crate) fn invalid_argument(reason: InvalidArgument) -> Self {
        WatchError::InvalidArgument {
            reason,
            usage: USAGE,
            defaults: ConfigSnapshot::default(),
        }
    }

    /// The argument error reason, if this is an argument error
    pub fn invalid_reason(&self) -> Option<InvalidArgument> {
        match self {
            WatchError::InvalidArgument { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Result type for obj-watch operations
pub type Result<T> = std::result::Result<T, WatchError>;
