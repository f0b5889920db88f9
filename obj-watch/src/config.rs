//! Configuration types for the obj-watch crate
//!
//! `WatchConfig` controls one polling session: how many ticks to allow, how
//! long to wait between ticks, whether to log each tick, and which callbacks
//! resolve the session.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::WatchContext;
use crate::detect::Detected;
use crate::error::{Result, WatchError};

/// Default attempt budget (0 polls until found)
pub const DEFAULT_ATTEMPTS: u32 = 0;

/// Default delay between ticks
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Environment override for `attempts`
pub const ENV_ATTEMPTS: &str = "OBJ_WATCH_ATTEMPTS";

/// Environment override for `delay`, in milliseconds
pub const ENV_DELAY_MS: &str = "OBJ_WATCH_DELAY_MS";

/// Environment override for `debug`
pub const ENV_DEBUG: &str = "OBJ_WATCH_DEBUG";

/// Called once with the detected value when the watch succeeds
pub type SuccessCallback = Box<dyn FnOnce(Detected, &WatchContext) + Send + 'static>;

/// Called once when the attempt budget runs out
pub type FailureCallback = Box<dyn FnOnce(&WatchContext) + Send + 'static>;

/// Configuration for a watch session
///
/// Unspecified fields keep their defaults:
///
/// ```rust
/// use std::time::Duration;
/// use obj_watch::WatchConfig;
///
/// let config = WatchConfig {
///     attempts: 3,
///     ..Default::default()
/// };
/// assert_eq!(config.delay, Duration::from_millis(100));
///
/// let config = WatchConfig::new()
///     .with_delay_millis(10)
///     .with_debug(true)
///     .on_success(|detected, ctx| println!("found {:?} after {}", detected, ctx.attempts()));
/// assert!(config.debug);
/// ```
pub struct WatchConfig {
    /// Maximum number of ticks before giving up; 0 means unlimited
    /// Default: 0
    pub attempts: u32,

    /// Delay between ticks, constant for the whole session
    /// Default: 100 milliseconds
    pub delay: Duration,

    /// Log every tick with its context
    /// Default: false
    pub debug: bool,

    /// Success callback
    /// Default: logs "obj_watch success"
    pub on_success: SuccessCallback,

    /// Failure callback
    /// Default: logs "obj_watch failure"
    pub on_failure: FailureCallback,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
            debug: false,
            on_success: Box::new(|detected, context| {
                tracing::info!(?detected, ?context, "obj_watch success");
            }),
            on_failure: Box::new(|context| {
                tracing::info!(?context, "obj_watch failure");
            }),
        }
    }
}

impl WatchConfig {
    /// Create a new WatchConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay environment overrides on the defaults
    ///
    /// Reads `OBJ_WATCH_ATTEMPTS`, `OBJ_WATCH_DELAY_MS` and `OBJ_WATCH_DEBUG`.
    /// Unset variables keep the defaults; malformed ones are errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(ENV_ATTEMPTS) {
            config.attempts = value.trim().parse().map_err(|_| WatchError::InvalidEnv {
                name: ENV_ATTEMPTS,
                value,
            })?;
        }

        if let Ok(value) = std::env::var(ENV_DELAY_MS) {
            let millis: u64 = value.trim().parse().map_err(|_| WatchError::InvalidEnv {
                name: ENV_DELAY_MS,
                value,
            })?;
            config.delay = Duration::from_millis(millis);
        }

        if let Ok(value) = std::env::var(ENV_DEBUG) {
            config.debug = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(WatchError::InvalidEnv {
                        name: ENV_DEBUG,
                        value,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.delay.is_zero() {
            return Err(WatchError::Configuration(
                "Delay must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The serializable part of the configuration
    ///
    /// The delay is recorded in whole milliseconds, rounded down. Sessions
    /// tick on the exact configured `delay`.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            attempts: self.attempts,
            delay_ms: u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
            debug: self.debug,
        }
    }

    /// Set the attempt budget (0 polls until found)
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the delay between ticks
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the delay between ticks in milliseconds
    pub fn with_delay_millis(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    /// Log every tick with its context
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the callback run with the detected value
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Detected, &WatchContext) + Send + 'static,
    {
        self.on_success = Box::new(f);
        self
    }

    /// Success callback that only receives the context
    ///
    /// Matches the older property-check callback shape, which confirmed
    /// presence without handing back the value.
    pub fn on_found<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&WatchContext) + Send + 'static,
    {
        self.on_success = Box::new(move |_, context| f(context));
        self
    }

    /// Set the callback run when the attempt budget is spent
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&WatchContext) + Send + 'static,
    {
        self.on_failure = Box::new(f);
        self
    }
}

impl fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("attempts", &self.attempts)
            .field("delay", &self.delay)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Effective configuration as recorded in the watch context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub attempts: u32,
    pub delay_ms: u64,
    pub debug: bool,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        WatchConfig::default().snapshot()
    }
}

impl ConfigSnapshot {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Whether the session polls until found
    pub fn is_unlimited(&self) -> bool {
        self.attempts == 0
    }
}
