//! Bus configuration.

use std::time::Duration;

use pulse_core::error::DomainError;

/// Environment variable holding the per-subscriber timeout in milliseconds.
pub const SUBSCRIBER_TIMEOUT_ENV: &str = "PULSE_SUBSCRIBER_TIMEOUT_MS";

/// Environment variable holding the per-listener timeout in milliseconds.
pub const LISTENER_TIMEOUT_ENV: &str = "PULSE_LISTENER_TIMEOUT_MS";

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Runtime limits for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Upper bound on a single subscriber invocation.
    pub subscriber_timeout: Duration,
    /// Upper bound on a single `EventLogged` listener invocation.
    pub listener_timeout: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            subscriber_timeout: DEFAULT_TIMEOUT,
            listener_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BusConfig {
    /// Reads the configuration from the process environment, falling back
    /// to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a variable is set but is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a value is present but is not a
    /// positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let defaults = Self::default();
        Ok(Self {
            subscriber_timeout: read_millis(&lookup, SUBSCRIBER_TIMEOUT_ENV)?
                .unwrap_or(defaults.subscriber_timeout),
            listener_timeout: read_millis(&lookup, LISTENER_TIMEOUT_ENV)?
                .unwrap_or(defaults.listener_timeout),
        })
    }
}

fn read_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, DomainError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(DomainError::Validation(format!(
            "{key} must be a positive integer number of milliseconds, got {raw:?}"
        ))),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
    }
}
