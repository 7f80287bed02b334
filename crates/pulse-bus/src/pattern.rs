//! Subscription patterns over dotted event names.

use std::fmt;
use std::str::FromStr;

use pulse_core::error::DomainError;

/// Selects which event names a subscriber receives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventPattern {
    /// `*`: every event.
    All,
    /// `Project.*` or `Project.Task.*`: every name under the given segments.
    Prefix(String),
    /// A single event name, compared exactly.
    Exact(String),
}

impl EventPattern {
    /// Returns `true` if `event_name` is selected by this pattern.
    #[must_use]
    pub fn matches(&self, event_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(name) => name == event_name,
            Self::Prefix(prefix) => event_name
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.len() > 1 && rest.starts_with('.')),
        }
    }
}

impl FromStr for EventPattern {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::Validation(format!("invalid event pattern {s:?}: {reason}"));

        if s == "*" {
            return Ok(Self::All);
        }
        let (body, wildcard) = match s.strip_suffix(".*") {
            Some(body) => (body, true),
            None => (s, false),
        };
        if body.is_empty() {
            return Err(invalid("empty pattern"));
        }
        for segment in body.split('.') {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if segment.contains('*') {
                return Err(invalid("wildcard is only allowed as the final segment"));
            }
        }
        Ok(if wildcard {
            Self::Prefix(body.to_owned())
        } else {
            Self::Exact(body.to_owned())
        })
    }
}

impl fmt::Display for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Prefix(prefix) => write!(f, "{prefix}.*"),
            Self::Exact(name) => f.write_str(name),
        }
    }
}
