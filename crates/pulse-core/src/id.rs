//! Event identifiers.
//!
//! Event ids are ULIDs: 128-bit, lexicographically sortable by creation
//! time, rendered as 26-character Crockford base32 strings. All ids in a
//! process come from one monotonic generator, so ids minted in construction
//! order also sort in construction order, even inside a single millisecond
//! or when the supplied timestamp does not advance.

use std::fmt;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::{Generator, Ulid};

use crate::error::DomainError;

static GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// Globally unique, sortable identifier of a single event occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Ulid);

impl EventId {
    /// Mints a new id whose timestamp component is `at`.
    #[must_use]
    pub fn generate(at: DateTime<Utc>) -> Self {
        let at: SystemTime = at.into();
        let mut generator = GENERATOR.lock().unwrap_or_else(PoisonError::into_inner);
        // Overflow only happens after 2^80 ids in one millisecond.
        let ulid = generator
            .generate_from_datetime(at)
            .unwrap_or_else(|_| Ulid::from_datetime(at));
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for EventId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EventId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| DomainError::Validation(format!("invalid event id {s:?}: {e}")))
    }
}
