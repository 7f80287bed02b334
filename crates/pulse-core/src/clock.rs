//! Clock abstraction for determinism.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Latest instant handed out by [`SystemClock`], in microseconds since the
/// Unix epoch.
static LAST_ISSUED_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
///
/// Readings have microsecond precision and never go backwards within a
/// process: if the wall clock is stepped back, the last issued instant is
/// repeated until real time catches up.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now();
        let micros = wall.timestamp_micros();
        let previous = LAST_ISSUED_MICROS.fetch_max(micros, Ordering::SeqCst);
        DateTime::from_timestamp_micros(previous.max(micros)).unwrap_or(wall)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::{Clock, SystemClock};

    #[test]
    fn test_system_clock_never_goes_backwards() {
        let readings: Vec<_> = (0..1_000).map(|_| SystemClock.now()).collect();

        assert!(readings.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_system_clock_has_microsecond_precision() {
        let now = SystemClock.now();

        assert_eq!(now.nanosecond() % 1_000, 0);
    }
}
