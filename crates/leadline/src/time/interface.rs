use chrono::{DateTime, Utc};

/// A source of wall-clock instants.
///
/// This abstraction allows you to plug in the real system clock, or a pinned
/// instant in tests. Lead identifiers and record timestamps are both derived
/// from a single call per submission.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, TimeZone, Utc};
/// use leadline::TimeSource;
///
/// struct Noon;
/// impl TimeSource for Noon {
///     fn now(&self) -> DateTime<Utc> {
///         Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
///     }
/// }
///
/// assert_eq!(Noon.now().timestamp(), 1_741_953_600);
/// ```
pub trait TimeSource {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
