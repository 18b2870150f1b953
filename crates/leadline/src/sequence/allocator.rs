use crate::{
    error::{Error, Result},
    lead::LeadId,
    store::CounterStore,
};
use chrono::{DateTime, TimeZone};
use core::{fmt, time::Duration};
use parking_lot::Mutex;

/// Counter key holding the last issued sequence number.
pub const SEQUENCE_KEY: &str = "LAST_SEQ";

/// How long an allocation waits for the sequence lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(15);

/// A lock-based sequence allocator backed by a durable [`CounterStore`].
///
/// Every allocation runs read, increment, persist under a process-wide
/// mutex, so no two callers can observe the same counter value. The counter
/// is written before the new sequence is handed out; a caller that later fails
/// leaves a gap, never a duplicate.
///
/// Lock acquisition is bounded by [`Self::lock_timeout`]. A contended lock
/// past that bound fails with [`Error::LockTimeout`] and nothing is written.
///
/// ## Holding the lock across follow-up work
///
/// [`Self::with_next`] and [`Self::with_next_id`] keep the lock held while the
/// caller's closure runs. The pipeline uses this to append the lead record
/// before any other allocation can proceed, so sheet order matches sequence
/// order. [`Self::next_sequence`] and [`Self::next_id`] release immediately.
///
/// # Example
/// ```
/// use leadline::{MemoryCounterStore, SEQUENCE_KEY, SequenceAllocator};
///
/// let allocator = SequenceAllocator::new(MemoryCounterStore::new().with_value(SEQUENCE_KEY, "4"));
///
/// assert_eq!(allocator.next_sequence().unwrap(), 5);
/// assert_eq!(allocator.next_sequence().unwrap(), 6);
/// assert_eq!(allocator.counter().value(SEQUENCE_KEY).as_deref(), Some("6"));
/// ```
pub struct SequenceAllocator<C>
where
    C: CounterStore,
{
    counter: C,
    lock: Mutex<()>,
    lock_timeout: Duration,
}

impl<C> SequenceAllocator<C>
where
    C: CounterStore,
{
    /// Creates an allocator over `counter` with [`DEFAULT_LOCK_TIMEOUT`].
    pub fn new(counter: C) -> Self {
        Self {
            counter,
            lock: Mutex::new(()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Replaces the bounded wait for the sequence lock.
    #[must_use]
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// Reserves the next sequence number and runs `f` with it while the lock
    /// is still held.
    ///
    /// The counter is persisted before `f` runs and is not rolled back if `f`
    /// fails.
    ///
    /// # Errors
    ///
    /// - [`Error::LockTimeout`] if the lock stays contended past the timeout.
    /// - [`Error::CounterStore`] / [`Error::CorruptCounter`] if the counter
    ///   cannot be read, parsed, or persisted. `f` is not called.
    /// - Whatever `f` returns.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn with_next<R>(&self, f: impl FnOnce(u64) -> Result<R>) -> Result<R> {
        let _guard = self
            .lock
            .try_lock_for(self.lock_timeout)
            .ok_or(Error::LockTimeout {
                waited: self.lock_timeout,
            })?;

        let sequence = self.reserve()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(sequence, "reserved sequence");
        f(sequence)
    }

    /// Like [`Self::with_next`], handing `f` the formatted [`LeadId`] for
    /// `at`.
    ///
    /// # Errors
    ///
    /// See [`Self::with_next`].
    pub fn with_next_id<Tz, R>(
        &self,
        at: &DateTime<Tz>,
        f: impl FnOnce(LeadId) -> Result<R>,
    ) -> Result<R>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.with_next(|sequence| f(LeadId::new(at, sequence)))
    }

    /// Reserves and returns the next sequence number.
    ///
    /// # Errors
    ///
    /// See [`Self::with_next`].
    pub fn next_sequence(&self) -> Result<u64> {
        self.with_next(Ok)
    }

    /// Reserves the next sequence number and formats it as a [`LeadId`] for
    /// `at`.
    ///
    /// # Errors
    ///
    /// See [`Self::with_next`].
    pub fn next_id<Tz>(&self, at: &DateTime<Tz>) -> Result<LeadId>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.with_next_id(at, Ok)
    }

    /// Read-increment-persist. Must only be called with the lock held.
    fn reserve(&self) -> Result<u64> {
        let current = self.current()?;
        let next = current.checked_add(1).ok_or_else(|| Error::CorruptCounter {
            key: SEQUENCE_KEY,
            value: current.to_string(),
        })?;
        self.counter
            .set(SEQUENCE_KEY, &next.to_string())
            .map_err(Error::CounterStore)?;
        Ok(next)
    }

    /// Last persisted sequence number; an unset counter reads as 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter cannot be read or does not hold a
    /// non-negative integer.
    pub fn current(&self) -> Result<u64> {
        let raw = self
            .counter
            .get(SEQUENCE_KEY)
            .map_err(Error::CounterStore)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(value) => value.parse().map_err(|_| Error::CorruptCounter {
                key: SEQUENCE_KEY,
                value: value.to_string(),
            }),
        }
    }
}

impl<C> fmt::Debug for SequenceAllocator<C>
where
    C: CounterStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceAllocator")
            .field("lock_timeout", &self.lock_timeout)
            .field("locked", &self.lock.is_locked())
            .finish_non_exhaustive()
    }
}
