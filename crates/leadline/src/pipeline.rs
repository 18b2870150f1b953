use crate::{
    appender::RecordAppender,
    error::Result,
    lead::{LeadForm, LeadId, LeadRecord},
    sequence::SequenceAllocator,
    store::{CounterStore, SheetStore},
    time::{TimeSource, Zone},
};

/// What a successful submission produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeadReceipt {
    pub record: LeadRecord,
}

impl LeadReceipt {
    pub fn lead_id(&self) -> &LeadId {
        &self.record.lead_id
    }
}

/// A minimal interface for accepting lead submissions.
///
/// Implementations are synchronous and may block on storage.
pub trait Intake: Send + Sync {
    /// Validates `form`, allocates a lead identifier and records the lead.
    ///
    /// # Errors
    ///
    /// Any [`crate::Error`]; nothing is written for validation failures.
    fn submit(&self, form: &LeadForm) -> Result<LeadReceipt>;
}

/// Validate, allocate, append.
///
/// The sequence lock is held from the counter read until the record has been
/// appended, so rows land in the sheet in sequence order and a concurrent
/// submission never sees a reserved identifier without its row. If the append
/// fails the counter stays advanced and that identifier is never used.
#[derive(Debug)]
pub struct LeadPipeline<C, S, T>
where
    C: CounterStore,
    S: SheetStore,
    T: TimeSource,
{
    allocator: SequenceAllocator<C>,
    appender: RecordAppender<S>,
    clock: T,
    zone: Zone,
}

impl<C, S, T> LeadPipeline<C, S, T>
where
    C: CounterStore,
    S: SheetStore,
    T: TimeSource,
{
    pub fn new(
        allocator: SequenceAllocator<C>,
        appender: RecordAppender<S>,
        clock: T,
        zone: Zone,
    ) -> Self {
        Self {
            allocator,
            appender,
            clock,
            zone,
        }
    }

    pub fn allocator(&self) -> &SequenceAllocator<C> {
        &self.allocator
    }

    pub fn appender(&self) -> &RecordAppender<S> {
        &self.appender
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Runs one submission end to end.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidSubmission`] before anything is touched.
    /// - [`crate::Error::LockTimeout`], [`crate::Error::CounterStore`] or
    ///   [`crate::Error::CorruptCounter`] before any row is written.
    /// - [`crate::Error::SheetStore`] after the counter advanced.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn submit(&self, form: &LeadForm) -> Result<LeadReceipt> {
        let submission = form.validate()?;

        // The clock is read under the sequence lock so stamps never run
        // backwards relative to sequence order.
        self.allocator.with_next(|sequence| {
            let at = self.zone.localize(self.clock.now());
            let record = LeadRecord::new(&at, LeadId::new(&at, sequence), submission);
            self.appender.append(&record)?;
            #[cfg(feature = "tracing")]
            tracing::info!(lead_id = %record.lead_id, "lead recorded");
            Ok(LeadReceipt { record })
        })
    }
}

impl<C, S, T> Intake for LeadPipeline<C, S, T>
where
    C: CounterStore,
    S: SheetStore,
    T: TimeSource + Send + Sync,
{
    fn submit(&self, form: &LeadForm) -> Result<LeadReceipt> {
        self.submit(form)
    }
}
