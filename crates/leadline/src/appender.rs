use crate::{
    error::{Error, Result},
    lead::{LeadRecord, header_row},
    store::SheetStore,
};

/// Appends [`LeadRecord`]s to one named sheet of a [`SheetStore`], writing
/// the [`HEADER`](crate::HEADER) row first when the sheet is empty.
#[derive(Debug)]
pub struct RecordAppender<S>
where
    S: SheetStore,
{
    store: S,
    sheet: String,
}

impl<S> RecordAppender<S>
where
    S: SheetStore,
{
    pub fn new(store: S, sheet: impl Into<String>) -> Self {
        Self {
            store,
            sheet: sheet.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Appends `record` as one row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SheetStore`] on any store failure. A failure after
    /// the header was written leaves the header in place.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(sheet = %self.sheet, lead_id = %record.lead_id))
    )]
    pub fn append(&self, record: &LeadRecord) -> Result<()> {
        self.store
            .ensure_sheet(&self.sheet)
            .map_err(Error::SheetStore)?;

        if self.store.is_empty(&self.sheet).map_err(Error::SheetStore)? {
            #[cfg(feature = "tracing")]
            tracing::info!(sheet = %self.sheet, "writing header row to empty sheet");
            self.store
                .append_row(&self.sheet, &header_row())
                .map_err(Error::SheetStore)?;
        }

        self.store
            .append_row(&self.sheet, &record.to_row())
            .map_err(Error::SheetStore)
    }
}
