use crate::error::StoreError;
use std::sync::Arc;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// A durable key-value store holding string values.
///
/// Each call is expected to be atomic at the granularity of one key. The
/// sequence allocator only ever touches a single key.
pub trait CounterStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if it was never set.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Durably stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// A durable, append-only collection of named sheets, each an ordered list of
/// rows of string cells.
pub trait SheetStore: Send + Sync {
    /// Creates the sheet if it does not exist yet. Existing rows are left
    /// untouched.
    fn ensure_sheet(&self, sheet: &str) -> StoreResult<()>;

    /// Number of rows currently in the sheet, header included.
    fn row_count(&self, sheet: &str) -> StoreResult<usize>;

    /// Whether the sheet has no rows. Backends that can answer without
    /// counting should override this.
    fn is_empty(&self, sheet: &str) -> StoreResult<bool> {
        Ok(self.row_count(sheet)? == 0)
    }

    /// Appends one row after the last existing row.
    fn append_row(&self, sheet: &str, cells: &[String]) -> StoreResult<()>;
}

impl<T: CounterStore + ?Sized> CounterStore for Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}

impl<T: SheetStore + ?Sized> SheetStore for Arc<T> {
    fn ensure_sheet(&self, sheet: &str) -> StoreResult<()> {
        (**self).ensure_sheet(sheet)
    }

    fn row_count(&self, sheet: &str) -> StoreResult<usize> {
        (**self).row_count(sheet)
    }

    fn is_empty(&self, sheet: &str) -> StoreResult<bool> {
        (**self).is_empty(sheet)
    }

    fn append_row(&self, sheet: &str, cells: &[String]) -> StoreResult<()> {
        (**self).append_row(sheet, cells)
    }
}

/// Checks that `sheet` can be used as a sheet name on every backend.
///
/// # Errors
///
/// Rejects empty names, names with path separators or control characters,
/// and the relative components `.` and `..`.
pub fn validate_sheet_name(sheet: &str) -> StoreResult<()> {
    let trimmed = sheet.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || sheet
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control());
    if invalid {
        return Err(StoreError::InvalidSheetName {
            name: sheet.to_string(),
        });
    }
    Ok(())
}
