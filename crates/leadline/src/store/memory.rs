use crate::store::{CounterStore, SheetStore, StoreResult, validate_sheet_name};
use parking_lot::Mutex;
use std::collections::HashMap;

/// An in-process [`CounterStore`]. Values do not survive the process.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` with `value`.
    pub fn with_value(self, key: &str, value: impl Into<String>) -> Self {
        self.values.lock().insert(key.to_string(), value.into());
        self
    }

    /// Current value under `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

impl CounterStore for MemoryCounterStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// An in-process [`SheetStore`]. Rows do not survive the process.
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every row in `sheet`, or `None` if the sheet was never
    /// created.
    pub fn rows(&self, sheet: &str) -> Option<Vec<Vec<String>>> {
        self.sheets.lock().get(sheet).cloned()
    }
}

impl SheetStore for MemorySheetStore {
    fn ensure_sheet(&self, sheet: &str) -> StoreResult<()> {
        validate_sheet_name(sheet)?;
        self.sheets.lock().entry(sheet.to_string()).or_default();
        Ok(())
    }

    fn row_count(&self, sheet: &str) -> StoreResult<usize> {
        Ok(self.sheets.lock().get(sheet).map_or(0, Vec::len))
    }

    fn append_row(&self, sheet: &str, cells: &[String]) -> StoreResult<()> {
        validate_sheet_name(sheet)?;
        self.sheets
            .lock()
            .entry(sheet.to_string())
            .or_default()
            .push(cells.to_vec());
        Ok(())
    }
}
