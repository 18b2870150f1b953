//! File-backed stores.
//!
//! Counters live in one JSON object file that is replaced atomically on every
//! write (temporary file, `fsync`, rename). Sheets live in a directory per
//! store ID with one JSON Lines file per sheet; every row is a JSON array of
//! strings and every append is `fsync`ed before returning.

use crate::store::{CounterStore, SheetStore, StoreResult, validate_sheet_name};
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

const SHEET_EXTENSION: &str = "jsonl";

/// A [`CounterStore`] persisted as a single JSON object file.
#[derive(Debug)]
pub struct FileCounterStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCounterStore {
    /// Opens (without creating) the counter file at `path`, creating its
    /// parent directory if needed. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        match File::open(&self.path) {
            Ok(file) => Ok(serde_json::from_reader(BufReader::new(file))?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> StoreResult<()> {
        let temp_path = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, values)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&temp_path, &self.path)?;
        sync_parent_dir(&self.path)
    }
}

/// Makes a rename inside `path`'s directory durable.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> StoreResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

// Directories cannot be opened as files here; the rename is left to the OS.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> StoreResult<()> {
    Ok(())
}

impl CounterStore for FileCounterStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }
}

/// A [`SheetStore`] persisted as JSON Lines files under
/// `<data_dir>/<store_id>/`.
#[derive(Debug)]
pub struct FileSheetStore {
    root: PathBuf,
    append_lock: Mutex<()>,
}

impl FileSheetStore {
    /// Opens the store identified by `store_id` under `data_dir`, creating the
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `store_id` is not a usable directory name or the
    /// directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>, store_id: &str) -> StoreResult<Self> {
        validate_sheet_name(store_id)?;
        let root = data_dir.as_ref().join(store_id);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            append_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sheet_path(&self, sheet: &str) -> StoreResult<PathBuf> {
        validate_sheet_name(sheet)?;
        Ok(self.root.join(format!("{sheet}.{SHEET_EXTENSION}")))
    }

    /// Reads every row of `sheet`. A missing sheet has no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a JSON
    /// array of strings.
    pub fn rows(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>> {
        let file = match File::open(self.sheet_path(sheet)?) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut rows = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(&line)?);
        }
        Ok(rows)
    }
}

impl SheetStore for FileSheetStore {
    fn ensure_sheet(&self, sheet: &str) -> StoreResult<()> {
        let path = self.sheet_path(sheet)?;
        OpenOptions::new().create(true).append(true).open(path)?;
        Ok(())
    }

    fn row_count(&self, sheet: &str) -> StoreResult<usize> {
        let file = match File::open(self.sheet_path(sheet)?) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut count = 0;
        for line in BufReader::new(file).lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn is_empty(&self, sheet: &str) -> StoreResult<bool> {
        match fs::metadata(self.sheet_path(sheet)?) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    fn append_row(&self, sheet: &str, cells: &[String]) -> StoreResult<()> {
        let path = self.sheet_path(sheet)?;
        let mut line = serde_json::to_string(cells)?;
        line.push('\n');

        let _guard = self.append_lock.lock();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use tempfile::TempDir;

    #[test]
    fn counter_missing_file_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileCounterStore::open(dir.path().join("state/counters.json")).unwrap();
        assert_eq!(store.get("LAST_SEQ").unwrap(), None);
        assert!(dir.path().join("state").is_dir());
    }

    #[test]
    fn counter_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counters.json");

        let store = FileCounterStore::open(&path).unwrap();
        store.set("LAST_SEQ", "41").unwrap();
        store.set("OTHER", "x").unwrap();
        store.set("LAST_SEQ", "42").unwrap();
        drop(store);

        let store = FileCounterStore::open(&path).unwrap();
        assert_eq!(store.get("LAST_SEQ").unwrap().as_deref(), Some("42"));
        assert_eq!(store.get("OTHER").unwrap().as_deref(), Some("x"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn counter_reports_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counters.json");
        fs::write(&path, "not json").unwrap();

        let store = FileCounterStore::open(&path).unwrap();
        assert!(matches!(store.get("LAST_SEQ"), Err(StoreError::Encoding(_))));
    }

    #[test]
    fn sheet_rows_append_in_order_and_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let store = FileSheetStore::open(dir.path(), "property-leads").unwrap();

        assert_eq!(store.row_count("Property Leads").unwrap(), 0);
        store.ensure_sheet("Property Leads").unwrap();
        assert_eq!(store.row_count("Property Leads").unwrap(), 0);

        let first = vec!["a".to_string(), "quote \" and, comma".to_string()];
        let second = vec!["b".to_string(), "line\nbreak".to_string()];
        store.append_row("Property Leads", &first).unwrap();
        store.append_row("Property Leads", &second).unwrap();
        drop(store);

        let store = FileSheetStore::open(dir.path(), "property-leads").unwrap();
        assert_eq!(store.row_count("Property Leads").unwrap(), 2);
        assert_eq!(store.rows("Property Leads").unwrap(), vec![first, second]);
        assert!(store.root().join("Property Leads.jsonl").is_file());
    }

    #[test]
    fn sheet_names_cannot_escape_the_store() {
        let dir = TempDir::new().unwrap();
        let store = FileSheetStore::open(dir.path(), "leads").unwrap();
        assert!(matches!(
            store.ensure_sheet("../outside"),
            Err(StoreError::InvalidSheetName { .. })
        ));
        assert!(FileSheetStore::open(dir.path(), "..").is_err());
    }

    #[test]
    fn sheet_emptiness_follows_the_file_without_reading_rows() {
        let dir = TempDir::new().unwrap();
        let store = FileSheetStore::open(dir.path(), "property-leads").unwrap();

        assert!(store.is_empty("Property Leads").unwrap());
        store.ensure_sheet("Property Leads").unwrap();
        assert!(store.is_empty("Property Leads").unwrap());

        store
            .append_row("Property Leads", &["Timestamp".to_string()])
            .unwrap();
        assert!(!store.is_empty("Property Leads").unwrap());

        // A line that is not a row still makes the sheet non-empty.
        fs::write(store.root().join("Property Leads.jsonl"), "garbage\n").unwrap();
        assert!(!store.is_empty("Property Leads").unwrap());
        assert!(store.rows("Property Leads").is_err());
    }

    #[test]
    fn counter_write_syncs_the_containing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/counters.json");
        let store = FileCounterStore::open(&path).unwrap();

        store.set("LAST_SEQ", "1").unwrap();
        sync_parent_dir(&path).unwrap();
        sync_parent_dir(Path::new("counters.json")).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["counters.json"]);
    }
}
