//! JSON file backed counter store

use super::{CounterBackend, CounterError, CounterResult, CounterTable, PersistentCounters};
use crate::io::atomic_write;
use log::{error, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Writes the counter table to a JSON file via temp-file-then-rename
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Backend writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Counter file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a table from disk.
    ///
    /// A missing or blank file yields `None`; content that is not a counter
    /// table is an error and the file is left as it is.
    pub fn load(&self) -> CounterResult<Option<CounterTable>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CounterError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            warn!(
                "Counter file {} is empty, starting with no counters",
                self.path.display()
            );
            return Ok(None);
        }

        let mut table: CounterTable =
            serde_json::from_str(&content).map_err(|source| CounterError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        table.ensure_categories();
        Ok(Some(table))
    }
}

impl CounterBackend for JsonFileBackend {
    fn persist(&self, table: &CounterTable) -> CounterResult<()> {
        let json = serde_json::to_vec_pretty(table)?;
        atomic_write(&self.path, &json).map_err(|source| {
            error!(
                "Failed to save counters to {}: {source}",
                self.path.display()
            );
            CounterError::Io {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Durable counter store
pub type FileCounterStore = PersistentCounters<JsonFileBackend>;

impl PersistentCounters<JsonFileBackend> {
    /// Open the counter file at `path`, creating it when missing
    pub fn open(path: impl Into<PathBuf>) -> CounterResult<Self> {
        let backend = JsonFileBackend::new(path);
        let table = match backend.load()? {
            Some(table) => table,
            None => {
                info!(
                    "Counter file {} not found, creating a new one",
                    backend.path().display()
                );
                let table = CounterTable::new();
                backend.persist(&table)?;
                table
            }
        };
        Ok(Self::with_table(table, backend))
    }

    /// Counter file location
    pub fn path(&self) -> &Path {
        self.backend().path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::{CounterCategory, CounterStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("counters.json");

        let store = FileCounterStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"counters": {"auto": {}, "custom": {}, "system": {}}})
        );
    }

    #[test]
    fn test_every_increment_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let store = FileCounterStore::open(&path).unwrap();

        store
            .get_and_increment("auto_Invoice", CounterCategory::Auto, 1000, 1)
            .unwrap();

        let reloaded = JsonFileBackend::new(&path).load().unwrap().unwrap();
        assert_eq!(reloaded.get(CounterCategory::Auto, "auto_Invoice"), Some(1001));
    }

    #[test]
    fn test_blank_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        fs::write(&path, "  \n").unwrap();

        let store = FileCounterStore::open(&path).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_reported_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileCounterStore::open(&path).unwrap_err();
        assert!(matches!(err, CounterError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_persist_keeps_memory_and_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let store = FileCounterStore::open(&path).unwrap();
        store
            .get_and_increment("auto_X", CounterCategory::Auto, 1, 1)
            .unwrap();

        // A read-only directory refuses the temp file
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        let probe = dir.path().join("probe");
        let writable = fs::write(&probe, b"").is_ok();
        let result = store.get_and_increment("auto_X", CounterCategory::Auto, 1, 1);
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        if writable {
            // Running as root: permissions are not enforced
            return;
        }
        assert!(result.is_err());
        assert_eq!(store.get("auto_X", CounterCategory::Auto).unwrap(), Some(2));
        let on_disk = JsonFileBackend::new(&path).load().unwrap().unwrap();
        assert_eq!(on_disk.get(CounterCategory::Auto, "auto_X"), Some(2));
    }
}
