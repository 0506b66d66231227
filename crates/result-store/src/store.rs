use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::errors::ResultStoreError;
use crate::model::{CapturedResult, RecordRow};

/// Durable identifier → captured-records map. `put` overwrites any prior
/// entry for the identifier.
pub trait ResultStore: Send + Sync {
    fn put(
        &self,
        identifier: &str,
        records: Vec<RecordRow>,
        now_ms: i64,
    ) -> Result<(), ResultStoreError>;

    fn get(&self, identifier: &str) -> Result<Option<CapturedResult>, ResultStoreError>;

    fn get_all(&self) -> Result<BTreeMap<String, CapturedResult>, ResultStoreError>;
}

/// Result map as a single JSON document on disk, rewritten per capture. The
/// map stays small (one entry per scanned identifier), so read-modify-write
/// of the whole document is cheaper than maintaining an index.
pub struct JsonResultStore {
    path: PathBuf,
}

impl JsonResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, CapturedResult>, ResultStoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "discarding unparsable result map");
                Ok(BTreeMap::new())
            }
        }
    }
}

impl ResultStore for JsonResultStore {
    fn put(
        &self,
        identifier: &str,
        records: Vec<RecordRow>,
        now_ms: i64,
    ) -> Result<(), ResultStoreError> {
        let mut map = self.read_map()?;
        debug!(identifier, count = records.len(), "storing captured records");
        map.insert(
            identifier.to_string(),
            CapturedResult {
                captured_at_ms: now_ms,
                records,
            },
        );
        let data = serde_json::to_vec_pretty(&map)?;
        write_atomic(&self.path, &data)?;
        Ok(())
    }

    fn get(&self, identifier: &str) -> Result<Option<CapturedResult>, ResultStoreError> {
        Ok(self.read_map()?.remove(identifier))
    }

    fn get_all(&self) -> Result<BTreeMap<String, CapturedResult>, ResultStoreError> {
        self.read_map()
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryResultStore {
    inner: Mutex<BTreeMap<String, CapturedResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn put(
        &self,
        identifier: &str,
        records: Vec<RecordRow>,
        now_ms: i64,
    ) -> Result<(), ResultStoreError> {
        self.inner.lock().insert(
            identifier.to_string(),
            CapturedResult {
                captured_at_ms: now_ms,
                records,
            },
        );
        Ok(())
    }

    fn get(&self, identifier: &str) -> Result<Option<CapturedResult>, ResultStoreError> {
        Ok(self.inner.lock().get(identifier).cloned())
    }

    fn get_all(&self) -> Result<BTreeMap<String, CapturedResult>, ResultStoreError> {
        Ok(self.inner.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<RecordRow> {
        (0..n)
            .map(|i| {
                RecordRow::new()
                    .with_cell("Item", format!("item-{i}"))
                    .with_cell("Dispensed", "2024-03-0".to_string() + &(i + 1).to_string())
            })
            .collect()
    }

    #[test]
    fn round_trip_preserves_records_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonResultStore::new(dir.path().join("results.json"));

        let records = rows(4);
        store.put("9876543210", records.clone(), 1_700_000_000_000).unwrap();

        let captured = store.get("9876543210").unwrap().unwrap();
        assert_eq!(captured.captured_at_ms, 1_700_000_000_000);
        assert_eq!(captured.records, records);
    }

    #[test]
    fn put_overwrites_prior_entry() {
        let store = MemoryResultStore::new();
        store.put("x", rows(3), 10).unwrap();
        store.put("x", rows(1), 20).unwrap();

        let captured = store.get("x").unwrap().unwrap();
        assert_eq!(captured.captured_at_ms, 20);
        assert_eq!(captured.records.len(), 1);
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn entries_accumulate_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        // Two stores standing in for two separate scan sessions.
        JsonResultStore::new(&path).put("a", rows(1), 1).unwrap();
        JsonResultStore::new(&path).put("b", rows(2), 2).unwrap();

        let all = JsonResultStore::new(&path).get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a"].records.len(), 1);
        assert_eq!(all["b"].records.len(), 2);
    }

    #[test]
    fn missing_identifier_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonResultStore::new(dir.path().join("results.json"));
        assert!(store.get("nobody").unwrap().is_none());
        assert!(store.get_all().unwrap().is_empty());
    }
}
