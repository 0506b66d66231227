use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

use crate::errors::StateError;
use crate::model::ScanSession;

/// Durable home of the session record.
///
/// Implementations hold exactly one session. There is no locking primitive
/// shared with other tabs; callers re-read the latest record at the start of
/// every invocation instead of trusting a held copy.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<ScanSession>, StateError>;
    fn save(&self, session: &ScanSession) -> Result<(), StateError>;
    fn clear(&self) -> Result<(), StateError>;
}

/// Session record as a single JSON document on disk.
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<Option<ScanSession>, StateError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // An unreadable record is indistinguishable from no record;
                // the next scan start rewrites it.
                warn!(path = %self.path.display(), %err, "discarding unparsable session record");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &ScanSession) -> Result<(), StateError> {
        let data = serde_json::to_vec_pretty(session)?;
        write_atomic(&self.path, &data)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StateError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
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

/// In-memory store for tests and embedders that manage durability themselves.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<ScanSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<ScanSession>, StateError> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, session: &ScanSession) -> Result<(), StateError> {
        *self.inner.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StateError> {
        *self.inner.lock() = None;
        Ok(())
    }
}
