use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::QueueBuildError;

/// Cached per-row lookup data, keyed by the schedule entry number. Filled by
/// a host-side scan that runs before any portal session exists.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    /// Portal lookup key for the subject behind this row.
    pub identifier: String,
    pub name: Option<String>,
    pub birth_date: Option<String>,
}

/// Read-only source of [`RowData`]. The cache's lifecycle belongs to the host
/// side; the queue builder only consumes it.
pub trait RowDataCache: Send + Sync {
    fn lookup(&self, entry_no: &str) -> Option<RowData>;
}

/// Cache backed by a plain map, for embedders and tests.
#[derive(Default)]
pub struct MemoryRowDataCache {
    rows: HashMap<String, RowData>,
}

impl MemoryRowDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry_no: impl Into<String>, row: RowData) {
        self.rows.insert(entry_no.into(), row);
    }
}

impl RowDataCache for MemoryRowDataCache {
    fn lookup(&self, entry_no: &str) -> Option<RowData> {
        self.rows.get(entry_no).cloned()
    }
}

/// Cache loaded once from a JSON document (entry number → row data), the
/// exchange format the host-side scan writes.
pub struct JsonRowDataCache {
    rows: HashMap<String, RowData>,
}

impl JsonRowDataCache {
    pub fn load(path: &Path) -> Result<Self, QueueBuildError> {
        let raw = fs::read_to_string(path)?;
        let rows = serde_json::from_str(&raw)?;
        Ok(Self { rows })
    }
}

impl RowDataCache for JsonRowDataCache {
    fn lookup(&self, entry_no: &str) -> Option<RowData> {
        self.rows.get(entry_no).cloned()
    }
}
