use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One scraped results-table row. Column layout varies by portal build, so a
/// row is the ordered header → cell-text map rather than a fixed struct.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub cells: BTreeMap<String, String>,
}

impl RecordRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// Everything captured for one identifier, stamped at capture time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CapturedResult {
    pub captured_at_ms: i64,
    pub records: Vec<RecordRow>,
}
