//! Trade sources: the seam where an external loader hands over raw rows.

use flow_core::{config::ColumnMapping, RawTradeRow, Result};
use flow_ingestion::{RawRecord, RecordMapper};
use std::path::PathBuf;

/// Supplier of one full raw trade table per load.
pub trait TradeSource {
    /// Human-readable description for logs and snapshots.
    fn describe(&self) -> String;

    /// Fetch the table. `Ok(None)` means no input is available.
    fn fetch(&self) -> Result<Option<Vec<RawTradeRow>>>;
}

/// Rows already in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: String,
    rows: Option<Vec<RawTradeRow>>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, rows: Option<Vec<RawTradeRow>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

impl TradeSource for InMemorySource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn fetch(&self) -> Result<Option<Vec<RawTradeRow>>> {
        Ok(self.rows.clone())
    }
}

/// A JSON array of column-keyed records on disk.
///
/// A missing file is reported as absent input, not as an I/O error.
#[derive(Debug, Clone)]
pub struct JsonRecordsSource {
    path: PathBuf,
    mapper: RecordMapper,
}

impl JsonRecordsSource {
    /// Create a source reading `path` with the given column names.
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMapping) -> Self {
        Self {
            path: path.into(),
            mapper: RecordMapper::new(columns),
        }
    }
}

impl TradeSource for JsonRecordsSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Option<Vec<RawTradeRow>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let records: Vec<RawRecord> = serde_json::from_str(&json)?;
        self.mapper.map_records(&records).map(Some)
    }
}
