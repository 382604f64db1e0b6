//! Source readers: one CSV export file per platform.
//!
//! Reading is split in two steps so the same bytes feed both the load cache
//! fingerprint and the parser:
//! 1. `read_source` pulls the file into memory (missing/unreadable → `SourceRead`)
//! 2. `RawTable::parse` splits it into a header index and raw rows

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::DataError;
use crate::domain::Platform;

/// Raw bytes of one platform export, tagged with where they came from.
#[derive(Debug, Clone)]
pub struct SourceBytes {
    pub platform: Platform,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Read a platform export fully into memory.
pub fn read_source(platform: Platform, path: &Path) -> Result<SourceBytes, DataError> {
    let bytes = fs::read(path).map_err(|e| DataError::SourceRead {
        platform,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(SourceBytes {
        platform,
        path: path.to_path_buf(),
        bytes,
    })
}

/// Header name → column position lookup.
///
/// Header names are trimmed; when a name repeats, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut names = Vec::with_capacity(headers.len());
        let mut positions = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            let name = name.trim().to_string();
            positions.entry(name.clone()).or_insert(i);
            names.push(name);
        }
        Self { names, positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One data row and the 1-based file line it started on.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: u64,
    pub record: StringRecord,
}

/// A parsed but not yet normalized platform export.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub platform: Platform,
    pub path: PathBuf,
    pub columns: ColumnIndex,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Parse CSV bytes with a header row.
    ///
    /// Ragged rows and invalid UTF-8 are read errors; a header with no data rows
    /// is a valid, empty table.
    pub fn parse(source: &SourceBytes) -> Result<Self, DataError> {
        let read_err = |reason: String| DataError::SourceRead {
            platform: source.platform,
            path: source.path.clone(),
            reason,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(source.bytes.as_slice());

        let headers = reader
            .headers()
            .map_err(|e| read_err(format!("header row: {e}")))?
            .clone();
        let columns = ColumnIndex::from_headers(&headers);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| read_err(e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            rows.push(RawRow { line, record });
        }

        Ok(Self {
            platform: source.platform,
            path: source.path.clone(),
            columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
