//! Unified fact table: every platform's normalized rows in one dataset.
//!
//! The builder owns date parsing: a row whose date cannot be parsed fails the
//! build instead of being dropped. Platform batches are concatenated in
//! canonical platform order with row order preserved, and a platform may only
//! be supplied once so that no row is ever duplicated. A table whose grand
//! total would overflow is rejected, so sums over any view are exact.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use super::error::DataError;
use crate::domain::{NormalizedRow, Platform, UnifiedRecord};
use crate::kpi::{measure, MeasuredRecord, Totals};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse an export date cell into a calendar day.
///
/// Date-times are truncated to their day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Collects per-platform batches and builds the fact table.
#[derive(Debug, Default)]
pub struct FactTableBuilder {
    batches: BTreeMap<Platform, Vec<NormalizedRow>>,
}

impl FactTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one platform's normalized rows.
    pub fn push(&mut self, platform: Platform, rows: Vec<NormalizedRow>) -> Result<(), DataError> {
        if self.batches.contains_key(&platform) {
            return Err(DataError::DuplicatePlatform(platform));
        }
        self.batches.insert(platform, rows);
        Ok(())
    }

    pub fn build(self) -> Result<FactTable, DataError> {
        let total: usize = self.batches.values().map(Vec::len).sum();
        let mut records = Vec::with_capacity(total);
        let mut grand_total = Totals::default();

        for (platform, rows) in self.batches {
            for row in rows {
                let date = parse_date(&row.date).ok_or_else(|| DataError::InvalidDate {
                    platform,
                    line: row.line,
                    value: row.date.clone(),
                })?;
                let line = row.line;
                let record = row.into_record(date);
                grand_total
                    .try_add(&record)
                    .map_err(|column| DataError::TotalsOverflow {
                        platform,
                        line,
                        column,
                    })?;
                records.push(record);
            }
        }

        let table = FactTable::from_records(records);
        info!(
            records = table.len(),
            platforms = table.row_counts.len(),
            "built fact table"
        );
        Ok(table)
    }
}

/// The unified, immutable dataset all views are derived from.
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    records: Vec<UnifiedRecord>,
    row_counts: BTreeMap<Platform, usize>,
}

impl FactTable {
    /// Wrap already-parsed records, keeping their order.
    pub fn from_records(records: Vec<UnifiedRecord>) -> Self {
        let mut row_counts = BTreeMap::new();
        for record in &records {
            *row_counts.entry(record.platform).or_insert(0) += 1;
        }
        Self {
            records,
            row_counts,
        }
    }

    pub fn records(&self) -> &[UnifiedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnifiedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn row_count(&self, platform: Platform) -> usize {
        self.row_counts.get(&platform).copied().unwrap_or(0)
    }

    /// Platforms with at least one record, in canonical order.
    pub fn platforms(&self) -> Vec<Platform> {
        self.row_counts.keys().copied().collect()
    }

    /// Earliest and latest record dates.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Distinct campaign names, sorted.
    pub fn campaign_names(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .map(|r| r.campaign_name.as_str())
            .collect()
    }

    /// Every record with its KPIs populated.
    pub fn measured(&self) -> Vec<MeasuredRecord> {
        self.records.iter().map(measure).collect()
    }
}

impl<'a> IntoIterator for &'a FactTable {
    type Item = &'a UnifiedRecord;
    type IntoIter = std::slice::Iter<'a, UnifiedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
