//! Schema normalization, one adapter per platform selected by platform tag.
//!
//! Each adapter declares a static `FieldMap` (which source column feeds each
//! unified field) and implements the same `PlatformAdapter` capability. The
//! shared pipeline validates the header against the adapter's schema, then maps
//! every row. Any error aborts the platform: no partially normalized output.

pub mod facebook;
pub mod google;
pub mod row;
pub mod tiktok;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::DataError;
use super::reader::RawTable;
use super::schema::SourceSchema;
use crate::domain::{NormalizedRow, Platform, PlatformExtras};

pub use facebook::FacebookAdapter;
pub use google::GoogleAdapter;
pub use row::RowView;
pub use tiktok::TikTokAdapter;

/// Columns every platform export shares under the same name.
pub const COMMON_COLUMNS: [&str; 6] = [
    "date",
    "campaign_id",
    "campaign_name",
    "impressions",
    "clicks",
    "conversions",
];

/// Where a platform's conversion value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Read from this column.
    Native(&'static str),
    /// `conversions × value_per_conversion`.
    Imputed(Decimal),
}

/// Source column names for the unified fields whose names differ per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub cost: &'static str,
    pub subgroup_id: &'static str,
    pub subgroup_name: &'static str,
}

/// Assumed revenue per conversion for platforms without native revenue data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputationPolicy {
    pub facebook: Decimal,
    pub tiktok: Decimal,
}

impl ImputationPolicy {
    /// Value per conversion assumed when nothing else is configured.
    pub fn default_value_per_conversion() -> Decimal {
        Decimal::from(50)
    }

    pub fn uniform(value_per_conversion: Decimal) -> Self {
        Self {
            facebook: value_per_conversion,
            tiktok: value_per_conversion,
        }
    }
}

impl Default for ImputationPolicy {
    fn default() -> Self {
        Self::uniform(Self::default_value_per_conversion())
    }
}

/// Normalization capability shared by all platform adapters.
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    fn field_map(&self) -> &'static FieldMap;

    /// Optional columns feeding `PlatformExtras`.
    fn extra_columns(&self) -> &'static [&'static str];

    /// Where the conversion value comes from.
    fn value_source(&self) -> ValueSource;

    fn extras(&self, row: &RowView<'_>) -> Result<PlatformExtras, DataError>;

    /// Header contract derived from the field map.
    fn schema(&self) -> SourceSchema {
        let map = self.field_map();
        let mut required: Vec<&'static str> = COMMON_COLUMNS.to_vec();
        required.extend([map.cost, map.subgroup_id, map.subgroup_name]);
        if let ValueSource::Native(column) = self.value_source() {
            required.push(column);
        }
        SourceSchema {
            platform: self.platform(),
            required,
            optional: self.extra_columns().to_vec(),
        }
    }

    fn conversion_value(&self, row: &RowView<'_>, conversions: u64) -> Result<Decimal, DataError> {
        match self.value_source() {
            ValueSource::Native(column) => row.amount(column),
            ValueSource::Imputed(per_conversion) => Decimal::from(conversions)
                .checked_mul(per_conversion)
                .ok_or_else(|| row.overflow("conversions")),
        }
    }

    /// Map one raw row onto the unified shape.
    fn normalize(&self, row: &RowView<'_>) -> Result<NormalizedRow, DataError> {
        let map = self.field_map();
        let conversions = row.count("conversions")?;
        Ok(NormalizedRow {
            platform: self.platform(),
            line: row.line(),
            date: row.text("date")?,
            campaign_id: row.text("campaign_id")?,
            campaign_name: row.text("campaign_name")?,
            subgroup_id: row.text(map.subgroup_id)?,
            subgroup_name: row.text(map.subgroup_name)?,
            impressions: row.count("impressions")?,
            clicks: row.count("clicks")?,
            conversions,
            cost: row.amount(map.cost)?,
            conversion_value: self.conversion_value(row, conversions)?,
            extras: self.extras(row)?,
        })
    }
}

/// Build the adapter for `platform`.
pub fn adapter_for(platform: Platform, policy: &ImputationPolicy) -> Box<dyn PlatformAdapter> {
    match platform {
        Platform::Facebook => Box::new(FacebookAdapter::new(policy.facebook)),
        Platform::Google => Box::new(GoogleAdapter),
        Platform::TikTok => Box::new(TikTokAdapter::new(policy.tiktok)),
    }
}

/// Normalize a whole platform table, all-or-nothing.
pub fn normalize_table(
    adapter: &dyn PlatformAdapter,
    table: &RawTable,
) -> Result<Vec<NormalizedRow>, DataError> {
    if table.platform != adapter.platform() {
        return Err(DataError::PlatformMismatch {
            table: table.platform,
            adapter: adapter.platform(),
        });
    }

    adapter.schema().validate(&table.columns)?;

    if table.is_empty() {
        warn!(platform = %table.platform, path = %table.path.display(), "source has no data rows");
    }

    let rows = table
        .rows
        .iter()
        .map(|raw| adapter.normalize(&RowView::new(table.platform, &table.columns, raw)))
        .collect::<Result<Vec<_>, _>>()?;

    info!(platform = %table.platform, rows = rows.len(), "normalized source");
    Ok(rows)
}
