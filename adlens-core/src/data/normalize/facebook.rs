use rust_decimal::Decimal;

use super::{FieldMap, PlatformAdapter, RowView, ValueSource};
use crate::data::error::DataError;
use crate::domain::{Platform, PlatformExtras};

/// Facebook exports ad sets, report `spend`, and carry no revenue column.
static FIELD_MAP: FieldMap = FieldMap {
    cost: "spend",
    subgroup_id: "ad_set_id",
    subgroup_name: "ad_set_name",
};

static EXTRA_COLUMNS: [&str; 4] = ["video_views", "engagement_rate", "reach", "frequency"];

#[derive(Debug, Clone, Copy)]
pub struct FacebookAdapter {
    value_per_conversion: Decimal,
}

impl FacebookAdapter {
    pub fn new(value_per_conversion: Decimal) -> Self {
        Self {
            value_per_conversion,
        }
    }
}

impl PlatformAdapter for FacebookAdapter {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    fn field_map(&self) -> &'static FieldMap {
        &FIELD_MAP
    }

    fn extra_columns(&self) -> &'static [&'static str] {
        &EXTRA_COLUMNS
    }

    fn value_source(&self) -> ValueSource {
        ValueSource::Imputed(self.value_per_conversion)
    }

    fn extras(&self, row: &RowView<'_>) -> Result<PlatformExtras, DataError> {
        Ok(PlatformExtras {
            video_views: row.optional_count("video_views")?,
            engagement_rate: row.optional_real("engagement_rate")?,
            reach: row.optional_count("reach")?,
            frequency: row.optional_real("frequency")?,
            ..PlatformExtras::default()
        })
    }
}
