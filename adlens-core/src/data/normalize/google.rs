use super::{FieldMap, PlatformAdapter, RowView, ValueSource};
use crate::data::error::DataError;
use crate::domain::{Platform, PlatformExtras};

/// Google Ads exports ad groups and reports conversion value natively.
static FIELD_MAP: FieldMap = FieldMap {
    cost: "cost",
    subgroup_id: "ad_group_id",
    subgroup_name: "ad_group_name",
};

static EXTRA_COLUMNS: [&str; 1] = ["quality_score"];

#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleAdapter;

impl PlatformAdapter for GoogleAdapter {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    fn field_map(&self) -> &'static FieldMap {
        &FIELD_MAP
    }

    fn extra_columns(&self) -> &'static [&'static str] {
        &EXTRA_COLUMNS
    }

    fn value_source(&self) -> ValueSource {
        ValueSource::Native("conversion_value")
    }

    fn extras(&self, row: &RowView<'_>) -> Result<PlatformExtras, DataError> {
        Ok(PlatformExtras {
            quality_score: row.optional_real("quality_score")?,
            ..PlatformExtras::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::normalize_table;
    use crate::data::reader::{RawTable, SourceBytes};
    use crate::data::schema::SchemaError;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn table(text: &str) -> RawTable {
        RawTable::parse(&SourceBytes {
            platform: Platform::Google,
            path: PathBuf::from("02_google_ads.csv"),
            bytes: text.as_bytes().to_vec(),
        })
        .unwrap()
    }

    const HEADER: &str = "date,campaign_id,campaign_name,ad_group_id,ad_group_name,impressions,clicks,cost,conversions,conversion_value,quality_score";

    #[test]
    fn conversion_value_is_read_natively() {
        let t = table(&format!(
            "{HEADER}\n2024-01-03,G_7,Brand Search,AG_1,Exact,800,64,50.25,4,412.80,8\n"
        ));
        let rows = normalize_table(&GoogleAdapter, &t).unwrap();
        let row = &rows[0];

        assert_eq!(row.subgroup_id, "AG_1");
        assert_eq!(row.subgroup_name, "Exact");
        assert_eq!(row.cost, Decimal::from_str("50.25").unwrap());
        assert_eq!(row.conversion_value, Decimal::from_str("412.8").unwrap());
        assert_eq!(row.extras.quality_score, Some(8.0));
        assert_eq!(row.extras.video_views, None);
    }

    #[test]
    fn missing_conversion_value_column_is_a_schema_error() {
        let t = table(
            "date,campaign_id,campaign_name,ad_group_id,ad_group_name,impressions,clicks,cost,conversions\n\
             2024-01-03,G_7,Brand Search,AG_1,Exact,800,64,50,4\n",
        );
        let err = normalize_table(&GoogleAdapter, &t).unwrap_err();
        assert!(matches!(
            err,
            DataError::Schema(SchemaError::MissingColumns { .. })
        ));
    }

    #[test]
    fn blank_conversion_value_is_not_defaulted() {
        let t = table(&format!(
            "{HEADER}\n2024-01-03,G_7,Brand Search,AG_1,Exact,800,64,50,4,,8\n"
        ));
        let err = normalize_table(&GoogleAdapter, &t).unwrap_err();
        match err {
            DataError::Schema(SchemaError::MissingField { column, line, .. }) => {
                assert_eq!(column, "conversion_value");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cost_is_invalid() {
        let t = table(&format!(
            "{HEADER}\n2024-01-03,G_7,Brand Search,AG_1,Exact,800,64,fifty,4,100,8\n"
        ));
        let err = normalize_table(&GoogleAdapter, &t).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidValue { reason: "not a number", .. }
        ));
    }
}
