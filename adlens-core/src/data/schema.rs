use crate::data::reader::ColumnIndex;
use crate::domain::Platform;

/// Header contract of one platform's export file.
///
/// `required` columns must be present or the whole platform load fails.
/// `optional` columns feed platform extras and may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    pub platform: Platform,
    pub required: Vec<&'static str>,
    pub optional: Vec<&'static str>,
}

impl SourceSchema {
    /// Validate a parsed header row against the contract.
    ///
    /// Reports every missing required column at once.
    pub fn validate(&self, columns: &ColumnIndex) -> Result<(), SchemaError> {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !columns.contains(name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingColumns {
                platform: self.platform,
                columns: missing,
            })
        }
    }

    /// Whether `column` is part of the contract at all.
    pub fn knows(&self, column: &str) -> bool {
        self.required
            .iter()
            .chain(self.optional.iter())
            .any(|known| *known == column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{platform} export is missing required column(s): {}", .columns.join(", "))]
    MissingColumns {
        platform: Platform,
        columns: Vec<String>,
    },

    #[error("{platform} line {line}: required field '{column}' is empty")]
    MissingField {
        platform: Platform,
        line: u64,
        column: String,
    },
}

impl SchemaError {
    pub fn platform(&self) -> Platform {
        match self {
            Self::MissingColumns { platform, .. } | Self::MissingField { platform, .. } => *platform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::StringRecord;

    fn schema() -> SourceSchema {
        SourceSchema {
            platform: Platform::Google,
            required: vec!["date", "cost", "ad_group_id"],
            optional: vec!["quality_score"],
        }
    }

    #[test]
    fn validate_accepts_complete_header() {
        let columns = ColumnIndex::from_headers(&StringRecord::from(vec![
            "date",
            "ad_group_id",
            "cost",
            "unrelated",
        ]));
        assert!(schema().validate(&columns).is_ok());
    }

    #[test]
    fn validate_reports_all_missing_columns() {
        let columns = ColumnIndex::from_headers(&StringRecord::from(vec!["date"]));
        let err = schema().validate(&columns).unwrap_err();
        match err {
            SchemaError::MissingColumns { platform, columns } => {
                assert_eq!(platform, Platform::Google);
                assert_eq!(columns, vec!["cost".to_string(), "ad_group_id".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn optional_columns_are_not_required() {
        let columns =
            ColumnIndex::from_headers(&StringRecord::from(vec!["date", "cost", "ad_group_id"]));
        assert!(schema().validate(&columns).is_ok());
        assert!(schema().knows("quality_score"));
        assert!(!schema().knows("spend"));
    }

    #[test]
    fn missing_columns_message_lists_names() {
        let err = SchemaError::MissingColumns {
            platform: Platform::TikTok,
            columns: vec!["adgroup_id".into(), "cost".into()],
        };
        assert_eq!(
            err.to_string(),
            "TikTok export is missing required column(s): adgroup_id, cost"
        );
    }
}
