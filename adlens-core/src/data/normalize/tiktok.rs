use rust_decimal::Decimal;

use super::{FieldMap, PlatformAdapter, RowView, ValueSource};
use crate::data::error::DataError;
use crate::domain::{Platform, PlatformExtras};

/// TikTok exports ad groups (`adgroup_*`) and carries no revenue column.
static FIELD_MAP: FieldMap = FieldMap {
    cost: "cost",
    subgroup_id: "adgroup_id",
    subgroup_name: "adgroup_name",
};

static EXTRA_COLUMNS: [&str; 5] = [
    "video_views",
    "video_watch_100",
    "likes",
    "shares",
    "comments",
];

#[derive(Debug, Clone, Copy)]
pub struct TikTokAdapter {
    value_per_conversion: Decimal,
}

impl TikTokAdapter {
    pub fn new(value_per_conversion: Decimal) -> Self {
        Self {
            value_per_conversion,
        }
    }
}

impl PlatformAdapter for TikTokAdapter {
    fn platform(&self) -> Platform {
        Platform::TikTok
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
        let video_views = row.optional_count("video_views")?;
        let watched_full = row.optional_count("video_watch_100")?;

        let video_completion_rate = match (watched_full, video_views) {
            (Some(full), Some(views)) if views > 0 => Some(full as f64 / views as f64),
            _ => None,
        };

        let likes = row.optional_count("likes")?;
        let shares = row.optional_count("shares")?;
        let comments = row.optional_count("comments")?;
        let social_engagement = match (likes, shares, comments) {
            (Some(l), Some(s), Some(c)) => Some(
                l.checked_add(s)
                    .and_then(|sum| sum.checked_add(c))
                    .ok_or_else(|| row.overflow("likes"))?,
            ),
            _ => None,
        };

        Ok(PlatformExtras {
            video_views,
            video_completion_rate,
            social_engagement,
            ..PlatformExtras::default()
        })
    }
}
