use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Platform;

/// Platform-specific attributes carried alongside the common column contract.
///
/// Every field is optional: each platform populates only the ones its export
/// provides. None of them take part in cross-platform KPI math.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformExtras {
    pub video_views: Option<u64>,
    pub engagement_rate: Option<f64>,
    pub reach: Option<u64>,
    pub frequency: Option<f64>,
    pub quality_score: Option<f64>,
    pub video_completion_rate: Option<f64>,
    pub social_engagement: Option<u64>,
}

impl PlatformExtras {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One (subgroup, day) observation in the unified schema.
///
/// `subgroup_*` unifies Facebook ad sets with Google and TikTok ad groups.
/// `campaign_id` is unique per platform only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub platform: Platform,
    pub date: NaiveDate,
    pub campaign_id: String,
    pub campaign_name: String,
    pub subgroup_id: String,
    pub subgroup_name: String,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: Decimal,
    pub conversion_value: Decimal,
    #[serde(default)]
    pub extras: PlatformExtras,
}

/// A normalized record whose date has not been parsed yet.
///
/// Produced by the platform adapters and consumed by the fact table builder,
/// which owns date parsing. `line` is the 1-based source line for error reports.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub platform: Platform,
    pub line: u64,
    pub date: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub subgroup_id: String,
    pub subgroup_name: String,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: Decimal,
    pub conversion_value: Decimal,
    pub extras: PlatformExtras,
}

impl NormalizedRow {
    /// Attach the parsed date, producing the canonical record.
    pub fn into_record(self, date: NaiveDate) -> UnifiedRecord {
        UnifiedRecord {
            platform: self.platform,
            date,
            campaign_id: self.campaign_id,
            campaign_name: self.campaign_name,
            subgroup_id: self.subgroup_id,
            subgroup_name: self.subgroup_name,
            impressions: self.impressions,
            clicks: self.clicks,
            conversions: self.conversions,
            cost: self.cost,
            conversion_value: self.conversion_value,
            extras: self.extras,
        }
    }
}
