//! Key insights over a filtered view.
//!
//! Every insight goes through the aggregation engine and `top_n`, so it uses
//! recomputed group metrics and the same deterministic tie-breaks as any
//! other ranking.

use adlens_core::domain::{Platform, UnifiedRecord};
use adlens_core::kpi::{ratio, Totals};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{aggregate_records, GroupBy, SummaryRow};
use crate::ranking::{top_n, RankMetric};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestRoasPlatform {
    pub platform: Platform,
    pub roas: f64,
    pub conversion_value: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionLeader {
    pub platform: Platform,
    pub conversions: u64,
    /// Percent of all conversions in the view; `None` when there are none.
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCampaign {
    pub platform: Platform,
    pub campaign_name: String,
    pub roas: f64,
    pub conversions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    pub best_roas_platform: Option<BestRoasPlatform>,
    pub most_conversions: Option<ConversionLeader>,
    pub top_campaign: Option<TopCampaign>,
}

impl Insights {
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a UnifiedRecord>,
    {
        let records: Vec<&UnifiedRecord> = records.into_iter().collect();
        let platforms = aggregate_records(records.iter().copied(), &GroupBy::platform());
        let campaigns = aggregate_records(records.iter().copied(), &GroupBy::campaign());
        let total: Totals = records.iter().copied().collect();

        Self {
            best_roas_platform: best(&platforms, RankMetric::Roas).and_then(|row| {
                Some(BestRoasPlatform {
                    platform: row.key.platform?,
                    roas: row.kpis.roas()?,
                    conversion_value: row.totals.conversion_value,
                    cost: row.totals.cost,
                })
            }),
            most_conversions: best(&platforms, RankMetric::Conversions).and_then(|row| {
                Some(ConversionLeader {
                    platform: row.key.platform?,
                    conversions: row.totals.conversions,
                    share: ratio(
                        Decimal::from(row.totals.conversions),
                        Decimal::from(total.conversions),
                        100,
                    ),
                })
            }),
            top_campaign: best(&campaigns, RankMetric::Roas).and_then(|row| {
                Some(TopCampaign {
                    platform: row.key.platform?,
                    campaign_name: row.key.campaign_name.clone()?,
                    roas: row.kpis.roas()?,
                    conversions: row.totals.conversions,
                })
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.best_roas_platform.is_none()
            && self.most_conversions.is_none()
            && self.top_campaign.is_none()
    }
}

fn best(rows: &[SummaryRow], metric: RankMetric) -> Option<SummaryRow> {
    top_n(rows, metric, 1).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlens_core::domain::PlatformExtras;
    use chrono::NaiveDate;

    fn record(platform: Platform, campaign: &str, cost: i64, value: i64, conversions: u64) -> UnifiedRecord {
        UnifiedRecord {
            platform,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            campaign_id: campaign.to_lowercase(),
            campaign_name: campaign.to_string(),
            subgroup_id: "s".into(),
            subgroup_name: "S".into(),
            impressions: 1000,
            clicks: 10,
            conversions,
            cost: Decimal::from(cost),
            conversion_value: Decimal::from(value),
            extras: PlatformExtras::default(),
        }
    }

    #[test]
    fn insights_pick_leaders() {
        let records = vec![
            record(Platform::Facebook, "Spring", 100, 300, 6),
            record(Platform::Facebook, "Retarget", 100, 100, 2),
            record(Platform::Google, "Search", 100, 350, 1),
            record(Platform::TikTok, "Creators", 50, 50, 1),
        ];
        let insights = Insights::compute(&records);

        let best = insights.best_roas_platform.unwrap();
        assert_eq!(best.platform, Platform::Google);
        assert_eq!(best.roas, 350.0);
        assert_eq!(best.cost, Decimal::from(100));

        let leader = insights.most_conversions.unwrap();
        assert_eq!(leader.platform, Platform::Facebook);
        assert_eq!(leader.conversions, 8);
        assert_eq!(leader.share, Some(80.0));

        let top = insights.top_campaign.unwrap();
        assert_eq!(top.platform, Platform::Google);
        assert_eq!(top.campaign_name, "Search");
    }

    #[test]
    fn empty_view_has_no_insights() {
        let none: Vec<UnifiedRecord> = Vec::new();
        assert!(Insights::compute(&none).is_empty());
    }

    #[test]
    fn zero_conversions_have_no_share() {
        let records = vec![record(Platform::TikTok, "Awareness", 10, 0, 0)];
        let insights = Insights::compute(&records);

        let leader = insights.most_conversions.unwrap();
        assert_eq!(leader.conversions, 0);
        assert_eq!(leader.share, None);
        assert_eq!(insights.best_roas_platform.unwrap().roas, 0.0);
    }

    #[test]
    fn zero_spend_everywhere_has_no_roas_insight() {
        let records = vec![record(Platform::Google, "Free", 0, 0, 3)];
        let insights = Insights::compute(&records);

        assert!(insights.best_roas_platform.is_none());
        assert!(insights.top_campaign.is_none());
        assert!(insights.most_conversions.is_some());
    }
}
