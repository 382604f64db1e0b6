//! Headline scalars for a filtered view.

use adlens_core::domain::UnifiedRecord;
use adlens_core::kpi::Totals;
use rust_decimal::Decimal;
use serde::Serialize;

/// Totals across the whole view plus blended ROAS.
///
/// An empty view yields zeros and `None` ROAS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Headline {
    pub spend: Decimal,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub conversion_value: Decimal,
    /// `sum(conversion_value) / sum(cost) × 100`.
    pub roas: Option<f64>,
    pub records: usize,
}

impl Headline {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a UnifiedRecord>,
    {
        Self::from_totals(&records.into_iter().collect::<Totals>())
    }

    pub fn from_totals(totals: &Totals) -> Self {
        Self {
            spend: totals.cost,
            impressions: totals.impressions,
            clicks: totals.clicks,
            conversions: totals.conversions,
            conversion_value: totals.conversion_value,
            roas: totals.kpis().roas(),
            records: totals.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlens_core::domain::{Platform, PlatformExtras};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(cost: &str, value: &str) -> UnifiedRecord {
        UnifiedRecord {
            platform: Platform::Facebook,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            campaign_id: "c".into(),
            campaign_name: "C".into(),
            subgroup_id: "s".into(),
            subgroup_name: "S".into(),
            impressions: 100,
            clicks: 4,
            conversions: 2,
            cost: Decimal::from_str(cost).unwrap(),
            conversion_value: Decimal::from_str(value).unwrap(),
            extras: PlatformExtras::default(),
        }
    }

    #[test]
    fn blended_roas_uses_sums() {
        let records = [record("100", "100"), record("300", "900")];
        let headline = Headline::from_records(&records);

        assert_eq!(headline.spend, Decimal::from(400));
        assert_eq!(headline.conversions, 4);
        assert_eq!(headline.records, 2);
        assert_eq!(headline.roas, Some(250.0));
    }

    #[test]
    fn empty_view_is_zero_not_an_error() {
        let none: [UnifiedRecord; 0] = [];
        let headline = Headline::from_records(&none);
        assert_eq!(headline, Headline::default());
        assert_eq!(headline.roas, None);
    }

    #[test]
    fn zero_spend_has_no_roas() {
        let headline = Headline::from_records(&[record("0", "0")]);
        assert_eq!(headline.roas, None);
        assert_eq!(headline.impressions, 100);
    }
}
