//! Aggregation engine: group, sum, recompute.
//!
//! Groups are keyed by any subset of {platform, campaign, subgroup, date}.
//! Components are summed per group and KPIs recomputed from those sums, so a
//! group's ROAS is always `sum(conversion_value) / sum(cost) × 100`.
//!
//! Campaign and subgroup keys are always platform-qualified: a campaign name
//! used on two platforms yields two groups.

use adlens_core::data::FactTable;
use adlens_core::domain::{Platform, UnifiedRecord};
use adlens_core::kpi::{Kpis, Totals};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::filter::RecordFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Platform,
    Campaign,
    Subgroup,
    Date,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Platform,
        Dimension::Campaign,
        Dimension::Subgroup,
        Dimension::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Campaign => "campaign",
            Self::Subgroup => "subgroup",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown grouping dimension '{0}' (expected platform, campaign, subgroup or date)")]
pub struct UnknownDimension(pub String);

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "platform" => Ok(Self::Platform),
            "campaign" => Ok(Self::Campaign),
            "subgroup" | "ad_set" | "ad_group" | "adgroup" => Ok(Self::Subgroup),
            "date" | "day" => Ok(Self::Date),
            _ => Err(UnknownDimension(s.to_string())),
        }
    }
}

/// Set of dimensions to group on. Empty means one grand-total group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupBy(BTreeSet<Dimension>);

impl GroupBy {
    pub fn new(dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        Self(dimensions.into_iter().collect())
    }

    pub fn total() -> Self {
        Self::default()
    }

    pub fn platform() -> Self {
        Self::new([Dimension::Platform])
    }

    pub fn campaign() -> Self {
        Self::new([Dimension::Campaign])
    }

    pub fn contains(&self, dimension: Dimension) -> bool {
        self.0.contains(&dimension)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.0.iter().copied()
    }

    pub fn is_total(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether group keys carry the platform.
    pub fn keys_platform(&self) -> bool {
        self.contains(Dimension::Platform)
            || self.contains(Dimension::Campaign)
            || self.contains(Dimension::Subgroup)
    }
}

impl FromStr for GroupBy {
    type Err = UnknownDimension;

    /// Comma-separated dimension names, e.g. `platform,date`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Dimension::from_str)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Dimension::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// Identity of one group. Unused dimensions are `None`.
///
/// Field order is the sort order of aggregate output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub platform: Option<Platform>,
    pub campaign_name: Option<String>,
    pub subgroup_id: Option<String>,
    pub date: Option<NaiveDate>,
}

impl GroupKey {
    pub fn for_record(record: &UnifiedRecord, group_by: &GroupBy) -> Self {
        Self {
            platform: group_by.keys_platform().then_some(record.platform),
            campaign_name: group_by
                .contains(Dimension::Campaign)
                .then(|| record.campaign_name.clone()),
            subgroup_id: group_by
                .contains(Dimension::Subgroup)
                .then(|| record.subgroup_id.clone()),
            date: group_by
                .contains(Dimension::Date)
                .then_some(record.date),
        }
    }
}

/// One aggregated group: summed components and recomputed KPIs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(flatten)]
    pub key: GroupKey,
    /// Name of the subgroup, from its first record in fact table order.
    pub subgroup_name: Option<String>,
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(flatten)]
    pub kpis: Kpis,
}

impl SummaryRow {
    fn new(key: GroupKey, subgroup_name: Option<String>, totals: Totals) -> Self {
        Self {
            key,
            subgroup_name,
            kpis: totals.kpis(),
            totals,
        }
    }

    /// Human label: campaign name, else subgroup name, else platform, else date.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.key.campaign_name {
            return name.clone();
        }
        if let Some(name) = &self.subgroup_name {
            return name.clone();
        }
        if let Some(platform) = self.key.platform {
            return platform.to_string();
        }
        match self.key.date {
            Some(date) => date.to_string(),
            None => "All".to_string(),
        }
    }
}

/// Group already-selected records.
pub fn aggregate_records<'a, I>(records: I, group_by: &GroupBy) -> Vec<SummaryRow>
where
    I: IntoIterator<Item = &'a UnifiedRecord>,
{
    let mut groups: BTreeMap<GroupKey, (Option<String>, Totals)> = BTreeMap::new();
    for record in records {
        let key = GroupKey::for_record(record, group_by);
        let (_, totals) = groups.entry(key).or_insert_with(|| {
            let name = group_by
                .contains(Dimension::Subgroup)
                .then(|| record.subgroup_name.clone());
            (name, Totals::default())
        });
        totals.add(record);
    }

    groups
        .into_iter()
        .map(|(key, (name, totals))| SummaryRow::new(key, name, totals))
        .collect()
}

/// Filter the fact table, then aggregate.
pub fn aggregate(table: &FactTable, group_by: &GroupBy, filter: &RecordFilter) -> Vec<SummaryRow> {
    let view = filter.apply(table);
    let rows = aggregate_records(view.iter().copied(), group_by);
    debug!(
        group_by = %group_by,
        records = view.len(),
        groups = rows.len(),
        "aggregated"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlens_core::domain::PlatformExtras;
    use rust_decimal::Decimal;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(
        platform: Platform,
        d: u32,
        campaign: &str,
        subgroup: &str,
        cost: i64,
        value: i64,
        conversions: u64,
    ) -> UnifiedRecord {
        UnifiedRecord {
            platform,
            date: day(d),
            campaign_id: format!("{campaign}-id"),
            campaign_name: campaign.to_string(),
            subgroup_id: subgroup.to_lowercase(),
            subgroup_name: subgroup.to_string(),
            impressions: 1000,
            clicks: 10,
            conversions,
            cost: Decimal::from(cost),
            conversion_value: Decimal::from(value),
            extras: PlatformExtras::default(),
        }
    }

    fn table() -> FactTable {
        FactTable::from_records(vec![
            record(Platform::Google, 1, "Search", "Exact", 50, 100, 1),
            record(Platform::Google, 1, "Search", "Phrase", 150, 450, 3),
            record(Platform::Facebook, 2, "Search", "Broad", 100, 100, 2),
            record(Platform::TikTok, 2, "Creators", "Gen Z", 0, 0, 0),
        ])
    }

    #[test]
    fn group_by_parses_lists() {
        let g: GroupBy = "platform, date".parse().unwrap();
        assert!(g.contains(Dimension::Platform));
        assert!(g.contains(Dimension::Date));
        assert!(!g.contains(Dimension::Campaign));
        assert_eq!(g.to_string(), "platform,date");

        assert!("".parse::<GroupBy>().unwrap().is_total());
        assert!("platform,week".parse::<GroupBy>().is_err());
    }

    #[test]
    fn same_campaign_and_day_sum_and_recompute() {
        let rows = aggregate(
            &table(),
            &GroupBy::new([Dimension::Campaign, Dimension::Date]),
            &RecordFilter::all(),
        );
        let search = rows
            .iter()
            .find(|r| r.key.platform == Some(Platform::Google))
            .unwrap();

        assert_eq!(search.totals.cost, Decimal::from(200));
        assert_eq!(search.totals.conversion_value, Decimal::from(550));
        assert_eq!(search.totals.rows, 2);
        assert_eq!(search.kpis.roas(), Some(275.0));
    }

    #[test]
    fn platform_and_date_rows_are_platform_major() {
        let mut records: Vec<UnifiedRecord> = table().iter().cloned().collect();
        records.push(record(Platform::Facebook, 1, "Search", "Broad", 10, 10, 1));
        let rows = aggregate_records(&records, &"platform,date".parse::<GroupBy>().unwrap());

        let keys: Vec<(Option<Platform>, Option<NaiveDate>)> =
            rows.iter().map(|r| (r.key.platform, r.key.date)).collect();
        assert_eq!(
            keys,
            vec![
                (Some(Platform::Facebook), Some(day(1))),
                (Some(Platform::Facebook), Some(day(2))),
                (Some(Platform::Google), Some(day(1))),
                (Some(Platform::TikTok), Some(day(2))),
            ]
        );
    }

    #[test]
    fn campaign_groups_are_platform_qualified() {
        let rows = aggregate(&table(), &GroupBy::campaign(), &RecordFilter::all());
        let search: Vec<Option<Platform>> = rows
            .iter()
            .filter(|r| r.key.campaign_name.as_deref() == Some("Search"))
            .map(|r| r.key.platform)
            .collect();
        assert_eq!(search, vec![Some(Platform::Facebook), Some(Platform::Google)]);
    }

    #[test]
    fn zero_spend_group_has_null_roas() {
        let rows = aggregate(&table(), &GroupBy::platform(), &RecordFilter::all());
        let tiktok = rows
            .iter()
            .find(|r| r.key.platform == Some(Platform::TikTok))
            .unwrap();
        assert_eq!(tiktok.kpis.roas(), None);
        assert_eq!(tiktok.kpis.cpa(), None);
        assert_eq!(tiktok.kpis.ctr(), Some(1.0));
    }

    #[test]
    fn platform_rows_sum_to_the_total() {
        let table = table();
        let by_platform = aggregate(&table, &GroupBy::platform(), &RecordFilter::all());
        let total = aggregate(&table, &GroupBy::total(), &RecordFilter::all());

        let mut summed = Totals::default();
        for row in &by_platform {
            summed.merge(&row.totals);
        }
        assert_eq!(total.len(), 1);
        assert_eq!(summed, total[0].totals);
        assert_eq!(total[0].display_name(), "All");
    }

    #[test]
    fn subgroup_rows_carry_names() {
        let rows = aggregate(
            &table(),
            &GroupBy::new([Dimension::Subgroup]),
            &RecordFilter::all(),
        );
        let names: Vec<String> = rows.iter().map(SummaryRow::display_name).collect();
        assert_eq!(names, vec!["Broad", "Exact", "Phrase", "Gen Z"]);
    }

    #[test]
    fn filter_applies_before_grouping() {
        let filter = RecordFilter::all().with_platforms([Platform::Facebook]);
        let rows = aggregate(&table(), &GroupBy::platform(), &filter);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].totals.cost, Decimal::from(100));
    }

    #[test]
    fn empty_view_yields_no_rows() {
        let filter = RecordFilter::all().with_campaigns(["Nope"]);
        assert!(aggregate(&table(), &GroupBy::platform(), &filter).is_empty());
    }

    #[test]
    fn summary_row_json_includes_key_totals_and_kpis() {
        let rows = aggregate(&table(), &GroupBy::platform(), &RecordFilter::all());
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["platform"], "Facebook");
        assert!(json["date"].is_null());
        assert_eq!(json["roas"], 100.0);
        assert_eq!(json["conversions"], 2);
    }
}
