//! Property tests for the aggregation engine.
//!
//! Uses proptest to verify:
//! 1. Conservation: every grouping sums back to the ungrouped total
//! 2. Recompute: each group's KPIs come from its own summed components
//! 3. Ranking: `top_n` output is sorted and never longer than `n`

use adlens_core::domain::{Platform, PlatformExtras, UnifiedRecord};
use adlens_core::kpi::{ratio, Totals};
use adlens_runner::{aggregate_records, top_n, Dimension, GroupBy, RankMetric};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

// ── Strategies ───────────────────────────────────────────────────────

fn arb_platform() -> impl Strategy<Value = Platform> {
    prop_oneof![
        Just(Platform::Facebook),
        Just(Platform::Google),
        Just(Platform::TikTok)
    ]
}

fn arb_record() -> impl Strategy<Value = UnifiedRecord> {
    (
        arb_platform(),
        1u32..=5,
        0usize..3,
        0u64..50_000,
        0u64..2_000,
        0u64..100,
        0i64..500_000,
        0i64..1_000_000,
    )
        .prop_map(
            |(platform, day, campaign, impressions, clicks, conversions, cost, value)| {
                let campaign_name = ["Spring Sale", "Brand", "Retargeting"][campaign];
                UnifiedRecord {
                    platform,
                    date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
                    campaign_id: format!("C{campaign}"),
                    campaign_name: campaign_name.to_string(),
                    subgroup_id: format!("S{campaign}"),
                    subgroup_name: format!("{campaign_name} audience"),
                    impressions,
                    clicks,
                    conversions,
                    cost: Decimal::new(cost, 2),
                    conversion_value: Decimal::new(value, 2),
                    extras: PlatformExtras::default(),
                }
            },
        )
}

fn arb_group_by() -> impl Strategy<Value = GroupBy> {
    prop::collection::btree_set(
        prop_oneof![
            Just(Dimension::Platform),
            Just(Dimension::Campaign),
            Just(Dimension::Subgroup),
            Just(Dimension::Date),
        ],
        0..=4,
    )
    .prop_map(GroupBy::new)
}

// ── 1. Conservation ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn groups_sum_to_the_total(
        records in prop::collection::vec(arb_record(), 0..60),
        group_by in arb_group_by(),
    ) {
        let rows = aggregate_records(&records, &group_by);
        let whole: Totals = records.iter().collect();

        let mut summed = Totals::default();
        for row in &rows {
            summed.merge(&row.totals);
        }
        prop_assert_eq!(summed, whole);

        let record_count: usize = rows.iter().map(|r| r.totals.rows).sum();
        prop_assert_eq!(record_count, records.len());
    }
}

// ── 2. Recompute ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn group_roas_is_ratio_of_group_sums(
        records in prop::collection::vec(arb_record(), 1..60),
        group_by in arb_group_by(),
    ) {
        for row in aggregate_records(&records, &group_by) {
            let t = &row.totals;
            prop_assert_eq!(row.kpis.roas(), ratio(t.conversion_value, t.cost, 100));
            prop_assert_eq!(row.kpis.ctr(), ratio(Decimal::from(t.clicks), Decimal::from(t.impressions), 100));
            prop_assert_eq!(row.kpis.roas().is_none(), t.cost.is_zero());
        }
    }

    #[test]
    fn platform_grouping_has_at_most_three_rows(
        records in prop::collection::vec(arb_record(), 0..60),
    ) {
        let rows = aggregate_records(&records, &GroupBy::platform());
        prop_assert!(rows.len() <= 3);
        for pair in rows.windows(2) {
            prop_assert!(pair[0].key.platform < pair[1].key.platform);
        }
    }
}

// ── 3. Ranking ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn top_n_is_bounded_and_ordered(
        records in prop::collection::vec(arb_record(), 0..60),
        n in 0usize..8,
        metric_index in 0usize..RankMetric::ALL.len(),
    ) {
        let metric = RankMetric::ALL[metric_index];
        let rows = aggregate_records(&records, &GroupBy::campaign());
        let ranked = top_n(&rows, metric, n);

        prop_assert!(ranked.len() <= n);
        prop_assert!(ranked.iter().all(|row| metric.value(row).is_some()));

        let values: Vec<f64> = ranked.iter().filter_map(|row| metric.value(row)).collect();
        for pair in values.windows(2) {
            if metric.higher_is_better() {
                prop_assert!(pair[0] >= pair[1]);
            } else {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
