//! Top-N ranking of summary rows.
//!
//! Ranking happens on group-level metrics, recomputed by the aggregation
//! engine. Rows whose metric is unavailable are excluded. Ties are broken
//! deterministically: more conversions first, then display name ascending,
//! then the full group key.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::aggregate::SummaryRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    Roas,
    Ctr,
    Cpc,
    Cpa,
    Cpm,
    Conversions,
    Cost,
    Clicks,
    Impressions,
    ConversionValue,
}

impl RankMetric {
    pub const ALL: [RankMetric; 10] = [
        RankMetric::Roas,
        RankMetric::Ctr,
        RankMetric::Cpc,
        RankMetric::Cpa,
        RankMetric::Cpm,
        RankMetric::Conversions,
        RankMetric::Cost,
        RankMetric::Clicks,
        RankMetric::Impressions,
        RankMetric::ConversionValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roas => "roas",
            Self::Ctr => "ctr",
            Self::Cpc => "cpc",
            Self::Cpa => "cpa",
            Self::Cpm => "cpm",
            Self::Conversions => "conversions",
            Self::Cost => "cost",
            Self::Clicks => "clicks",
            Self::Impressions => "impressions",
            Self::ConversionValue => "conversion_value",
        }
    }

    /// Cost-efficiency metrics rank ascending.
    pub fn higher_is_better(&self) -> bool {
        !matches!(self, Self::Cpc | Self::Cpa | Self::Cpm)
    }

    pub fn value(&self, row: &SummaryRow) -> Option<f64> {
        let t = &row.totals;
        match self {
            Self::Roas => row.kpis.roas(),
            Self::Ctr => row.kpis.ctr(),
            Self::Cpc => row.kpis.cpc(),
            Self::Cpa => row.kpis.cpa(),
            Self::Cpm => row.kpis.cpm(),
            Self::Conversions => Some(t.conversions as f64),
            Self::Cost => t.cost.to_f64(),
            Self::Clicks => Some(t.clicks as f64),
            Self::Impressions => Some(t.impressions as f64),
            Self::ConversionValue => t.conversion_value.to_f64(),
        }
    }

    /// `Less` when `a` ranks ahead of `b`.
    fn compare(&self, a: f64, b: f64) -> Ordering {
        if self.higher_is_better() {
            b.total_cmp(&a)
        } else {
            a.total_cmp(&b)
        }
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rank metric '{0}'")]
pub struct UnknownMetric(pub String);

impl FromStr for RankMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// The best `n` rows by `metric`, best first.
pub fn top_n(rows: &[SummaryRow], metric: RankMetric, n: usize) -> Vec<SummaryRow> {
    let mut ranked: Vec<(f64, String, &SummaryRow)> = rows
        .iter()
        .filter_map(|row| Some((metric.value(row)?, row.display_name(), row)))
        .collect();

    ranked.sort_by(|(va, name_a, a), (vb, name_b, b)| {
        metric
            .compare(*va, *vb)
            .then_with(|| b.totals.conversions.cmp(&a.totals.conversions))
            .then_with(|| name_a.cmp(name_b))
            .then_with(|| a.key.cmp(&b.key))
    });

    ranked
        .into_iter()
        .take(n)
        .map(|(_, _, row)| row.clone())
        .collect()
}
