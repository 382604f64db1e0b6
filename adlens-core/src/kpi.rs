//! KPI calculation.
//!
//! KPIs are ratios and are only ever derived from summed components: `Kpis`
//! has no public constructor other than [`Kpis::from_totals`] and there is no
//! way to combine two `Kpis` values. Aggregating at any granularity therefore
//! means summing `Totals` and recomputing, never averaging ratios.
//!
//! A zero denominator yields `None` ("metric unavailable").

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::UnifiedRecord;

/// Summed KPI components of one record or a group of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: Decimal,
    pub conversion_value: Decimal,
    /// Number of records summed.
    pub rows: usize,
}

impl Totals {
    pub fn from_record(record: &UnifiedRecord) -> Self {
        let mut totals = Self::default();
        totals.add(record);
        totals
    }

    /// Add one record, saturating on overflow.
    ///
    /// Never saturates for records of a built `FactTable`: the builder rejects
    /// any table whose grand total overflows (see [`Totals::try_add`]), and every
    /// view sums a subset of its non-negative components.
    pub fn add(&mut self, record: &UnifiedRecord) {
        self.impressions = self.impressions.saturating_add(record.impressions);
        self.clicks = self.clicks.saturating_add(record.clicks);
        self.conversions = self.conversions.saturating_add(record.conversions);
        self.cost = self.cost.saturating_add(record.cost);
        self.conversion_value = self.conversion_value.saturating_add(record.conversion_value);
        self.rows += 1;
    }

    /// Add one record, naming the first component that would overflow.
    ///
    /// `self` is unchanged on error.
    pub fn try_add(&mut self, record: &UnifiedRecord) -> Result<(), &'static str> {
        *self = Totals {
            impressions: self
                .impressions
                .checked_add(record.impressions)
                .ok_or("impressions")?,
            clicks: self.clicks.checked_add(record.clicks).ok_or("clicks")?,
            conversions: self
                .conversions
                .checked_add(record.conversions)
                .ok_or("conversions")?,
            cost: self.cost.checked_add(record.cost).ok_or("cost")?,
            conversion_value: self
                .conversion_value
                .checked_add(record.conversion_value)
                .ok_or("conversion_value")?,
            rows: self.rows + 1,
        };
        Ok(())
    }

    /// Combine two subtotals, saturating on overflow like [`Totals::add`].
    pub fn merge(&mut self, other: &Totals) {
        self.impressions = self.impressions.saturating_add(other.impressions);
        self.clicks = self.clicks.saturating_add(other.clicks);
        self.conversions = self.conversions.saturating_add(other.conversions);
        self.cost = self.cost.saturating_add(other.cost);
        self.conversion_value = self.conversion_value.saturating_add(other.conversion_value);
        self.rows += other.rows;
    }

    pub fn kpis(&self) -> Kpis {
        Kpis::from_totals(self)
    }
}

impl<'a> FromIterator<&'a UnifiedRecord> for Totals {
    fn from_iter<I: IntoIterator<Item = &'a UnifiedRecord>>(iter: I) -> Self {
        let mut totals = Self::default();
        for record in iter {
            totals.add(record);
        }
        totals
    }
}

/// Derived ratios. `None` means the denominator was zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Kpis {
    ctr: Option<f64>,
    cpc: Option<f64>,
    cpa: Option<f64>,
    roas: Option<f64>,
    cpm: Option<f64>,
}

impl Kpis {
    pub fn from_totals(t: &Totals) -> Self {
        let impressions = Decimal::from(t.impressions);
        let clicks = Decimal::from(t.clicks);
        let conversions = Decimal::from(t.conversions);
        Self {
            ctr: ratio(clicks, impressions, 100),
            cpc: ratio(t.cost, clicks, 1),
            cpa: ratio(t.cost, conversions, 1),
            roas: ratio(t.conversion_value, t.cost, 100),
            cpm: ratio(t.cost, impressions, 1000),
        }
    }

    /// Click-through rate, percent.
    pub fn ctr(&self) -> Option<f64> {
        self.ctr
    }

    /// Cost per click.
    pub fn cpc(&self) -> Option<f64> {
        self.cpc
    }

    /// Cost per acquisition.
    pub fn cpa(&self) -> Option<f64> {
        self.cpa
    }

    /// Return on ad spend, percent.
    pub fn roas(&self) -> Option<f64> {
        self.roas
    }

    /// Cost per thousand impressions.
    pub fn cpm(&self) -> Option<f64> {
        self.cpm
    }
}

/// `numerator × scale / denominator`, or `None` when the denominator is zero.
///
/// Falls back to float division if the decimal computation overflows.
pub fn ratio(numerator: Decimal, denominator: Decimal, scale: u32) -> Option<f64> {
    if denominator.is_zero() {
        return None;
    }
    let exact = numerator
        .checked_mul(Decimal::from(scale))
        .and_then(|scaled| scaled.checked_div(denominator))
        .and_then(|value| value.to_f64());
    let value = match exact {
        Some(value) => value,
        None => numerator.to_f64()? * f64::from(scale) / denominator.to_f64()?,
    };
    value.is_finite().then_some(value)
}

/// A unified record with its KPIs populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasuredRecord {
    #[serde(flatten)]
    pub record: UnifiedRecord,
    #[serde(flatten)]
    pub kpis: Kpis,
}

pub fn measure(record: &UnifiedRecord) -> MeasuredRecord {
    MeasuredRecord {
        record: record.clone(),
        kpis: Totals::from_record(record).kpis(),
    }
}

pub fn measure_all<'a, I>(records: I) -> Vec<MeasuredRecord>
where
    I: IntoIterator<Item = &'a UnifiedRecord>,
{
    records.into_iter().map(measure).collect()
}
