//! Record filtering: date range, platform set, campaign set.
//!
//! A record passes when it satisfies every present criterion. An absent
//! criterion and an empty set both mean "no restriction". Filtering borrows
//! from the fact table and never mutates it.

use adlens_core::data::FactTable;
use adlens_core::domain::{Platform, UnifiedRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("date range starts after it ends ({start} > {end})")]
    ReversedRange { start: NaiveDate, end: NaiveDate },
}

/// Inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, FilterError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(FilterError::ReversedRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        Self::new(Some(start), Some(end))
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordFilter {
    pub dates: DateRange,
    pub platforms: BTreeSet<Platform>,
    /// Matched against `campaign_name`.
    pub campaigns: BTreeSet<String>,
}

impl RecordFilter {
    /// The identity filter.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_dates(mut self, dates: DateRange) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    pub fn with_campaigns<S: Into<String>>(mut self, campaigns: impl IntoIterator<Item = S>) -> Self {
        self.campaigns = campaigns.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.dates.is_open() && self.platforms.is_empty() && self.campaigns.is_empty()
    }

    pub fn matches(&self, record: &UnifiedRecord) -> bool {
        self.dates.contains(record.date)
            && (self.platforms.is_empty() || self.platforms.contains(&record.platform))
            && (self.campaigns.is_empty() || self.campaigns.contains(&record.campaign_name))
    }

    /// Borrowed view of the matching records, in fact table order.
    pub fn apply<'a>(&self, table: &'a FactTable) -> Vec<&'a UnifiedRecord> {
        table.iter().filter(|r| self.matches(r)).collect()
    }
}
