//! AdLens Core: domain types, source readers, normalization, fact table, KPIs.
//!
//! This crate turns three platform ad exports into one unified dataset:
//! - Domain types (platforms, unified records, platform extras)
//! - CSV source readers with header validation
//! - One normalization adapter per platform behind `PlatformAdapter`
//! - Fact table builder (date parsing, canonical platform order)
//! - KPI calculator over summed components
//! - Source fingerprinting for the load cache

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod kpi;

pub use data::{DataError, FactTable, FactTableBuilder, ImputationPolicy, SchemaError};
pub use domain::{Platform, PlatformExtras, UnifiedRecord};
pub use fingerprint::SourceFingerprint;
pub use kpi::{Kpis, MeasuredRecord, Totals};
