//! AdLens Runner: pipeline loading, views, rankings, insights and export.
//!
//! This crate builds on `adlens-core` to provide:
//! - TOML pipeline configuration (source paths, value per conversion)
//! - All-or-nothing loading with per-platform parallel normalization
//! - Fingerprint-keyed load cache
//! - Record filtering and group-by aggregation with recomputed KPIs
//! - Top-N ranking, headline scalars and key insights
//! - CSV/JSON export and text reports
//! - Deterministic sample data

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod filter;
pub mod headline;
pub mod insights;
pub mod ranking;
pub mod sample_data;

pub use aggregate::{aggregate, aggregate_records, Dimension, GroupBy, GroupKey, SummaryRow};
pub use cache::FactTableCache;
pub use config::{ConfigError, PipelineConfig, SourcePaths, ValuePerConversion};
pub use data_loader::{load_fact_table, LoadError, LoadedData};
pub use filter::{DateRange, FilterError, RecordFilter};
pub use headline::Headline;
pub use insights::Insights;
pub use ranking::{top_n, RankMetric};
pub use sample_data::{generate_sample, SampleSummary};
