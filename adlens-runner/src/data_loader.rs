//! Pipeline loading: source files → normalized platform batches → fact table.
//!
//! The load is all-or-nothing:
//! 1. Every configured file is read into memory (in platform order)
//! 2. Each platform is parsed and normalized on its own rayon task
//! 3. Results are joined in platform order; the first error aborts the load
//! 4. The batches feed the fact table builder
//!
//! The source bytes are read once and reused for the fingerprint.

use adlens_core::data::{
    adapter_for, normalize_table, read_source, DataError, FactTable, FactTableBuilder,
    ImputationPolicy, RawTable, SourceBytes,
};
use adlens_core::domain::{NormalizedRow, Platform};
use adlens_core::fingerprint::SourceFingerprint;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, PipelineConfig};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// A built fact table plus the provenance needed to cache and report it.
#[derive(Debug)]
pub struct LoadedData {
    pub table: FactTable,
    /// Cache key: BLAKE3 over source bytes and imputation policy.
    pub fingerprint: SourceFingerprint,
    pub policy: ImputationPolicy,
    pub sources: BTreeMap<Platform, PathBuf>,
}

/// Read every configured source file, in platform order.
pub fn read_sources(config: &PipelineConfig) -> Result<Vec<SourceBytes>, LoadError> {
    Platform::ALL
        .iter()
        .map(|&platform| {
            read_source(platform, config.sources.get(platform)).map_err(LoadError::from)
        })
        .collect()
}

/// Full pipeline from config: read, fingerprint, normalize, build.
pub fn load_fact_table(config: &PipelineConfig) -> Result<LoadedData, LoadError> {
    let policy = config.to_policy()?;
    let sources = read_sources(config)?;
    let fingerprint = SourceFingerprint::compute(&sources, &policy);
    build_loaded(&sources, policy, fingerprint)
}

/// Normalize already-read sources and build the fact table.
pub fn build_loaded(
    sources: &[SourceBytes],
    policy: ImputationPolicy,
    fingerprint: SourceFingerprint,
) -> Result<LoadedData, LoadError> {
    let mut ordered: Vec<&SourceBytes> = sources.iter().collect();
    ordered.sort_by_key(|s| s.platform);

    let batches: Vec<Result<(Platform, Vec<NormalizedRow>), DataError>> = ordered
        .par_iter()
        .map(|source| normalize_source(source, &policy))
        .collect();

    let mut builder = FactTableBuilder::new();
    for batch in batches {
        let (platform, rows) = batch?;
        builder.push(platform, rows)?;
    }
    let table = builder.build()?;

    info!(
        fingerprint = fingerprint.short(),
        records = table.len(),
        "loaded fact table"
    );

    Ok(LoadedData {
        table,
        fingerprint,
        policy,
        sources: ordered
            .iter()
            .map(|s| (s.platform, s.path.clone()))
            .collect(),
    })
}

fn normalize_source(
    source: &SourceBytes,
    policy: &ImputationPolicy,
) -> Result<(Platform, Vec<NormalizedRow>), DataError> {
    let table = RawTable::parse(source)?;
    let adapter = adapter_for(source.platform, policy);
    let rows = normalize_table(adapter.as_ref(), &table)?;
    Ok((source.platform, rows))
}
