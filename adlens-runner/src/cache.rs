//! In-memory load cache, one slot per set of source paths.
//!
//! Loading is the only expensive step, so it is memoized. Every call still
//! reads the source bytes to compute the fingerprint; a changed file therefore
//! misses, reloads and replaces the slot, so superseded tables are dropped.
//! Filtering and aggregation are never cached.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use adlens_core::fingerprint::SourceFingerprint;

use crate::config::{PipelineConfig, SourcePaths};
use crate::data_loader::{build_loaded, read_sources, LoadError, LoadedData};

/// Memoized fact tables.
#[derive(Debug, Default)]
pub struct FactTableCache {
    entries: HashMap<SourcePaths, Arc<LoadedData>>,
    hits: u64,
    misses: u64,
}

impl FactTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached load for the config's current sources, loading on a miss.
    pub fn get_or_load(&mut self, config: &PipelineConfig) -> Result<Arc<LoadedData>, LoadError> {
        let policy = config.to_policy()?;
        let sources = read_sources(config)?;
        let fingerprint = SourceFingerprint::compute(&sources, &policy);

        if let Some(loaded) = self.entries.get(&config.sources) {
            if loaded.fingerprint == fingerprint {
                self.hits += 1;
                debug!(fingerprint = fingerprint.short(), "fact table cache hit");
                return Ok(Arc::clone(loaded));
            }
        }

        self.misses += 1;
        debug!(fingerprint = fingerprint.short(), "fact table cache miss");
        let loaded = Arc::new(build_loaded(&sources, policy, fingerprint)?);
        if let Some(stale) = self
            .entries
            .insert(config.sources.clone(), Arc::clone(&loaded))
        {
            debug!(fingerprint = stale.fingerprint.short(), "evicted superseded fact table");
        }
        Ok(loaded)
    }

    pub fn contains(&self, fingerprint: &SourceFingerprint) -> bool {
        self.entries
            .values()
            .any(|loaded| &loaded.fingerprint == fingerprint)
    }

    /// Drop the entry with this fingerprint. Returns whether it was cached.
    pub fn invalidate(&mut self, fingerprint: &SourceFingerprint) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|_, loaded| &loaded.fingerprint != fingerprint);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::path::Path;

    fn write_sources(dir: &Path) -> PipelineConfig {
        std::fs::write(
            dir.join("01_facebook_ads.csv"),
            "date,campaign_id,campaign_name,ad_set_id,ad_set_name,impressions,clicks,spend,conversions\n\
             2024-01-01,FB_1,Spring Sale,AS_1,Broad,1000,20,100,2\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("02_google_ads.csv"),
            "date,campaign_id,campaign_name,ad_group_id,ad_group_name,impressions,clicks,cost,conversions,conversion_value\n\
             2024-01-01,G_1,Search,AG_1,Exact,500,50,50,4,100\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("03_tiktok_ads.csv"),
            "date,campaign_id,campaign_name,adgroup_id,adgroup_name,impressions,clicks,cost,conversions\n\
             2024-01-02,T_1,Creators,ADG_1,Gen Z,4000,80,40,1\n",
        )
        .unwrap();
        PipelineConfig::from_data_dir(dir)
    }

    #[test]
    fn second_load_is_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_sources(dir.path());
        let mut cache = FactTableCache::new();

        let first = cache.get_or_load(&config).unwrap();
        let second = cache.get_or_load(&config).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn modified_file_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_sources(dir.path());
        let mut cache = FactTableCache::new();

        let before = cache.get_or_load(&config).unwrap();
        let google = dir.path().join("02_google_ads.csv");
        let mut text = std::fs::read_to_string(&google).unwrap();
        text.push_str("2024-01-02,G_1,Search,AG_1,Exact,700,70,70,7,140\n");
        std::fs::write(&google, text).unwrap();
        let after = cache.get_or_load(&config).unwrap();

        assert_ne!(before.fingerprint, after.fingerprint);
        assert_eq!(after.table.len(), before.table.len() + 1);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(&before.fingerprint));
        assert!(cache.contains(&after.fingerprint));
    }

    #[test]
    fn repeated_edits_keep_one_entry_per_source_set() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_sources(dir.path());
        let google = dir.path().join("02_google_ads.csv");
        let mut cache = FactTableCache::new();

        for day in 2..=6 {
            cache.get_or_load(&config).unwrap();
            let mut text = std::fs::read_to_string(&google).unwrap();
            text.push_str(&format!("2024-01-0{day},G_1,Search,AG_1,Exact,10,1,1,0,0\n"));
            std::fs::write(&google, text).unwrap();
        }
        let latest = cache.get_or_load(&config).unwrap();

        assert_eq!(cache.misses(), 6);
        assert_eq!(cache.len(), 1);
        assert_eq!(latest.table.len(), 8);
    }

    #[test]
    fn distinct_source_sets_are_cached_side_by_side() {
        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();
        let first = write_sources(first_dir.path());
        let second = write_sources(second_dir.path());
        let mut cache = FactTableCache::new();

        cache.get_or_load(&first).unwrap();
        cache.get_or_load(&second).unwrap();
        cache.get_or_load(&first).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn policy_change_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_sources(dir.path());
        let mut cache = FactTableCache::new();

        let before = cache.get_or_load(&config).unwrap();
        config.value_per_conversion.facebook = Some(Decimal::from(75));
        let after = cache.get_or_load(&config).unwrap();

        assert_ne!(before.fingerprint, after.fingerprint);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_sources(dir.path());
        let mut cache = FactTableCache::new();

        let loaded = cache.get_or_load(&config).unwrap();
        assert!(cache.contains(&loaded.fingerprint));
        assert!(cache.invalidate(&loaded.fingerprint));
        assert!(!cache.invalidate(&loaded.fingerprint));
        assert!(cache.is_empty());

        cache.get_or_load(&config).unwrap();
        assert_eq!(cache.misses(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_sources(dir.path());
        std::fs::write(dir.path().join("01_facebook_ads.csv"), "date\n2024-01-01\n").unwrap();
        let mut cache = FactTableCache::new();

        assert!(cache.get_or_load(&config).is_err());
        assert!(cache.is_empty());
    }
}
