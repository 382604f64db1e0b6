//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! [sources]
//! facebook = "data/01_facebook_ads.csv"
//! google = "data/02_google_ads.csv"
//! tiktok = "data/03_tiktok_ads.csv"
//!
//! [value_per_conversion]
//! facebook = 50.0
//! tiktok = 50.0
//! ```
//!
//! The `[value_per_conversion]` table is optional. When present it must name
//! every platform whose revenue is imputed. Amounts are read straight into
//! `Decimal`, so `0.1` means exactly one tenth.

use adlens_core::data::ImputationPolicy;
use adlens_core::domain::Platform;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("source path for {0} is empty")]
    EmptySourcePath(Platform),

    #[error("value per conversion for {platform} must not be negative, got {value}")]
    InvalidValuePerConversion { platform: Platform, value: Decimal },

    #[error("[value_per_conversion] is missing an entry for {0}")]
    MissingValuePerConversion(Platform),
}

/// One export file per platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcePaths {
    pub facebook: PathBuf,
    pub google: PathBuf,
    pub tiktok: PathBuf,
}

impl SourcePaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            facebook: dir.join(Platform::Facebook.default_file_name()),
            google: dir.join(Platform::Google.default_file_name()),
            tiktok: dir.join(Platform::TikTok.default_file_name()),
        }
    }

    pub fn get(&self, platform: Platform) -> &Path {
        match platform {
            Platform::Facebook => &self.facebook,
            Platform::Google => &self.google,
            Platform::TikTok => &self.tiktok,
        }
    }

    fn resolve_against(&mut self, base: &Path) {
        for path in [&mut self.facebook, &mut self.google, &mut self.tiktok] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Assumed revenue per conversion for the platforms that report none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValuePerConversion {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub facebook: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub tiktok: Option<Decimal>,
}

impl Default for ValuePerConversion {
    fn default() -> Self {
        let fifty = Some(ImputationPolicy::default_value_per_conversion());
        Self {
            facebook: fifty,
            tiktok: fifty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub sources: SourcePaths,
    #[serde(default)]
    pub value_per_conversion: ValuePerConversion,
}

impl PipelineConfig {
    /// Default file names in `dir` with the default imputation policy.
    pub fn from_data_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            sources: SourcePaths::in_dir(dir),
            value_per_conversion: ValuePerConversion::default(),
        }
    }

    /// Parse and validate TOML. Relative paths are kept as written.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative source paths resolve against its directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            config.sources.resolve_against(base);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for platform in Platform::ALL {
            if self.sources.get(platform).as_os_str().is_empty() {
                return Err(ConfigError::EmptySourcePath(platform));
            }
        }
        self.to_policy().map(|_| ())
    }

    /// The imputation policy this config describes.
    pub fn to_policy(&self) -> Result<ImputationPolicy, ConfigError> {
        let vpc = &self.value_per_conversion;
        Ok(ImputationPolicy {
            facebook: checked_amount(Platform::Facebook, vpc.facebook)?,
            tiktok: checked_amount(Platform::TikTok, vpc.tiktok)?,
        })
    }
}

fn checked_amount(platform: Platform, value: Option<Decimal>) -> Result<Decimal, ConfigError> {
    let value = value.ok_or(ConfigError::MissingValuePerConversion(platform))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConfigError::InvalidValuePerConversion { platform, value });
    }
    Ok(value)
}
