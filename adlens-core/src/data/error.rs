//! Structured error types for the load → normalize → build stage.
//!
//! Every variant names the platform it came from so a failed load can be traced
//! back to one export file. All of them abort the load: there is no partial
//! dataset.

use std::path::PathBuf;
use thiserror::Error;

use super::schema::SchemaError;
use crate::domain::Platform;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read {platform} source {}: {reason}", .path.display())]
    SourceRead {
        platform: Platform,
        path: PathBuf,
        reason: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{platform} line {line}: invalid value '{value}' in column '{column}': {reason}")]
    InvalidValue {
        platform: Platform,
        line: u64,
        column: String,
        value: String,
        reason: &'static str,
    },

    #[error("{platform} line {line}: unparseable date '{value}'")]
    InvalidDate {
        platform: Platform,
        line: u64,
        value: String,
    },

    #[error("{platform} line {line}: summing '{column}' over all records overflows")]
    TotalsOverflow {
        platform: Platform,
        line: u64,
        column: &'static str,
    },

    #[error("{0} records supplied more than once to the fact table builder")]
    DuplicatePlatform(Platform),

    #[error("{table} table handed to the {adapter} adapter")]
    PlatformMismatch { table: Platform, adapter: Platform },
}

impl DataError {
    /// Platform the error originated from.
    pub fn platform(&self) -> Platform {
        match self {
            Self::SourceRead { platform, .. }
            | Self::InvalidValue { platform, .. }
            | Self::InvalidDate { platform, .. }
            | Self::TotalsOverflow { platform, .. } => *platform,
            Self::Schema(e) => e.platform(),
            Self::DuplicatePlatform(p) => *p,
            Self::PlatformMismatch { table, .. } => *table,
        }
    }
}
