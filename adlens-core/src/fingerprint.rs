//! Source fingerprinting: deterministic identity of one data load.
//!
//! The fingerprint covers everything that can change the fact table: the bytes
//! of every source file, the platform each file was read as, and the
//! value-per-conversion policy used for imputation. It is the load cache key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::normalize::ImputationPolicy;
use crate::data::reader::SourceBytes;

/// BLAKE3 hex digest identifying a set of sources plus imputation policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceFingerprint(String);

impl SourceFingerprint {
    /// Hash sources in canonical platform order, independent of input order.
    pub fn compute(sources: &[SourceBytes], policy: &ImputationPolicy) -> Self {
        let mut ordered: Vec<&SourceBytes> = sources.iter().collect();
        ordered.sort_by_key(|s| s.platform);

        let mut hasher = blake3::Hasher::new();
        for source in ordered {
            hasher.update(source.platform.as_str().as_bytes());
            hasher.update(&[0]);
            // length prefix keeps file boundaries unambiguous
            hasher.update(&(source.bytes.len() as u64).to_le_bytes());
            hasher.update(&source.bytes);
        }
        hasher.update(b"value_per_conversion");
        for value in [policy.facebook, policy.tiktok] {
            hasher.update(value.normalize().to_string().as_bytes());
            hasher.update(&[0]);
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for SourceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
