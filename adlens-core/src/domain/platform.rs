use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Advertising platform a record was exported from.
///
/// Declaration order is the canonical platform order: fact table concatenation,
/// fingerprinting and group-key sorting all follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Facebook,
    Google,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Google, Platform::TikTok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::TikTok => "TikTok",
        }
    }

    /// File name of the platform's export in the standard data directory layout.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Facebook => "01_facebook_ads.csv",
            Self::Google => "02_google_ads.csv",
            Self::TikTok => "03_tiktok_ads.csv",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}' (expected facebook, google or tiktok)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" | "fb" | "meta" => Ok(Self::Facebook),
            "google" | "google_ads" | "googleads" => Ok(Self::Google),
            "tiktok" | "tik_tok" => Ok(Self::TikTok),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Facebook".parse::<Platform>().unwrap(), Platform::Facebook);
        assert_eq!(" google ".parse::<Platform>().unwrap(), Platform::Google);
        assert_eq!("TIKTOK".parse::<Platform>().unwrap(), Platform::TikTok);
    }

    #[test]
    fn rejects_unknown_platform() {
        let err = "snapchat".parse::<Platform>().unwrap_err();
        assert!(err.to_string().contains("snapchat"));
    }

    #[test]
    fn canonical_order_matches_all() {
        let mut shuffled = vec![Platform::TikTok, Platform::Facebook, Platform::Google];
        shuffled.sort();
        assert_eq!(shuffled, Platform::ALL.to_vec());
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        for p in Platform::ALL {
            assert_eq!(p.to_string().parse::<Platform>().unwrap(), p);
        }
    }
}
