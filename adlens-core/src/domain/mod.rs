//! Domain types for AdLens

pub mod platform;
pub mod record;

pub use platform::{Platform, UnknownPlatform};
pub use record::{NormalizedRow, PlatformExtras, UnifiedRecord};
