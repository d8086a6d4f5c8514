//! Runtime configuration for the page engine.

use std::env;

/// Engine configuration, loaded from the environment or built explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResizerConfig {
    /// Keep the active origin's settings in memory between insertion batches,
    /// refreshing them on storage changes and navigation.
    pub cache_settings: bool,
}

impl ResizerConfig {
    /// Construct a `ResizerConfig` with explicit values.
    #[inline]
    #[must_use]
    pub const fn new(cache_settings: bool) -> Self {
        Self { cache_settings }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `RESIZER_CACHE_SETTINGS`: set to "0" to read the store on every
    /// insertion batch (default: caching enabled).
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let cache_settings = env::var("RESIZER_CACHE_SETTINGS").ok().as_deref() != Some("0");
        Self { cache_settings }
    }
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self::new(true)
    }
}
