//! Per-origin resize settings and the key/value store they persist in.
//!
//! The store itself is a collaborator: anything implementing
//! [`KeyValueStore`] can back the settings. [`MemoryStore`] is the shared
//! in-process implementation used by the page runtime and the settings panel.

use serde::{Deserialize, Serialize};

pub mod settings_store;
pub mod store;

pub use settings_store::{CURRENT_HOSTNAME_KEY, SettingsStore};
pub use store::{KeyValueStore, MemoryStore, StorageChange};

/// Resize settings recorded for one origin (hostname).
///
/// Persisted as `{scale, forceResize, ignoreSvg}`. Fields missing from a
/// persisted record read as zero/false; a zero scale means "nothing to apply".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginSettings {
    /// Scale in integer percent.
    #[serde(default)]
    pub scale: u32,
    /// Also resize the immediate parent of raster images.
    #[serde(default, rename = "forceResize")]
    pub force_resize_containers: bool,
    /// Leave vector content untouched.
    #[serde(default, rename = "ignoreSvg")]
    pub ignore_vector: bool,
}

impl OriginSettings {
    /// Scale shown for an origin with no saved record.
    pub const DEFAULT_SCALE: u32 = 100;

    /// Settings for an origin with no saved record: 100%, containers on, vectors ignored.
    pub const fn panel_defaults() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            force_resize_containers: true,
            ignore_vector: true,
        }
    }

    /// Whether these settings ask for any scaling at all.
    pub const fn has_scale(&self) -> bool {
        self.scale != 0
    }
}

impl Default for OriginSettings {
    fn default() -> Self {
        Self::panel_defaults()
    }
}
