//! Slider bounds and commit timing for the settings panel.
//!
//! Configuration can be loaded from environment variables or constructed
//! programmatically.

use core::time::Duration;
use std::env;

/// Settings panel configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    /// Smallest selectable scale, in percent
    pub min_scale: u32,
    /// Largest selectable scale, in percent
    pub max_scale: u32,
    /// Scale change of one increase/decrease press
    pub step: u32,
    /// Quiet period before a burst of slider changes is committed
    pub debounce_ms: u64,
}

impl PanelConfig {
    /// Construct a new `PanelConfig` with explicit values.
    ///
    /// The bounds are swapped if given in the wrong order and the step is at
    /// least 1.
    #[inline]
    #[must_use]
    pub const fn new(min_scale: u32, max_scale: u32, step: u32, debounce_ms: u64) -> Self {
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        let step = if step < 1 { 1 } else { step };
        Self {
            min_scale,
            max_scale,
            step,
            debounce_ms,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `RESIZER_MIN_SCALE`: Smallest scale in percent (default: 50)
    /// - `RESIZER_MAX_SCALE`: Largest scale in percent (default: 300)
    /// - `RESIZER_SCALE_STEP`: Increase/decrease step in percent (default: 10)
    /// - `RESIZER_DEBOUNCE_MS`: Commit debounce in milliseconds (default: 300)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self::new(
            env_number("RESIZER_MIN_SCALE").unwrap_or(defaults.min_scale),
            env_number("RESIZER_MAX_SCALE").unwrap_or(defaults.max_scale),
            env_number("RESIZER_SCALE_STEP").unwrap_or(defaults.step),
            env_number("RESIZER_DEBOUNCE_MS").unwrap_or(defaults.debounce_ms),
        )
    }

    /// Clamp a scale into `[min_scale, max_scale]`.
    #[inline]
    #[must_use]
    pub fn clamp(&self, scale: u32) -> u32 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// The debounce period as a `Duration`.
    #[inline]
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new(50, 300, 10, 300)
    }
}

fn env_number<T: core::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|val| val.trim().parse::<T>().ok())
}
