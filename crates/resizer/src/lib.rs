//! Per-origin image and vector rescaling engine.
//!
//! The engine operates on a [`dom::Document`]:
//! - [`classify`] sorts `img`/`svg` elements into raster and vector kinds.
//! - [`DimensionLedger`] remembers each element's size before it was scaled,
//!   so scaling always recomputes from that baseline and never compounds.
//! - [`apply_scale`] and [`apply_reset`] scale elements and restore them.
//! - [`MutationWatcher`] reapplies the active origin's saved settings to
//!   content inserted after load.
//! - [`PageRuntime`] consumes one queue of [`PageEvent`]s (insertions,
//!   commands, navigations, storage changes) on a single execution context.

pub mod classify;
pub mod command;
pub mod config;
pub mod ledger;
pub mod reset;
pub mod runtime;
pub mod scaling;
pub mod watcher;

pub use classify::{Classification, classify, classify_source};
pub use command::{Command, dispatch};
pub use config::ResizerConfig;
pub use ledger::{BaselineEntry, DimensionLedger};
pub use reset::{ResetParams, apply_reset};
pub use runtime::{PageEvent, PageHandle, PageRuntime};
pub use scaling::{ApplyReport, ScaleParams, Scope, apply_scale, visual_elements};
pub use watcher::{MutationWatcher, WatcherState};
