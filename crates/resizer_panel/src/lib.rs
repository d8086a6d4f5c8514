//! Per-site settings panel for the resize engine.
//!
//! A [`SettingsPanel`] loads the settings of the active page's hostname,
//! lets the user step the scale and toggle the container/vector flags, and
//! commits them to the shared store while sending `resize` and `reset`
//! commands through a [`MessageSink`]. Slider bursts are coalesced with a
//! [`Debouncer`].

pub mod config;
pub mod debounce;
pub mod notify;
pub mod panel;
pub mod sink;

pub use config::PanelConfig;
pub use debounce::{DebounceTicket, Debouncer};
pub use notify::{LogNotifier, Notifier};
pub use panel::{NOTIFICATION_TITLE, RESET_MESSAGE, SettingsPanel};
pub use sink::MessageSink;
