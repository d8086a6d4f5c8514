//! Headless model of the per-site settings panel.
//!
//! The panel edits the settings of one hostname (the page it was opened
//! for), persists them and forwards `resize`/`reset` commands to the page.

use crate::config::PanelConfig;
use crate::debounce::{DebounceTicket, Debouncer};
use crate::notify::Notifier;
use crate::sink::MessageSink;
use anyhow::Result;
use log::{debug, info};
use origin_settings::{KeyValueStore, OriginSettings, SettingsStore};
use resizer::{Command, ResetParams, ScaleParams};
use url::Url;

/// Title of every panel notification.
pub const NOTIFICATION_TITLE: &str = "Image Resizer";
/// Body of the notification shown after a reset.
pub const RESET_MESSAGE: &str = "Images have been reset to original sizes for this website.";

/// Settings panel bound to the hostname of one page.
pub struct SettingsPanel<S, M, N> {
    settings: SettingsStore<S>,
    sink: M,
    notifier: N,
    config: PanelConfig,
    debouncer: Debouncer,
    hostname: Option<String>,
    scale: u32,
    force_resize_containers: bool,
    ignore_vector: bool,
}

impl<S: KeyValueStore, M: MessageSink, N: Notifier> SettingsPanel<S, M, N> {
    /// Open the panel for the page at `page_url` and load its saved settings.
    ///
    /// Pages without a hostname (missing or unparseable URL, `file:` pages)
    /// get the defaults and never persist anything.
    pub async fn open(
        store: S,
        sink: M,
        notifier: N,
        page_url: Option<&str>,
        config: PanelConfig,
    ) -> Self {
        let defaults = OriginSettings::panel_defaults();
        let mut panel = Self {
            settings: SettingsStore::new(store),
            sink,
            notifier,
            debouncer: Debouncer::new(config.debounce()),
            hostname: page_url.and_then(hostname_of),
            scale: config.clamp(defaults.scale),
            force_resize_containers: defaults.force_resize_containers,
            ignore_vector: defaults.ignore_vector,
            config,
        };
        panel.load().await;
        panel
    }

    async fn load(&mut self) {
        let Some(hostname) = &self.hostname else {
            debug!("Panel opened for a page without a hostname");
            return;
        };
        let Some(saved) = self.settings.settings_for(hostname).await else {
            return;
        };
        if saved.has_scale() {
            self.scale = self.config.clamp(saved.scale);
        }
        self.force_resize_containers = saved.force_resize_containers;
        self.ignore_vector = saved.ignore_vector;
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub const fn scale(&self) -> u32 {
        self.scale
    }

    pub const fn force_resize_containers(&self) -> bool {
        self.force_resize_containers
    }

    pub const fn ignore_vector(&self) -> bool {
        self.ignore_vector
    }

    /// The settings as currently shown.
    pub const fn current(&self) -> OriginSettings {
        OriginSettings {
            scale: self.scale,
            force_resize_containers: self.force_resize_containers,
            ignore_vector: self.ignore_vector,
        }
    }

    /// Move the slider; the value is clamped into the configured bounds.
    pub fn set_scale(&mut self, scale: u32) -> u32 {
        self.scale = self.config.clamp(scale);
        self.scale
    }

    /// One step up, stopping at the maximum.
    pub fn increase(&mut self) -> u32 {
        self.set_scale(self.scale.saturating_add(self.config.step))
    }

    /// One step down, stopping at the minimum.
    pub fn decrease(&mut self) -> u32 {
        self.set_scale(self.scale.saturating_sub(self.config.step))
    }

    /// Takes effect with the next commit.
    pub fn set_force_resize_containers(&mut self, enabled: bool) {
        self.force_resize_containers = enabled;
    }

    /// Takes effect with the next commit.
    pub fn set_ignore_vector(&mut self, enabled: bool) {
        self.ignore_vector = enabled;
    }

    /// Save the shown settings for the hostname and ask the page to resize.
    /// Returns `false` without a hostname, in which case nothing happens.
    ///
    /// # Errors
    /// Returns an error if the store rejects the write or the page is gone.
    pub async fn commit(&self) -> Result<bool> {
        let Some(hostname) = &self.hostname else {
            debug!("Nothing to commit without a hostname");
            return Ok(false);
        };
        let current = self.current();
        self.settings.save(hostname, &current).await?;
        let message = Command::Resize(ScaleParams::from(current)).to_message()?;
        self.sink.deliver(message)?;
        info!("Committed {}% for {hostname}", current.scale);
        Ok(true)
    }

    /// Start the quiet period for a commit; any earlier ticket is superseded.
    pub fn schedule_commit(&self) -> DebounceTicket {
        self.debouncer.schedule()
    }

    /// Wait out `ticket` and commit if it is still the latest one.
    ///
    /// # Errors
    /// Same conditions as [`SettingsPanel::commit`].
    pub async fn commit_after(&self, ticket: DebounceTicket) -> Result<bool> {
        if ticket.wait().await {
            self.commit().await
        } else {
            Ok(false)
        }
    }

    /// Restore the defaults, save them, tell the page to drop all scaling and
    /// notify the user. Pending debounced commits are cancelled.
    ///
    /// # Errors
    /// Returns an error if the store rejects the write or the page is gone.
    pub async fn reset(&mut self) -> Result<()> {
        self.debouncer.cancel();
        let defaults = OriginSettings::panel_defaults();
        self.scale = self.config.clamp(defaults.scale);
        self.force_resize_containers = defaults.force_resize_containers;
        self.ignore_vector = defaults.ignore_vector;

        if let Some(hostname) = &self.hostname {
            self.settings.save(hostname, &self.current()).await?;
        }
        let message = Command::Reset(ResetParams {
            force_resize_containers: true,
            ignore_vector: true,
        })
        .to_message()?;
        self.sink.deliver(message)?;
        info!("Reset requested for {:?}", self.hostname);
        self.notifier.notify(NOTIFICATION_TITLE, RESET_MESSAGE);
        Ok(())
    }
}

fn hostname_of(page_url: &str) -> Option<String> {
    match Url::parse(page_url) {
        Ok(url) => url
            .host_str()
            .filter(|host| !host.is_empty())
            .map(str::to_owned),
        Err(err) => {
            debug!("No hostname for {page_url:?}: {err}");
            None
        }
    }
}
