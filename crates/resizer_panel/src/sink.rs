//! Outbound message transport from the panel to the active page.

use anyhow::Result;
use log::debug;
use resizer::PageHandle;
use serde_json::Value;

/// Delivers `{action, data}` messages to the active page.
pub trait MessageSink {
    /// Send one message.
    ///
    /// # Errors
    /// Returns an error if the page can no longer be reached.
    fn deliver(&self, message: Value) -> Result<()>;
}

impl MessageSink for PageHandle {
    fn deliver(&self, message: Value) -> Result<()> {
        if !self.send_message(&message)? {
            debug!("Page did not accept {message}");
        }
        Ok(())
    }
}
