//! Inbound commands from the settings panel.
//!
//! Messages arrive as `{action, data}` JSON. Only `resize` and `reset` are
//! understood; anything else is dropped after a log line.

use crate::ledger::DimensionLedger;
use crate::reset::{ResetParams, apply_reset};
use crate::scaling::{ApplyReport, ScaleParams, Scope, apply_scale};
use dom::Document;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command verb with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "lowercase")]
pub enum Command {
    Resize(ScaleParams),
    Reset(ResetParams),
}

impl Command {
    /// Decode a transport message. `None` for unknown actions and malformed data.
    pub fn from_message(message: &Value) -> Option<Self> {
        let Some(action) = message.get("action").and_then(Value::as_str) else {
            debug!("Ignoring message without an action: {message}");
            return None;
        };
        if !matches!(action, "resize" | "reset") {
            debug!("Ignoring unknown action {action:?}");
            return None;
        }
        match serde_json::from_value(message.clone()) {
            Ok(command) => Some(command),
            Err(err) => {
                warn!("Ignoring malformed {action:?} message: {err}");
                None
            }
        }
    }

    /// Encode as a transport message.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_message(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Run a command against the whole document.
pub fn dispatch(doc: &mut Document, ledger: &mut DimensionLedger, command: Command) -> ApplyReport {
    match command {
        Command::Resize(params) => {
            info!(
                "Resizing to {}% (containers: {}, ignore vectors: {})",
                params.scale, params.force_resize_containers, params.ignore_vector
            );
            apply_scale(doc, ledger, params, Scope::Document)
        }
        Command::Reset(params) => {
            info!("Resetting (containers: {})", params.force_resize_containers);
            apply_reset(doc, ledger, params, Scope::Document)
        }
    }
}
