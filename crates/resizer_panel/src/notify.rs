//! User-visible notifications.

use log::info;

/// Displays a short titled notification to the user.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!(target: "notification", "{title}: {message}");
    }
}
