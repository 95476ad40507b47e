//! Desktop notifications
//!
//! Over-threshold cycles raise a notification through the desktop
//! notification daemon. The side effect is strictly best-effort: the watcher
//! logs a failed notification and keeps polling. Production builds shell out
//! to `notify-send(1)`; the [`Notifier`] trait is the seam for tests.

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

#[cfg(test)]
use mockall::automock;

/// Icon hint passed to the notification daemon
pub const NOTIFICATION_ICON: &str = "dialog-warning";

/// Title used for over-threshold notifications
pub const NOTIFICATION_TITLE: &str = "High F5 VPN memory usage";

/// Sink for desktop notifications
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Raise a desktop notification with the given title and body
    async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Production notifier backed by `notify-send(1)`
#[derive(Debug, Default)]
pub struct NotifySendNotifier;

impl NotifySendNotifier {
    /// Create a new NotifySendNotifier instance
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for NotifySendNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        let status = Command::new("notify-send")
            .args(["-i", NOTIFICATION_ICON, title, body])
            .status()
            .await
            .map_err(|e| Error::notification(format!("failed to invoke notify-send: {e}")))?;

        if !status.success() {
            return Err(Error::notification(format!(
                "notify-send exited with {status}"
            )));
        }

        Ok(())
    }
}
