//! Notification sink interface
//!
//! The models report non-fatal failures here; delivery is fire-and-forget
//! and no return value flows back into the models.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Error,
}

/// A single notification routed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Where the presentation layer should anchor the toast, if anywhere
    pub target: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, message)
    }

    fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            target: None,
            timestamp: Local::now(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Receiver of model notifications
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Sink that buffers notifications in memory, for tests and headless hosts
#[derive(Debug, Default)]
pub struct MemorySink {
    pub notifications: Vec<Notification>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
