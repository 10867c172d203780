//! External collaborators of the models
//!
//! This module contains the seams the models reach the outside world through:
//! - Notification sink the models report non-fatal failures to
//! - Upload transport and the background service driving it

pub mod notify;
pub mod uploader;

pub use notify::{MemorySink, Notification, NotificationKind, NotificationSink};
pub use uploader::{UploadMessage, UploadService, UploadTransport};
