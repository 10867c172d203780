//! Background upload service
//!
//! Handles admission of a file entry batch against the size policy and the
//! transport calls for admitted entries. One worker thread runs per entry;
//! results arrive over a channel in completion order, which need not match
//! submission order.

use crate::error::UploadError;
use crate::model::files::{EntryId, FileEntryCollection, FileHandle, FileState};
use crate::services::notify::{Notification, NotificationSink};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// Transport performing the actual transfer; latency and protocol are opaque
pub trait UploadTransport: Send + Sync {
    fn upload(&self, file: &FileHandle) -> Result<(), UploadError>;
}

/// Message types sent from upload worker threads
pub enum UploadMessage {
    Completed(EntryId),
    Failed(EntryId, String),
}

/// Upload orchestration for a file entry collection
///
/// All entry mutation happens on the caller's thread, inside `begin_upload`
/// and `poll`; worker threads only run the transport call and send a message.
pub struct UploadService {
    sender: Sender<UploadMessage>,
    receiver: Receiver<UploadMessage>,
    in_flight: usize,
    /// Anchor ref forwarded on notifications, supplied by the embedder
    target: Option<String>,
}

impl Default for UploadService {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadService {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Number of outstanding transport calls
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Validate the collection and start uploads if every entry passes
    ///
    /// Every oversized entry gets its own error notification, never a single
    /// aggregate. Admission is all-or-nothing: one violation holds the whole
    /// batch back until the offending file is removed or replaced. Returns
    /// the number of uploads started.
    ///
    /// Already-uploaded entries are skipped, failed entries are retried, and
    /// entries with a transport call still outstanding are left in flight.
    pub fn begin_upload(
        &mut self,
        files: &mut FileEntryCollection,
        max_size_bytes: u64,
        transport: &Arc<dyn UploadTransport>,
        sink: &mut dyn NotificationSink,
    ) -> usize {
        files.revalidate(max_size_bytes);

        let oversized = files.oversized(max_size_bytes);
        for id in &oversized {
            if let Some(entry) = files.get(*id) {
                let notification = Notification::error(
                    format!("'{}' exceeds size limit", entry.file.name),
                    format!(
                        "{}kb max size. Please select a new file and try again",
                        max_size_bytes / 1000
                    ),
                );
                sink.notify(self.targeted(notification));
            }
        }
        if !oversized.is_empty() {
            debug!(count = oversized.len(), "upload batch held back by size policy");
            return 0;
        }

        let mut started = 0;
        for entry in files.entries_mut() {
            if entry.uploaded || entry.state == FileState::Upload || entry.invalid {
                continue;
            }
            entry.state = FileState::Upload;
            self.in_flight += 1;
            started += 1;

            let id = entry.id();
            let file = entry.file.clone();
            let transport = Arc::clone(transport);
            let tx = self.sender.clone();
            thread::spawn(move || {
                let message = match transport.upload(&file) {
                    Ok(()) => UploadMessage::Completed(id),
                    Err(err) => UploadMessage::Failed(id, err.to_string()),
                };
                let _ = tx.send(message);
            });
        }

        started
    }

    /// Drain pending completions onto the collection, returns true on updates
    ///
    /// Completions are applied in arrival order, whatever order the transport
    /// finishes in. An entry removed while its call was outstanding is a
    /// lookup miss and its completion is discarded.
    pub fn poll(
        &mut self,
        files: &mut FileEntryCollection,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        let mut had_updates = false;

        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    had_updates |= self.apply(message, files, sink);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        had_updates
    }

    /// Apply one completion; a missing entry was removed mid-flight
    fn apply(
        &self,
        message: UploadMessage,
        files: &mut FileEntryCollection,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        match message {
            UploadMessage::Completed(id) => match files.get_mut(id) {
                Some(entry) => {
                    entry.mark_complete();
                    true
                }
                None => {
                    debug!(?id, "discarding stale completion");
                    false
                }
            },
            UploadMessage::Failed(id, reason) => match files.get_mut(id) {
                Some(entry) => {
                    entry.mark_failed();
                    let notification = Notification::error(
                        format!("'{}' failed to upload", entry.file.name),
                        reason,
                    );
                    sink.notify(self.targeted(notification));
                    true
                }
                None => {
                    debug!(?id, "discarding stale failure");
                    false
                }
            },
        }
    }

    fn targeted(&self, notification: Notification) -> Notification {
        match &self.target {
            Some(target) => notification.with_target(target.clone()),
            None => notification,
        }
    }
}
