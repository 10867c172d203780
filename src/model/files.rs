//! File entry lifecycle models for the uploader
//!
//! Entries move through edit → upload → complete, with error as the retryable
//! failure state. The collection is insertion-ordered and keyed by generated
//! ids, so a completion arriving for a removed entry is a lookup miss rather
//! than a dangling reference.

use crate::config::UploaderOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upload lifecycle state of a file entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    /// Chosen by the user, not yet submitted
    #[default]
    Edit,
    /// Transport call outstanding
    Upload,
    /// Transport call succeeded
    Complete,
    /// Transport call failed; eligible for retry
    Error,
}

/// Opaque descriptor of a user-chosen file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// Collection-scoped identity of a file entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// A single file tracked through the upload lifecycle
#[derive(Debug, Clone)]
pub struct FileEntry {
    id: EntryId,
    pub file: FileHandle,
    pub state: FileState,
    pub uploaded: bool,
    /// Set when the file violates the size policy; such an entry never
    /// transitions to upload
    pub invalid: bool,
}

impl FileEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Transport success: complete and uploaded move together
    pub fn mark_complete(&mut self) {
        self.state = FileState::Complete;
        self.uploaded = true;
    }

    /// Transport failure: back to a retryable state
    pub fn mark_failed(&mut self) {
        self.state = FileState::Error;
        self.uploaded = false;
    }
}

/// Insertion-ordered set of file entries
///
/// Entries are deduplicated by generated id only: two files with the same
/// name and size added separately stay distinct.
#[derive(Debug)]
pub struct FileEntryCollection {
    entries: Vec<FileEntry>,
    next_id: u64,
    options: UploaderOptions,
}

impl Default for FileEntryCollection {
    fn default() -> Self {
        Self::new(UploaderOptions::default())
    }
}

impl FileEntryCollection {
    pub fn new(options: UploaderOptions) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            options,
        }
    }

    pub fn options(&self) -> &UploaderOptions {
        &self.options
    }

    /// Add a file as a new entry in edit state
    ///
    /// A single-file collection replaces its current entry. The invalid flag
    /// is set from the configured size policy.
    pub fn add(&mut self, file: FileHandle) -> EntryId {
        if !self.options.multiple {
            self.entries.clear();
        }

        let id = EntryId(self.next_id);
        self.next_id += 1;

        let invalid = file.size > self.options.max_size_bytes;
        debug!(name = %file.name, size = file.size, invalid, "adding file entry");

        self.entries.push(FileEntry {
            id,
            file,
            state: FileState::Edit,
            uploaded: false,
            invalid,
        });
        id
    }

    /// Remove an entry; absent ids are silently ignored
    pub fn remove(&mut self, id: EntryId) {
        self.entries.retain(|entry| entry.id != id);
    }

    pub fn get(&self, id: EntryId) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut FileEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut FileEntry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute every entry's invalid flag against a size policy
    pub fn revalidate(&mut self, max_size_bytes: u64) {
        for entry in &mut self.entries {
            entry.invalid = entry.file.size > max_size_bytes;
        }
    }

    /// Ids of entries violating a size policy, in insertion order
    pub fn oversized(&self, max_size_bytes: u64) -> Vec<EntryId> {
        self.entries
            .iter()
            .filter(|entry| entry.file.size > max_size_bytes)
            .map(|entry| entry.id)
            .collect()
    }
}
