//! ui-models - Headless view-models for data-table and file-uploader components
//!
//! Two passive models make up this crate: [`TableModel`] owns header columns,
//! a grid of cells and the row selection state; [`FileEntryCollection`] tracks
//! the files a user has chosen through their upload lifecycle. Presentation
//! layers read the models to render and write back through the mutation API
//! in response to gestures. Uploads and notifications go through the
//! [`UploadTransport`] and [`NotificationSink`] seams, so no rendering or
//! network code lives here.

pub mod config;
pub mod error;
pub mod model;
pub mod services;

pub use config::{ComponentSize, UploaderOptions};
pub use error::{ModelError, UploadError};
pub use model::files::{EntryId, FileEntry, FileEntryCollection, FileHandle, FileState};
pub use model::table::{CellComparator, TableEvent, TableHeaderItem, TableItem, TableModel};
pub use services::notify::{MemorySink, Notification, NotificationKind, NotificationSink};
pub use services::uploader::{UploadMessage, UploadService, UploadTransport};
