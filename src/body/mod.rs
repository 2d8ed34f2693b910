//! Response body view state
//!
//! Everything that decides what the body viewer shows, independent of how
//! it is drawn.

mod classify;
mod coalesce;
mod controller;
mod export;
mod feedback;
mod payload;
mod preference;

pub use classify::{select_view, ContentClassification, ViewSelection, ViewToggles};
pub use controller::{ViewStateController, HIGHLIGHT_TIMEOUT_NOTICE};
pub use export::{
    default_download_dir, user_download_dir, DeclineExport, DirectoryExporter, DownloadLink,
    ExportHandler, ExportOutcome, ExportRequest,
};
pub use feedback::{Clipboard, CopyState, SystemClipboard};
pub use payload::{ResponsePayload, DEFAULT_CHARSET};
pub use preference::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceBus, PreferenceStore, StorageEvent,
    TABLE_PREFERENCE_KEY,
};
