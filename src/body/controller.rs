//! View state of the response body viewer
//!
//! [`ViewStateController`] decides which single body view is active, keeps
//! the decoded text of the current payload, mirrors the shared table-view
//! preference and runs the export flow. It never renders anything itself.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::error::ExportError;
use crate::preview::{PreviewChannel, PreviewMessage};

use super::classify::{select_view, ContentClassification, ViewSelection, ViewToggles};
use super::coalesce::PendingSlot;
use super::export::{default_download_dir, DownloadLink, ExportHandler, ExportOutcome, ExportRequest};
use super::feedback::{Clipboard, CopyFeedback, CopyState, COPY_FEEDBACK_DURATION};
use super::payload::ResponsePayload;
use super::preference::{
    parse_bool, InstanceId, PreferenceBus, PreferenceStore, StorageEvent, TablePreferenceChanged,
    TABLE_PREFERENCE_KEY,
};

/// Notice shown when the highlighter gives up
pub const HIGHLIGHT_TIMEOUT_NOTICE: &str =
    "Response parsing timeout. The response body might be too long.";

/// Content waiting for the coalescing window to elapse
#[derive(Debug)]
struct PendingContent {
    payload: ResponsePayload,
    content_type: Option<String>,
    charset: Option<String>,
}

struct BusLink {
    bus: PreferenceBus,
    rx: broadcast::Receiver<TablePreferenceChanged>,
}

pub struct ViewStateController {
    id: InstanceId,

    payload: ResponsePayload,
    content_type: Option<String>,
    charset: Option<String>,
    decoded: Option<String>,
    classification: ContentClassification,
    classification_passes: u64,
    pending: PendingSlot<PendingContent>,

    raw_view: bool,
    table_view: bool,
    forced_raw: bool,
    preview_open: bool,

    /// `None` when persistence is unavailable
    store: Option<Arc<dyn PreferenceStore>>,
    bus: Option<BusLink>,
    preview: Option<Box<dyn PreviewChannel>>,

    download: Option<DownloadLink>,
    download_dir: PathBuf,
    copy_feedback: CopyFeedback,
    notices: VecDeque<String>,
}

impl ViewStateController {
    pub fn new() -> Self {
        Self {
            id: InstanceId::new(),
            payload: ResponsePayload::Absent,
            content_type: None,
            charset: None,
            decoded: None,
            classification: ContentClassification::None,
            classification_passes: 0,
            pending: PendingSlot::new(Duration::ZERO),
            raw_view: false,
            table_view: false,
            forced_raw: false,
            preview_open: false,
            store: None,
            bus: None,
            preview: None,
            download: None,
            download_dir: default_download_dir(),
            copy_feedback: CopyFeedback::new(COPY_FEEDBACK_DURATION),
            notices: VecDeque::new(),
        }
    }

    /// Persist the table view in `store`. The store is probed once here; if
    /// the probe fails persistence stays off for the controller's lifetime.
    pub fn with_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        match store.probe() {
            Ok(()) => self.store = Some(store),
            Err(e) => {
                tracing::warn!("Preference store unavailable, table view kept in memory: {}", e);
                self.store = None;
            }
        }
        self
    }

    pub fn with_bus(mut self, bus: &PreferenceBus) -> Self {
        self.bus = Some(BusLink {
            bus: bus.clone(),
            rx: bus.subscribe(),
        });
        self
    }

    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.pending = PendingSlot::new(window);
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_copy_feedback(mut self, duration: Duration) -> Self {
        self.copy_feedback = CopyFeedback::new(duration);
        self
    }

    /// Attach the outgoing side of a preview channel
    pub fn attach_preview(&mut self, channel: Box<dyn PreviewChannel>) {
        self.preview = Some(channel);
    }

    pub fn persistence_enabled(&self) -> bool {
        self.store.is_some()
    }

    // ----- content -----

    /// Replace the payload and its metadata.
    ///
    /// The current classification and any download link are cleared right
    /// away, and the content type and charset are updated. Text and byte
    /// payloads are applied by the next [`tick`](Self::tick) once the
    /// coalescing window has passed; until then [`payload`](Self::payload)
    /// still returns the previous payload. Absent and empty payloads apply
    /// immediately and cancel anything still pending.
    pub fn set_content(
        &mut self,
        payload: ResponsePayload,
        content_type: Option<&str>,
        charset: Option<&str>,
        now: Instant,
    ) {
        self.clear_classification();
        self.content_type = content_type.map(str::to_string);
        self.charset = charset.map(str::to_string);

        let content = PendingContent {
            payload,
            content_type: content_type.map(str::to_string),
            charset: charset.map(str::to_string),
        };

        if content.payload.needs_decoding() {
            self.pending.replace(content, now);
        } else {
            self.pending.cancel();
            self.apply_content(content);
        }
    }

    /// Apply pending content whose window has elapsed
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending.take_due(now) {
            Some(content) => {
                self.apply_content(content);
                true
            }
            None => false,
        }
    }

    /// Apply pending content now
    pub fn flush_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(content) => {
                self.apply_content(content);
                true
            }
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_pending()
    }

    fn clear_classification(&mut self) {
        self.decoded = None;
        self.download = None;
        self.classification = ContentClassification::None;
        self.reset_toggles();
    }

    fn reset_toggles(&mut self) {
        self.raw_view = false;
        self.forced_raw = false;
        self.set_preview_open(false);
    }

    fn apply_content(&mut self, content: PendingContent) {
        let PendingContent {
            payload,
            content_type,
            charset,
        } = content;

        self.decoded = payload.decode(charset.as_deref()).map(|text| text.into_owned());
        self.payload = payload;
        self.content_type = content_type;
        self.charset = charset;

        let classification =
            ContentClassification::classify(self.content_type.as_deref(), self.decoded.as_deref());
        self.classification = classification;
        self.classification_passes += 1;

        tracing::debug!(
            content_type = ?self.content_type,
            classification = ?classification,
            length = self.decoded.as_ref().map(String::len),
            "Body classified"
        );

        if classification == ContentClassification::Json {
            self.adopt_stored_table_preference();
        }
    }

    fn adopt_stored_table_preference(&mut self) {
        let Some(store) = &self.store else {
            return;
        };

        match store.get(TABLE_PREFERENCE_KEY) {
            Ok(value) => {
                let stored = parse_bool(value.as_deref());
                if stored != self.table_view {
                    tracing::debug!(enabled = stored, "Adopting stored table view preference");
                    self.apply_table_view(stored);
                }
            }
            Err(e) => tracing::warn!("Failed to read table view preference: {}", e),
        }
    }

    // ----- accessors -----

    pub fn payload(&self) -> &ResponsePayload {
        &self.payload
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn decoded_text(&self) -> Option<&str> {
        self.decoded.as_deref()
    }

    pub fn classification(&self) -> ContentClassification {
        self.classification
    }

    /// Number of times content has been classified
    pub fn classification_passes(&self) -> u64 {
        self.classification_passes
    }

    pub fn is_json(&self) -> bool {
        self.classification == ContentClassification::Json
    }

    pub fn is_xml(&self) -> bool {
        self.classification == ContentClassification::Xml
    }

    pub fn is_parsed(&self) -> bool {
        self.classification == ContentClassification::Parsed
    }

    /// Content actions are shown only when there is typed, non-empty content
    pub fn has_data(&self) -> bool {
        self.content_type.as_deref().map(|ct| !ct.is_empty()).unwrap_or(false)
            && self.decoded.as_deref().map(|d| !d.is_empty()).unwrap_or(false)
    }

    pub fn raw_view(&self) -> bool {
        self.raw_view
    }

    pub fn table_view(&self) -> bool {
        self.table_view
    }

    pub fn preview_open(&self) -> bool {
        self.preview_open
    }

    pub fn active_view(&self) -> Option<ViewSelection> {
        if self.classification == ContentClassification::None {
            return None;
        }
        select_view(
            self.classification,
            ViewToggles {
                raw_view: self.raw_view,
                table_view: self.table_view,
                forced_raw: self.forced_raw,
            },
        )
    }

    /// Preview is offered for highlighted text bodies only
    pub fn can_preview(&self) -> bool {
        self.active_view() == Some(ViewSelection::Parsed)
    }

    // ----- toggles -----

    /// Turn the raw view on or off.
    ///
    /// Turning it on clears an active table view without persisting or
    /// announcing it. Turning it off brings back the view the remaining
    /// toggles select, which is `Json` when the table was cleared meanwhile.
    pub fn set_raw_view(&mut self, on: bool) {
        if on {
            if self.classification == ContentClassification::None || self.raw_view {
                return;
            }
            let previous = self.active_view();
            if self.table_view {
                self.table_view = false;
            }
            self.raw_view = true;
            tracing::debug!(previous = ?previous, "Raw view on");
        } else {
            if !self.raw_view && !self.forced_raw {
                return;
            }
            self.raw_view = false;
            self.forced_raw = false;
            tracing::debug!(restored = ?self.active_view(), "Raw view off");
        }
    }

    /// User-driven table view change; persisted and announced
    pub fn set_table_view(&mut self, on: bool) {
        if on == self.table_view {
            return;
        }
        self.apply_table_view(on);
        self.persist_table_view(on);
    }

    fn apply_table_view(&mut self, on: bool) {
        if on && (self.raw_view || self.forced_raw) {
            self.raw_view = false;
            self.forced_raw = false;
        }
        self.table_view = on;
    }

    fn persist_table_view(&mut self, on: bool) {
        let value = on.to_string();

        if let Some(store) = &self.store {
            match store.get(TABLE_PREFERENCE_KEY) {
                Ok(current) if current.as_deref() == Some(value.as_str()) => {}
                Ok(_) => {
                    if let Err(e) = store.set(TABLE_PREFERENCE_KEY, &value) {
                        tracing::warn!("Failed to store table view preference: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to read table view preference: {}", e),
            }
        }

        if let Some(link) = &self.bus {
            link.bus.publish(TablePreferenceChanged {
                enabled: on,
                origin: self.id,
            });
        }
    }

    /// Another viewer changed the preference; adopt it quietly
    pub fn on_external_table_preference_change(&mut self, enabled: bool) {
        if enabled != self.table_view {
            tracing::debug!(enabled, "Table view changed elsewhere");
            self.apply_table_view(enabled);
        }
    }

    /// Keyed store notification; only a present value for the table key counts
    pub fn on_storage_event(&mut self, event: &StorageEvent) {
        if event.key != TABLE_PREFERENCE_KEY {
            return;
        }
        let Some(value) = event.new_value.as_deref() else {
            return;
        };
        self.on_external_table_preference_change(parse_bool(Some(value)));
    }

    /// Drain preference notifications from the bus and the store.
    /// Returns true if anything was received.
    pub fn poll_notifications(&mut self) -> bool {
        let mut changes = Vec::new();

        if let Some(link) = &mut self.bus {
            loop {
                match link.rx.try_recv() {
                    Ok(change) if change.origin == self.id => {}
                    Ok(change) => changes.push(change.enabled),
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed table view notifications");
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        let events = self
            .store
            .as_ref()
            .map(|store| store.poll_external())
            .unwrap_or_default();

        let received = !changes.is_empty() || !events.is_empty();
        for enabled in changes {
            self.on_external_table_preference_change(enabled);
        }
        for event in &events {
            self.on_storage_event(event);
        }
        received
    }

    /// Open or close the preview. Failures to reach the surface are
    /// swallowed; the preview then simply does not update.
    pub fn set_preview_open(&mut self, open: bool) {
        if open == self.preview_open {
            return;
        }
        if open && !self.can_preview() {
            return;
        }
        self.preview_open = open;

        let message = if open {
            PreviewMessage::raw_response(self.decoded.clone().unwrap_or_default())
        } else {
            PreviewMessage::clean_up()
        };

        if let Some(channel) = &self.preview {
            if let Err(e) = channel.send(&message) {
                tracing::debug!("Preview not updated: {}", e);
            }
        }
    }

    /// The highlighter ran out of time; fall back to the raw view
    pub fn on_highlight_timeout(&mut self) {
        if self.forced_raw || self.active_view() != Some(ViewSelection::Parsed) {
            return;
        }
        tracing::warn!("Highlighting timed out, showing raw view");
        self.forced_raw = true;
        self.set_preview_open(false);
        self.notices.push_back(HIGHLIGHT_TIMEOUT_NOTICE.to_string());
    }

    /// User-visible notices queued since the last call
    pub fn take_notices(&mut self) -> Vec<String> {
        self.notices.drain(..).collect()
    }

    // ----- actions -----

    /// Offer the body to `handler`; if it declines, keep a download link
    pub fn request_export(&mut self, handler: &dyn ExportHandler) -> Result<ExportOutcome, ExportError> {
        let data = self.decoded.as_deref().ok_or(ExportError::NothingToExport)?;
        let request = ExportRequest::new(data, self.content_type.as_deref(), self.classification);

        let outcome = handler.export(&request);
        if outcome == ExportOutcome::Declined {
            // Replacing the link revokes the previous one
            self.download = Some(DownloadLink::create(&self.download_dir, &request)?);
        }
        Ok(outcome)
    }

    pub fn download(&self) -> Option<&DownloadLink> {
        self.download.as_ref()
    }

    /// Copy the pending download into `dest_dir` and drop the link
    pub fn save_download(&mut self, dest_dir: &Path) -> Result<PathBuf, ExportError> {
        let link = self.download.take().ok_or(ExportError::NothingToExport)?;
        link.save_to(dest_dir)
    }

    pub fn dismiss_download(&mut self) {
        self.download = None;
    }

    pub fn copy_to_clipboard(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> bool {
        let text = self.decoded.as_deref().unwrap_or_default();
        let copied = clipboard.copy(text);
        self.copy_feedback.record(copied, now);
        copied
    }

    pub fn copy_state(&mut self, now: Instant) -> CopyState {
        self.copy_feedback.state(now)
    }
}

impl Default for ViewStateController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewStateController {
    fn drop(&mut self) {
        self.download = None;
        self.preview = None;
        self.bus = None;
        tracing::debug!("View state controller torn down");
    }
}
