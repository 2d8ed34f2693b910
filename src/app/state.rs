//! Application state management

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::config::Config;
use super::events::{AppEvent, EventHandler};
use crate::body::{
    default_download_dir, user_download_dir, Clipboard, CopyState, DeclineExport,
    DirectoryExporter, ExportHandler, ExportOutcome, FilePreferenceStore, PreferenceBus,
    PreferenceStore, ResponsePayload, SystemClipboard, ViewSelection, ViewStateController,
};
use crate::error::UserHint;
use crate::preview::{self, PreviewHost, PreviewReply, PreviewSurface, SurfaceHandle};
use crate::render::{render_view, HighlightTimeout, RenderedBody, SyntectHighlighter};
use crate::tui::{preview_width, Theme, Tui};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Screen width assumed until the terminal reports one
const FALLBACK_WIDTH: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Normal,
    /// The export was declined and a download is waiting to be saved
    SaveDownload,
}

/// Shared application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Current application mode
    pub mode: AppMode,

    /// Whether the application should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    /// Status message timestamp (for auto-clear)
    pub status_timestamp: Option<Instant>,

    /// First body row shown
    pub scroll: u16,

    /// Wrap long lines
    pub wrap: bool,

    /// Height last reported by the preview surface
    pub preview_height: u16,

    /// Copy button feedback
    pub copy_state: CopyState,
}

impl AppState {
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_timestamp = Some(Instant::now());
    }
}

/// Main application struct
pub struct App {
    /// Application configuration
    pub config: Config,

    /// Shared application state
    pub state: Arc<RwLock<AppState>>,

    pub theme: Theme,

    /// View state of the body being shown
    pub controller: ViewStateController,

    /// Active view, rendered
    pub rendered: Option<RenderedBody>,

    /// (classification pass, view) the cached rendering belongs to
    rendered_key: Option<(u64, ViewSelection)>,

    highlighter: SyntectHighlighter,
    exporter: Box<dyn ExportHandler>,
    clipboard: Box<dyn Clipboard>,

    preview_host: PreviewHost,

    /// Handle of the detached preview surface
    pub preview: SurfaceHandle,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let store = match &config.general.preference_file {
            Some(path) => Ok(FilePreferenceStore::new(path)),
            None => FilePreferenceStore::default_location(),
        };
        let store: Option<Arc<dyn PreferenceStore>> = match store {
            Ok(store) => {
                tracing::info!(path = %store.path().display(), "Using preference file");
                Some(Arc::new(store))
            }
            Err(e) => {
                tracing::warn!("{}", e.user_hint());
                None
            }
        };

        Self::build(config, store, default_download_dir())
    }

    /// Create an application with an explicit preference store and
    /// download directory. Must run inside a tokio runtime.
    pub fn build(
        config: Config,
        store: Option<Arc<dyn PreferenceStore>>,
        download_dir: PathBuf,
    ) -> Result<Self> {
        let viewer = &config.viewer;

        let bus = PreferenceBus::new();
        let mut controller = ViewStateController::new()
            .with_bus(&bus)
            .with_coalesce_window(viewer.coalesce_window())
            .with_copy_feedback(viewer.copy_feedback())
            .with_download_dir(download_dir);
        if let Some(store) = store {
            controller = controller.with_store(store);
        }

        let (preview_host, port) = preview::channel();
        let width = crossterm::terminal::size()
            .map(|(w, _)| w)
            .unwrap_or(FALLBACK_WIDTH);
        let preview = PreviewSurface::spawn(port, preview_width(width), viewer.preview_settle());
        controller.attach_preview(Box::new(preview_host.sender()));

        let exporter: Box<dyn ExportHandler> = match &config.general.export_dir {
            Some(dir) => Box::new(DirectoryExporter::new(dir)),
            None => Box::new(DeclineExport),
        };

        let highlighter =
            SyntectHighlighter::new(viewer.highlight_budget(), viewer.max_highlight_bytes);
        let theme = Theme::named(&config.tui.theme).unwrap_or_default();

        let state = AppState {
            wrap: viewer.wrap_raw,
            ..AppState::default()
        };

        Ok(Self {
            config,
            state: Arc::new(RwLock::new(state)),
            theme,
            controller,
            rendered: None,
            rendered_key: None,
            highlighter,
            exporter,
            clipboard: Box::new(SystemClipboard::new()),
            preview_host,
            preview,
        })
    }

    /// Show a new body
    pub fn load(
        &mut self,
        payload: ResponsePayload,
        content_type: Option<&str>,
        charset: Option<&str>,
    ) {
        let charset = charset.or(Some(self.config.viewer.default_charset.as_str()));
        let charset = charset.map(str::to_string);
        self.controller
            .set_content(payload, content_type, charset.as_deref(), Instant::now());
    }

    /// Run the application in TUI mode
    pub async fn run_tui(&mut self) -> Result<()> {
        // Initialize terminal
        let mut tui = Tui::new()?;
        tui.enter()?;

        if let Ok((width, _)) = tui.size() {
            self.preview.resize(preview_width(width));
        }

        let event_handler = EventHandler::default();

        // Main event loop
        let result = self.main_loop(&mut tui, event_handler).await;

        tui.exit()?;
        result
    }

    /// Apply the body and print the active view, or export it
    pub fn run_headless(&mut self, export: bool) -> Result<()> {
        self.controller.flush_pending();
        self.refresh_view();
        for notice in self.controller.take_notices() {
            tracing::warn!("{}", notice);
        }

        if export {
            return self.export_headless();
        }

        let view = self.controller.active_view();
        println!("classification: {:?}", self.controller.classification());
        println!("view: {}", view.map(|v| v.name()).unwrap_or("none"));
        if let Some(body) = &self.rendered {
            println!();
            println!("{}", body.to_plain_text());
        }
        Ok(())
    }

    fn export_headless(&mut self) -> Result<()> {
        match self.controller.request_export(self.exporter.as_ref())? {
            ExportOutcome::Claimed(Some(path)) => println!("{}", path.display()),
            ExportOutcome::Claimed(None) => println!("exported"),
            ExportOutcome::Declined => {
                let dir = user_download_dir()?;
                let path = self.controller.save_download(&dir)?;
                println!("{}", path.display());
            }
        }
        Ok(())
    }

    /// Main TUI event loop
    async fn main_loop(&mut self, tui: &mut Tui, mut event_handler: EventHandler) -> Result<()> {
        loop {
            self.sync(Instant::now());

            // Check if we should quit
            if self.state.read().should_quit {
                break;
            }

            // Draw UI
            tui.draw(self)?;

            // Handle events
            if let Some(event) = event_handler.next().await {
                self.handle_event(event)?;
            }
        }

        Ok(())
    }

    /// Catch up with timers, notifications and the preview surface
    pub fn sync(&mut self, now: Instant) {
        self.controller.tick(now);
        self.controller.poll_notifications();

        for reply in self.preview_host.drain_replies() {
            match reply {
                PreviewReply::Height { height } => self.state.write().preview_height = height,
                PreviewReply::Close { close: true } => self.controller.set_preview_open(false),
                PreviewReply::Close { close: false } => {}
            }
        }

        self.refresh_view();

        let copy_state = self.controller.copy_state(now);
        let notices = self.controller.take_notices();

        let mut state = self.state.write();
        state.copy_state = copy_state;
        if let Some(notice) = notices.into_iter().last() {
            state.set_status(notice);
        }
        if self.controller.download().is_none() && state.mode == AppMode::SaveDownload {
            state.mode = AppMode::Normal;
        }

        // Clear old status messages
        if let Some(timestamp) = state.status_timestamp {
            if now.saturating_duration_since(timestamp) > STATUS_TIMEOUT {
                state.status_message = None;
                state.status_timestamp = None;
            }
        }
    }

    /// Re-render the active view when it or the content changed
    fn refresh_view(&mut self) {
        loop {
            let Some(view) = self.controller.active_view() else {
                self.rendered = None;
                self.rendered_key = None;
                return;
            };

            let key = (self.controller.classification_passes(), view);
            if self.rendered_key == Some(key) {
                return;
            }

            let text = self.controller.decoded_text().unwrap_or_default();
            match render_view(
                view,
                text,
                self.controller.content_type(),
                &self.theme,
                &self.highlighter,
            ) {
                Ok(body) => {
                    if self.rendered_key.map(|(pass, _)| pass) != Some(key.0) {
                        self.state.write().scroll = 0;
                    }
                    self.rendered = Some(body);
                    self.rendered_key = Some(key);
                    return;
                }
                // The controller switches to the raw view, which cannot time out
                Err(HighlightTimeout) => self.controller.on_highlight_timeout(),
            }
        }
    }

    /// Handle an application event
    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize(width, height) => {
                tracing::debug!("Terminal resized to {}x{}", width, height);
                self.preview.resize(preview_width(width));
            }
            AppEvent::Tick => {}
        }

        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.state.write().should_quit = true;
            return;
        }

        let mode = self.state.read().mode;
        match mode {
            AppMode::SaveDownload => self.handle_save_key(key),
            AppMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_save_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('d') => {
                let result = user_download_dir().and_then(|dir| self.controller.save_download(&dir));
                let mut state = self.state.write();
                match result {
                    Ok(path) => state.set_status(format!("Saved to {}", path.display())),
                    Err(e) => state.set_status(e.user_hint()),
                }
                state.mode = AppMode::Normal;
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.controller.dismiss_download();
                let mut state = self.state.write();
                state.mode = AppMode::Normal;
                state.set_status("Download discarded");
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.state.write().should_quit = true,
            KeyCode::Esc => {
                if self.controller.preview_open() {
                    // Closing goes through the surface, like its own close button
                    self.preview.close();
                }
            }
            KeyCode::Char('r') => {
                let raw = self.controller.active_view() == Some(ViewSelection::Raw);
                self.controller.set_raw_view(!raw);
            }
            KeyCode::Char('t') => {
                if self.controller.is_json() {
                    let on = !self.controller.table_view();
                    self.controller.set_table_view(on);
                } else {
                    self.state.write().set_status("Table view is available for JSON bodies");
                }
            }
            KeyCode::Char('p') => {
                if self.controller.preview_open() {
                    self.controller.set_preview_open(false);
                } else if self.controller.can_preview() {
                    self.controller.set_preview_open(true);
                } else {
                    self.state
                        .write()
                        .set_status("Preview is available for highlighted bodies");
                }
            }
            KeyCode::Char('w') => {
                let mut state = self.state.write();
                state.wrap = !state.wrap;
            }
            KeyCode::Char('c') => {
                if self.controller.has_data() {
                    self.controller
                        .copy_to_clipboard(self.clipboard.as_mut(), Instant::now());
                }
            }
            KeyCode::Char('s') => self.export(),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(20),
            KeyCode::PageUp => self.scroll_by(-20),
            KeyCode::Char('g') | KeyCode::Home => self.state.write().scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll_by(i32::MAX),
            _ => {}
        }
    }

    fn export(&mut self) {
        let result = self.controller.request_export(self.exporter.as_ref());
        let mut state = self.state.write();
        match result {
            Ok(ExportOutcome::Claimed(Some(path))) => {
                state.set_status(format!("Exported to {}", path.display()))
            }
            Ok(ExportOutcome::Claimed(None)) => state.set_status("Exported"),
            Ok(ExportOutcome::Declined) => state.mode = AppMode::SaveDownload,
            Err(e) => state.set_status(e.user_hint()),
        }
    }

    fn scroll_by(&mut self, delta: i32) {
        let max = self
            .rendered
            .as_ref()
            .map(|body| body.row_count().saturating_sub(1))
            .unwrap_or(0)
            .min(u16::MAX as usize) as i64;

        let mut state = self.state.write();
        let next = (state.scroll as i64 + delta as i64).clamp(0, max);
        state.scroll = next as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{MemoryPreferenceStore, HIGHLIGHT_TIMEOUT_NOTICE, TABLE_PREFERENCE_KEY};
    use tempfile::TempDir;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn app_with(config: Config, downloads: &TempDir) -> (App, Arc<MemoryPreferenceStore>) {
        let store = Arc::new(MemoryPreferenceStore::new());
        let app = App::build(config, Some(store.clone()), downloads.path().to_path_buf()).unwrap();
        (app, store)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_json_body_toggles_between_views() {
        let downloads = TempDir::new().unwrap();
        let (mut app, store) = app_with(Config::default(), &downloads);

        app.load("[{\"a\":1}]".into(), Some("application/json"), None);
        app.sync(Instant::now());
        assert_eq!(app.controller.active_view(), Some(ViewSelection::Json));
        assert!(matches!(app.rendered, Some(RenderedBody::Lines(_))));

        app.handle_key(key('t'));
        app.sync(Instant::now());
        assert!(matches!(app.rendered, Some(RenderedBody::Table(_))));
        assert_eq!(
            store.get(TABLE_PREFERENCE_KEY).unwrap().as_deref(),
            Some("true")
        );

        app.handle_key(key('r'));
        app.sync(Instant::now());
        assert_eq!(app.controller.active_view(), Some(ViewSelection::Raw));

        app.handle_key(key('r'));
        assert_eq!(app.controller.active_view(), Some(ViewSelection::Json));
    }

    #[tokio::test]
    async fn test_highlight_timeout_falls_back_to_raw() {
        let downloads = TempDir::new().unwrap();
        let mut config = Config::default();
        config.viewer.max_highlight_bytes = 4;
        let (mut app, _) = app_with(config, &downloads);

        app.load("<p>longer than four bytes</p>".into(), Some("text/html"), None);
        app.sync(Instant::now());

        assert_eq!(app.controller.active_view(), Some(ViewSelection::Raw));
        assert!(!app.controller.raw_view());
        assert_eq!(
            app.state.read().status_message.as_deref(),
            Some(HIGHLIGHT_TIMEOUT_NOTICE)
        );
    }

    #[tokio::test]
    async fn test_declined_export_opens_save_dialog() {
        let downloads = TempDir::new().unwrap();
        let (mut app, _) = app_with(Config::default(), &downloads);

        app.load("hello".into(), Some("text/plain"), None);
        app.sync(Instant::now());
        app.handle_key(key('s'));

        assert_eq!(app.state.read().mode, AppMode::SaveDownload);
        let link = app.controller.download().unwrap().path().to_path_buf();
        assert!(link.exists());

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.state.read().mode, AppMode::Normal);
        assert!(!link.exists());
    }

    #[tokio::test]
    async fn test_claimed_export_writes_into_export_dir() {
        let downloads = TempDir::new().unwrap();
        let exports = TempDir::new().unwrap();
        let mut config = Config::default();
        config.general.export_dir = Some(exports.path().to_path_buf());
        let (mut app, _) = app_with(config, &downloads);

        app.load("{}".into(), Some("application/json"), None);
        app.sync(Instant::now());
        app.handle_key(key('s'));

        assert_eq!(app.state.read().mode, AppMode::Normal);
        assert!(app.controller.download().is_none());
        assert_eq!(std::fs::read_dir(exports.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_preview_round_trip() {
        let downloads = TempDir::new().unwrap();
        let (mut app, _) = app_with(Config::default(), &downloads);

        app.load("<p>one</p><p>two</p>".into(), Some("text/html"), None);
        app.sync(Instant::now());
        app.handle_key(key('p'));
        assert!(app.controller.preview_open());

        settle().await;
        app.sync(Instant::now());
        assert!(app.state.read().preview_height > 0);
        assert_eq!(app.preview.content().lines, vec!["one", "two"]);

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        settle().await;
        app.sync(Instant::now());
        assert!(!app.controller.preview_open());
    }

    #[tokio::test]
    async fn test_preview_refused_for_json() {
        let downloads = TempDir::new().unwrap();
        let (mut app, _) = app_with(Config::default(), &downloads);

        app.load("{}".into(), Some("application/json"), None);
        app.sync(Instant::now());
        app.handle_key(key('p'));

        assert!(!app.controller.preview_open());
        assert!(app.state.read().status_message.is_some());
    }

    #[tokio::test]
    async fn test_scroll_is_clamped() {
        let downloads = TempDir::new().unwrap();
        let (mut app, _) = app_with(Config::default(), &downloads);

        app.load("a\nb\nc".into(), Some("text/plain"), None);
        app.sync(Instant::now());
        app.handle_key(key('r'));
        app.sync(Instant::now());

        app.handle_key(key('G'));
        assert_eq!(app.state.read().scroll, 2);
        app.handle_key(key('k'));
        app.handle_key(key('k'));
        app.handle_key(key('k'));
        assert_eq!(app.state.read().scroll, 0);
    }
}
