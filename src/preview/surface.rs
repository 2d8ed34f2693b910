//! Detached preview surface

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::{render_text, PreviewMessage, PreviewReply, SurfacePort};

/// Rows taken by the popup border
pub const PREVIEW_CHROME_ROWS: u16 = 2;

/// What the surface currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewContent {
    pub lines: Vec<String>,
}

impl PreviewContent {
    /// Rows needed to show every line at `width` columns, border included
    pub fn height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(2).max(1) as usize;
        let rows: usize = self
            .lines
            .iter()
            .map(|line| line.chars().count().max(1).div_ceil(inner))
            .sum();
        u16::try_from(rows)
            .unwrap_or(u16::MAX)
            .saturating_add(PREVIEW_CHROME_ROWS)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug)]
enum SurfaceControl {
    Resize(u16),
    Close,
}

/// Control handle kept by whoever draws the surface
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    content: Arc<RwLock<PreviewContent>>,
    control: mpsc::UnboundedSender<SurfaceControl>,
}

impl SurfaceHandle {
    pub fn content(&self) -> PreviewContent {
        self.content.read().clone()
    }

    /// The viewport changed size
    pub fn resize(&self, width: u16) {
        let _ = self.control.send(SurfaceControl::Resize(width));
    }

    /// The user closed the popup from inside
    pub fn close(&self) {
        let _ = self.control.send(SurfaceControl::Close);
    }
}

pub struct PreviewSurface {
    port: SurfacePort,
    content: Arc<RwLock<PreviewContent>>,
    control: mpsc::UnboundedReceiver<SurfaceControl>,
    width: u16,
    settle: Duration,
}

impl PreviewSurface {
    /// Start the surface task. It ends when the host end is dropped.
    pub fn spawn(port: SurfacePort, width: u16, settle: Duration) -> SurfaceHandle {
        let content = Arc::new(RwLock::new(PreviewContent::default()));
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let surface = Self {
            port,
            content: content.clone(),
            control: control_rx,
            width,
            settle,
        };
        tokio::spawn(surface.run());

        SurfaceHandle {
            content,
            control: control_tx,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                message = self.port.recv() => match message {
                    Some(Ok(message)) => self.handle_message(message).await,
                    Some(Err(e)) => tracing::debug!("Preview surface ignored message: {}", e),
                    None => break,
                },
                control = self.control.recv() => match control {
                    Some(SurfaceControl::Resize(width)) => {
                        self.width = width;
                        self.notify_height();
                    }
                    Some(SurfaceControl::Close) => {
                        self.port.reply(&PreviewReply::Close { close: true });
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("Preview surface stopped");
    }

    async fn handle_message(&mut self, message: PreviewMessage) {
        match message {
            PreviewMessage::RawResponse { raw_response } if !raw_response.is_empty() => {
                self.content.write().lines = render_text(&raw_response);
                // Let the new content settle before measuring it
                tokio::time::sleep(self.settle).await;
                self.notify_height();
            }
            PreviewMessage::CleanUp { clean_up: true } => {
                self.content.write().lines.clear();
            }
            _ => {}
        }
    }

    fn notify_height(&self) {
        let height = self.content.read().height(self.width);
        self.port.reply(&PreviewReply::Height { height });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{channel, PreviewChannel};

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[test]
    fn test_height_counts_wrapped_rows() {
        let content = PreviewContent {
            lines: vec!["x".repeat(10), String::new(), "short".into()],
        };
        // inner width 4: 3 rows + 1 + 2, plus the border
        assert_eq!(content.height(6), 8);
        assert_eq!(PreviewContent::default().height(80), PREVIEW_CHROME_ROWS);
    }

    #[test]
    fn test_height_saturates_for_long_content() {
        let content = PreviewContent {
            lines: vec!["x".to_string(); 65_536],
        };
        assert_eq!(content.height(80), u16::MAX);

        let content = PreviewContent {
            lines: vec!["x".to_string(); usize::from(u16::MAX - PREVIEW_CHROME_ROWS)],
        };
        assert_eq!(content.height(80), u16::MAX);
    }

    #[tokio::test]
    async fn test_raw_response_reports_height() {
        let (mut host, port) = channel();
        let handle = PreviewSurface::spawn(port, 40, Duration::from_millis(2));

        host.sender()
            .send(&PreviewMessage::raw_response("<p>one</p><p>two</p>"))
            .unwrap();
        settle().await;

        assert_eq!(handle.content().lines, vec!["one", "two"]);
        assert_eq!(host.drain_replies(), vec![PreviewReply::Height { height: 4 }]);
    }

    #[tokio::test]
    async fn test_clean_up_clears_content() {
        let (host, port) = channel();
        let handle = PreviewSurface::spawn(port, 40, Duration::ZERO);
        let sender = host.sender();

        sender.send(&PreviewMessage::raw_response("<p>one</p>")).unwrap();
        sender.send(&PreviewMessage::clean_up()).unwrap();
        settle().await;

        assert!(handle.content().is_empty());
    }

    #[tokio::test]
    async fn test_resize_reports_height() {
        let (mut host, port) = channel();
        let handle = PreviewSurface::spawn(port, 40, Duration::ZERO);

        handle.resize(20);
        settle().await;

        assert_eq!(
            host.drain_replies(),
            vec![PreviewReply::Height {
                height: PREVIEW_CHROME_ROWS
            }]
        );
    }

    #[tokio::test]
    async fn test_close_is_reported_to_host() {
        let (mut host, port) = channel();
        let handle = PreviewSurface::spawn(port, 40, Duration::ZERO);

        handle.close();
        settle().await;

        assert_eq!(host.drain_replies(), vec![PreviewReply::Close { close: true }]);
    }
}
