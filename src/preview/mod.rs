//! Response preview popup
//!
//! The preview surface runs as its own task and only talks to the viewer
//! through serialized [`PreviewMessage`]s and [`PreviewReply`]s, the same
//! way a detached window would.

mod html;
mod message;
mod surface;

pub use html::render_text;
pub use message::{PreviewMessage, PreviewReply};
pub use surface::{PreviewContent, PreviewSurface, SurfaceHandle, PREVIEW_CHROME_ROWS};

use tokio::sync::mpsc;

use crate::error::PreviewError;

/// Outgoing side of the preview channel as seen by the viewer
pub trait PreviewChannel: Send {
    fn send(&self, message: &PreviewMessage) -> Result<(), PreviewError>;
}

/// Viewer end of a preview channel
#[derive(Debug)]
pub struct PreviewHost {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

/// Surface end of a preview channel
#[derive(Debug)]
pub struct SurfacePort {
    rx: mpsc::UnboundedReceiver<String>,
    tx: mpsc::UnboundedSender<String>,
}

/// Create a connected host/surface pair
pub fn channel() -> (PreviewHost, SurfacePort) {
    let (host_tx, surface_rx) = mpsc::unbounded_channel();
    let (surface_tx, host_rx) = mpsc::unbounded_channel();
    (
        PreviewHost {
            tx: host_tx,
            rx: host_rx,
        },
        SurfacePort {
            rx: surface_rx,
            tx: surface_tx,
        },
    )
}

impl PreviewHost {
    /// Replies received so far. Malformed replies are dropped.
    pub fn drain_replies(&mut self) -> Vec<PreviewReply> {
        let mut replies = Vec::new();
        while let Ok(raw) = self.rx.try_recv() {
            match serde_json::from_str(&raw) {
                Ok(reply) => replies.push(reply),
                Err(e) => tracing::debug!("Ignoring preview reply {:?}: {}", raw, e),
            }
        }
        replies
    }

    /// Split off a sender the controller can own
    pub fn sender(&self) -> PreviewSender {
        PreviewSender {
            tx: self.tx.clone(),
        }
    }
}

/// Cloneable sending half of a [`PreviewHost`]
#[derive(Debug, Clone)]
pub struct PreviewSender {
    tx: mpsc::UnboundedSender<String>,
}

impl PreviewChannel for PreviewSender {
    fn send(&self, message: &PreviewMessage) -> Result<(), PreviewError> {
        let raw =
            serde_json::to_string(message).map_err(|e| PreviewError::Malformed(e.to_string()))?;
        self.tx.send(raw).map_err(|_| PreviewError::ChannelClosed)
    }
}

impl SurfacePort {
    async fn recv(&mut self) -> Option<Result<PreviewMessage, PreviewError>> {
        let raw = self.rx.recv().await?;
        Some(serde_json::from_str(&raw).map_err(|e| PreviewError::Malformed(e.to_string())))
    }

    fn reply(&self, reply: &PreviewReply) {
        let result = serde_json::to_string(reply)
            .map_err(|e| PreviewError::Malformed(e.to_string()))
            .and_then(|raw| self.tx.send(raw).map_err(|_| PreviewError::ChannelClosed));
        if let Err(e) = result {
            tracing::debug!("Preview reply dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_are_serialized_across_the_channel() {
        let (host, mut port) = channel();
        host.sender()
            .send(&PreviewMessage::raw_response("<p>hi</p>"))
            .unwrap();

        let received = port.recv().await.unwrap().unwrap();
        assert_eq!(received, PreviewMessage::raw_response("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_send_fails_once_surface_is_gone() {
        let (host, port) = channel();
        drop(port);
        let result = host.sender().send(&PreviewMessage::clean_up());
        assert!(matches!(result, Err(PreviewError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_malformed_replies_are_dropped() {
        let (mut host, port) = channel();
        port.tx.send("garbage".to_string()).unwrap();
        port.reply(&PreviewReply::Height { height: 7 });

        assert_eq!(host.drain_replies(), vec![PreviewReply::Height { height: 7 }]);
    }
}
