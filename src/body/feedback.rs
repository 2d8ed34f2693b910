//! Clipboard access and transient action feedback

use std::time::{Duration, Instant};

/// Default time a copy result stays visible
pub const COPY_FEEDBACK_DURATION: Duration = Duration::from_millis(1000);

/// Clipboard collaborator
pub trait Clipboard {
    /// Copy text, returning whether it worked
    fn copy(&mut self, text: &str) -> bool;
}

/// System clipboard via arboard
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> bool {
        if self.inner.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.inner = Some(clipboard),
                Err(e) => {
                    tracing::warn!("Failed to access clipboard: {}", e);
                    return false;
                }
            }
        }

        let Some(clipboard) = self.inner.as_mut() else {
            return false;
        };
        match clipboard.set_text(text) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to copy to clipboard: {}", e);
                false
            }
        }
    }
}

/// State of the copy button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
    Failed,
}

/// Copy result that reverts to [`CopyState::Idle`] after a fixed duration
#[derive(Debug, Clone)]
pub struct CopyFeedback {
    state: CopyState,
    until: Option<Instant>,
    duration: Duration,
}

impl CopyFeedback {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: CopyState::Idle,
            until: None,
            duration,
        }
    }

    pub fn record(&mut self, success: bool, now: Instant) {
        self.state = if success {
            CopyState::Copied
        } else {
            CopyState::Failed
        };
        self.until = Some(now + self.duration);
    }

    /// Current state, expiring the feedback once its time is up
    pub fn state(&mut self, now: Instant) -> CopyState {
        if let Some(until) = self.until {
            if now >= until {
                self.state = CopyState::Idle;
                self.until = None;
            }
        }
        self.state
    }
}

impl Default for CopyFeedback {
    fn default() -> Self {
        Self::new(COPY_FEEDBACK_DURATION)
    }
}
