//! Application event handling

use crossterm::event::{self, Event, KeyEvent};
use std::time::Duration;

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input
    Key(KeyEvent),

    /// Terminal resize
    Resize(u16, u16),

    /// Tick for timers and background updates
    Tick,
}

/// Handles terminal events and converts them to AppEvents
pub struct EventHandler {
    /// Tick rate for periodic updates
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Wait up to one tick for a terminal event
    pub async fn next(&mut self) -> Option<AppEvent> {
        let tick_rate = self.tick_rate;
        // crossterm polling blocks, keep it off the runtime threads
        tokio::task::spawn_blocking(move || {
            if event::poll(tick_rate).ok()? {
                match event::read().ok()? {
                    Event::Key(key) => Some(AppEvent::Key(key)),
                    Event::Resize(width, height) => Some(AppEvent::Resize(width, height)),
                    _ => Some(AppEvent::Tick),
                }
            } else {
                Some(AppEvent::Tick)
            }
        })
        .await
        .ok()
        .flatten()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}
