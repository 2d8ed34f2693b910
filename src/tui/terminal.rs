//! Terminal setup and teardown

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

use crate::app::App;
use crate::error::{TuiError, ViewerError};

/// Minimum terminal width
pub const MIN_WIDTH: u16 = 60;
/// Minimum terminal height
pub const MIN_HEIGHT: u16 = 16;

/// Full-screen terminal owned by the viewer while it runs
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

/// Size check against [`MIN_WIDTH`] x [`MIN_HEIGHT`]
fn ensure_fits(width: u16, height: u16) -> Result<(), TuiError> {
    if width >= MIN_WIDTH && height >= MIN_HEIGHT {
        return Ok(());
    }
    Err(TuiError::TerminalTooSmall {
        width,
        height,
        min_width: MIN_WIDTH,
        min_height: MIN_HEIGHT,
    })
}

/// Leave raw mode and the alternate screen
fn restore_screen() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

impl Tui {
    pub fn new() -> Result<Self, ViewerError> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .map_err(|e| TuiError::InitError(e.to_string()))?;
        Ok(Self { terminal })
    }

    /// Switch to the alternate screen. Refuses terminals that are too small.
    pub fn enter(&mut self) -> Result<(), ViewerError> {
        let (width, height) = self.size()?;
        ensure_fits(width, height)?;

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        restore_screen()?;
        Ok(())
    }

    pub fn draw(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|frame| super::render(frame, app))?;
        Ok(())
    }

    /// Width and height in cells
    pub fn size(&self) -> io::Result<(u16, u16)> {
        let area = self.terminal.size()?;
        Ok((area.width, area.height))
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = restore_screen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserHint;

    #[test]
    fn test_size_check() {
        assert!(ensure_fits(MIN_WIDTH, MIN_HEIGHT).is_ok());
        assert!(ensure_fits(200, 60).is_ok());
        assert!(ensure_fits(MIN_WIDTH - 1, MIN_HEIGHT).is_err());
        assert!(ensure_fits(MIN_WIDTH, MIN_HEIGHT - 1).is_err());
    }

    #[test]
    fn test_too_small_hint_names_minimum() {
        let err = ensure_fits(40, 10).unwrap_err();
        assert!(err.user_hint().contains("60x16"));
    }
}
