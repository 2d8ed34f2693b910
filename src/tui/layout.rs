//! Layout utilities for the TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Share of the screen width given to the preview popup
pub const PREVIEW_WIDTH_PERCENT: u16 = 80;

/// Layout presets for the viewer screen
pub struct Layouts;

impl Layouts {
    /// Header, body, status bar
    pub fn main(area: Rect) -> Vec<Rect> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(3),    // Body
                Constraint::Length(1), // Status bar
            ])
            .split(area)
            .to_vec()
    }

    /// Actions bar above the body content
    pub fn body(area: Rect) -> Vec<Rect> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area)
            .to_vec()
    }

    /// Popup of a fixed size centered in `area`, clamped to fit
    pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }

    /// Popup for the preview: a share of the width, as tall as the surface
    /// asks for
    pub fn preview_popup(requested_height: u16, area: Rect) -> Rect {
        Self::centered_fixed(preview_width(area.width), requested_height.max(3), area)
    }
}

/// Width the preview surface is laid out at for a given screen width
pub fn preview_width(screen_width: u16) -> u16 {
    (screen_width as u32 * PREVIEW_WIDTH_PERCENT as u32 / 100) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = Layouts::centered_fixed(40, 4, area);
        assert_eq!(popup, Rect::new(0, 3, 20, 4));
    }

    #[test]
    fn test_preview_popup_uses_requested_height() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = Layouts::preview_popup(12, area);
        assert_eq!(popup.width, 80);
        assert_eq!(popup.height, 12);
        assert_eq!(popup.x, 10);
    }
}
