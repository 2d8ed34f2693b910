//! Preview popup widget

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::preview::PreviewContent;
use crate::tui::layout::Layouts;
use crate::tui::Theme;

/// Popup showing what the preview surface renders
pub struct PreviewPopup<'a> {
    content: &'a PreviewContent,
    /// Height the surface asked for
    height: u16,
    theme: &'a Theme,
}

impl<'a> PreviewPopup<'a> {
    pub fn new(content: &'a PreviewContent, height: u16, theme: &'a Theme) -> Self {
        Self {
            content,
            height,
            theme,
        }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let popup = Layouts::preview_popup(self.height, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .title(" Preview ")
            .title_bottom(" Esc close ");

        let text: Vec<Line> = if self.content.is_empty() {
            vec![Line::styled("Loading…", Style::default().fg(self.theme.muted))]
        } else {
            self.content
                .lines
                .iter()
                .map(|line| Line::from(line.as_str()))
                .collect()
        };

        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(self.theme.fg).bg(self.theme.bg))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }
}
