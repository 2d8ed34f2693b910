//! Dialog offering a declined export as a download

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::body::DownloadLink;
use crate::tui::layout::Layouts;
use crate::tui::Theme;

const DIALOG_WIDTH: u16 = 60;
const DIALOG_HEIGHT: u16 = 7;

pub struct SaveDialog<'a> {
    link: &'a DownloadLink,
    theme: &'a Theme,
}

impl<'a> SaveDialog<'a> {
    pub fn new(link: &'a DownloadLink, theme: &'a Theme) -> Self {
        Self { link, theme }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let popup = Layouts::centered_fixed(DIALOG_WIDTH, DIALOG_HEIGHT, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .title(" Save response ");

        let key = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(Span::styled(
                self.link.file_name().to_string(),
                Style::default().fg(self.theme.fg),
            )),
            Line::from(Span::styled(
                self.link.content_type().to_string(),
                Style::default().fg(self.theme.muted),
            )),
            Line::default(),
            Line::from(vec![
                Span::styled("[Enter/d]", key),
                Span::raw(" save to downloads   "),
                Span::styled("[Esc]", key),
                Span::raw(" discard"),
            ]),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}
