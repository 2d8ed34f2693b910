//! Response body widget

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::body::{CopyState, ViewSelection};
use crate::render::{JsonTable, RenderedBody};
use crate::tui::layout::Layouts;
use crate::tui::Theme;

/// Widest a table column is allowed to get
const MAX_COLUMN_WIDTH: usize = 40;

/// Toggle indicators shown in the actions bar
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyToggles {
    pub raw: bool,
    pub table: bool,
    pub preview: bool,
    pub wrap: bool,
    pub table_available: bool,
    pub preview_available: bool,
}

/// Response body widget
pub struct ResponseBody<'a> {
    body: Option<&'a RenderedBody>,
    view: Option<ViewSelection>,
    toggles: BodyToggles,
    copy_state: CopyState,
    can_copy: bool,
    line_numbers: bool,
    scroll: u16,
    theme: &'a Theme,
}

impl<'a> ResponseBody<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            body: None,
            view: None,
            toggles: BodyToggles::default(),
            copy_state: CopyState::Idle,
            can_copy: false,
            line_numbers: false,
            scroll: 0,
            theme,
        }
    }

    pub fn body(mut self, body: Option<&'a RenderedBody>, view: Option<ViewSelection>) -> Self {
        self.body = body;
        self.view = view;
        self
    }

    pub fn toggles(mut self, toggles: BodyToggles) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn copy_state(mut self, state: CopyState, can_copy: bool) -> Self {
        self.copy_state = state;
        self.can_copy = can_copy;
        self
    }

    pub fn line_numbers(mut self, on: bool) -> Self {
        self.line_numbers = on;
        self
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let title = match self.view {
            Some(view) => format!(" Response · {} ", view.name()),
            None => " Response ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layouts::body(inner);
        frame.render_widget(Paragraph::new(self.actions_line()), chunks[0]);

        match self.body {
            Some(RenderedBody::Lines(lines)) => self.render_lines(frame, chunks[1], lines),
            Some(RenderedBody::Table(table)) => self.render_table(frame, chunks[1], table),
            None => {
                let placeholder =
                    Paragraph::new("No body to show").style(Style::default().fg(self.theme.muted));
                frame.render_widget(placeholder, chunks[1]);
            }
        }
    }

    fn actions_line(&self) -> Line<'static> {
        let mut spans = vec![
            self.action("r", "raw", true, self.toggles.raw),
            self.action("t", "table", self.toggles.table_available, self.toggles.table),
            self.action("p", "preview", self.toggles.preview_available, self.toggles.preview),
            self.action("w", "wrap", true, self.toggles.wrap),
        ];

        let (label, color) = match self.copy_state {
            CopyState::Idle => ("[c] copy", if self.can_copy { self.theme.fg } else { self.theme.muted }),
            CopyState::Copied => ("[c] copied", self.theme.success),
            CopyState::Failed => ("[c] copy failed", self.theme.error),
        };
        spans.push(Span::styled(format!(" {} ", label), Style::default().fg(color)));
        spans.push(Span::styled(" [s] save ", Style::default().fg(self.theme.fg)));

        Line::from(spans)
    }

    fn action(&self, key: &str, name: &str, available: bool, active: bool) -> Span<'static> {
        let style = if !available {
            Style::default().fg(self.theme.muted)
        } else if active {
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.fg)
        };
        let marker = if active { "●" } else { "○" };
        Span::styled(format!(" [{}] {} {} ", key, name, marker), style)
    }

    fn render_lines(&self, frame: &mut Frame, area: Rect, lines: &[Line<'static>]) {
        let lines: Vec<Line> = if self.line_numbers {
            let width = lines.len().to_string().len();
            lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let mut spans = vec![Span::styled(
                        format!("{:>width$} ", i + 1, width = width),
                        Style::default().fg(self.theme.muted),
                    )];
                    spans.extend(line.spans.iter().cloned());
                    Line::from(spans)
                })
                .collect()
        } else {
            lines.to_vec()
        };

        let mut paragraph = Paragraph::new(lines).scroll((self.scroll, 0));
        if self.toggles.wrap {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }
        frame.render_widget(paragraph, area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, table: &JsonTable) {
        let widths: Vec<Constraint> = table
            .column_widths()
            .into_iter()
            .map(|w| Constraint::Length(w.clamp(1, MAX_COLUMN_WIDTH) as u16))
            .collect();

        let header = Row::new(table.columns.clone()).style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );
        let rows = table
            .rows
            .iter()
            .skip(self.scroll as usize)
            .map(|row| Row::new(row.clone()));

        let widget = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .style(Style::default().fg(self.theme.fg));
        frame.render_widget(widget, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(widget: impl FnOnce(&mut Frame)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 8)).unwrap();
        terminal.draw(widget).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_renders_title_and_lines() {
        let theme = Theme::default();
        let body = RenderedBody::Lines(vec![Line::from("first line")]);

        let screen = draw(|frame| {
            ResponseBody::new(&theme)
                .body(Some(&body), Some(ViewSelection::Raw))
                .render(frame, frame.area())
        });

        assert!(screen.contains("Response · Raw"));
        assert!(screen.contains("first line"));
        assert!(screen.contains("[r] raw"));
    }

    #[test]
    fn test_renders_table_header() {
        let theme = Theme::default();
        let body = RenderedBody::Table(JsonTable {
            columns: vec!["id".into(), "name".into()],
            rows: vec![vec!["1".into(), "alpha".into()]],
        });

        let screen = draw(|frame| {
            ResponseBody::new(&theme)
                .body(Some(&body), Some(ViewSelection::JsonTable))
                .render(frame, frame.area())
        });

        assert!(screen.contains("name"));
        assert!(screen.contains("alpha"));
    }

    #[test]
    fn test_placeholder_without_body() {
        let theme = Theme::default();
        let screen = draw(|frame| ResponseBody::new(&theme).render(frame, frame.area()));
        assert!(screen.contains("No body to show"));
    }
}
