//! Terminal User Interface module
//!
//! Handles all TUI rendering and layout using Ratatui.

mod layout;
mod terminal;
mod theme;
pub mod widgets;

pub use layout::preview_width;
pub use terminal::{Tui, MIN_HEIGHT, MIN_WIDTH};
pub use theme::Theme;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppMode};
use layout::Layouts;
use widgets::{BodyToggles, PreviewPopup, ResponseBody, SaveDialog};

/// Main UI rendering
pub fn render(frame: &mut Frame, app: &App) {
    let state = app.state.read();
    let theme = &app.theme;

    // Check terminal size
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        render_size_warning(frame, area, theme);
        return;
    }

    let chunks = Layouts::main(area);
    render_header(frame, chunks[0], app, theme);

    let controller = &app.controller;
    let view = controller.active_view();
    ResponseBody::new(theme)
        .body(app.rendered.as_ref(), view)
        .toggles(BodyToggles {
            raw: controller.raw_view(),
            table: controller.table_view(),
            preview: controller.preview_open(),
            wrap: state.wrap,
            table_available: controller.is_json(),
            preview_available: controller.can_preview(),
        })
        .copy_state(state.copy_state, controller.has_data())
        .line_numbers(app.config.tui.show_line_numbers)
        .scroll(state.scroll)
        .render(frame, chunks[1]);

    render_status_bar(frame, chunks[2], state.status_message.as_deref(), theme);

    // Modal layers
    if controller.preview_open() {
        let content = app.preview.content();
        PreviewPopup::new(&content, state.preview_height, theme).render(frame, chunks[1]);
    }
    if state.mode == AppMode::SaveDownload {
        if let Some(link) = controller.download() {
            SaveDialog::new(link, theme).render(frame, area);
        }
    }
}

fn render_size_warning(frame: &mut Frame, area: Rect, theme: &Theme) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum required: {}x{}",
        area.width, area.height, MIN_WIDTH, MIN_HEIGHT
    );
    let warning = Paragraph::new(msg)
        .style(Style::default().fg(theme.error))
        .block(Block::default().borders(Borders::ALL).title(" Warning "));
    frame.render_widget(warning, area);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let controller = &app.controller;
    let content_type = if controller.payload().is_set() {
        controller.content_type().unwrap_or("no content type")
    } else {
        "no body loaded"
    };
    let size = controller.decoded_text().map(str::len).unwrap_or(0);

    let mut spans = vec![
        Span::styled(
            " respview ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(content_type.to_string(), Style::default().fg(theme.fg)),
        Span::styled(format!(" • {}", format_size(size)), Style::default().fg(theme.muted)),
    ];
    if let Some(charset) = controller.charset() {
        spans.push(Span::styled(
            format!(" • {}", charset),
            Style::default().fg(theme.muted),
        ));
    }
    if controller.has_pending() {
        spans.push(Span::styled(" • loading", Style::default().fg(theme.warning)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, message: Option<&str>, theme: &Theme) {
    let line = match message {
        Some(message) => Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(theme.info),
        )),
        None => Line::from(Span::styled(
            " r raw · t table · p preview · w wrap · c copy · s save · j/k scroll · q quit",
            Style::default().fg(theme.muted),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
