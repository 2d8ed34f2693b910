//! Body renderers
//!
//! Turn decoded body text into drawable lines for whichever view is active.

mod highlight;
mod json;
mod table;
mod xml;

pub use highlight::{HighlightTimeout, Highlighter, SyntectHighlighter};
pub use table::JsonTable;

use highlight::plain_lines;
use json::render_json;
use xml::render_xml;

use ratatui::text::Line;

use crate::body::ViewSelection;
use crate::tui::Theme;

/// A body ready to be drawn
#[derive(Debug, Clone)]
pub enum RenderedBody {
    Lines(Vec<Line<'static>>),
    Table(JsonTable),
}

impl RenderedBody {
    /// Rows the body takes before wrapping
    pub fn row_count(&self) -> usize {
        match self {
            Self::Lines(lines) => lines.len(),
            Self::Table(table) => table.rows.len() + 1,
        }
    }

    /// The body without styling, tables as tab-separated rows
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Lines(lines) => lines
                .iter()
                .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Table(table) => std::iter::once(table.columns.join("\t"))
                .chain(table.rows.iter().map(|row| row.join("\t")))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Render `text` for `view`. Only the highlighted view can time out.
pub fn render_view(
    view: ViewSelection,
    text: &str,
    content_type: Option<&str>,
    theme: &Theme,
    highlighter: &dyn Highlighter,
) -> Result<RenderedBody, HighlightTimeout> {
    let body = match view {
        ViewSelection::Raw => RenderedBody::Lines(plain_lines(text)),
        ViewSelection::Parsed => RenderedBody::Lines(highlighter.highlight(text, content_type)?),
        ViewSelection::Json => RenderedBody::Lines(render_json(text, theme)),
        ViewSelection::Xml => RenderedBody::Lines(render_xml(text, theme)),
        ViewSelection::JsonTable => match JsonTable::from_text(text) {
            Some(table) => RenderedBody::Table(table),
            None => RenderedBody::Lines(render_json(text, theme)),
        },
    };
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysTimesOut;

    impl Highlighter for AlwaysTimesOut {
        fn highlight(
            &self,
            _text: &str,
            _content_type: Option<&str>,
        ) -> Result<Vec<Line<'static>>, HighlightTimeout> {
            Err(HighlightTimeout)
        }
    }

    #[test]
    fn test_only_parsed_view_times_out() {
        let theme = Theme::default();
        let text = "{\"a\":1}";

        assert!(render_view(ViewSelection::Parsed, text, None, &theme, &AlwaysTimesOut).is_err());
        for view in [ViewSelection::Raw, ViewSelection::Json, ViewSelection::Xml] {
            assert!(render_view(view, text, None, &theme, &AlwaysTimesOut).is_ok());
        }
    }

    #[test]
    fn test_table_view_builds_table() {
        let theme = Theme::default();
        let body = render_view(
            ViewSelection::JsonTable,
            "[{\"a\":1},{\"a\":2}]",
            Some("application/json"),
            &theme,
            &AlwaysTimesOut,
        )
        .unwrap();

        assert_eq!(body.to_plain_text(), "a\n1\n2");
        match body {
            RenderedBody::Table(table) => assert_eq!(table.rows.len(), 2),
            other => panic!("expected a table, got {:?}", other),
        }
    }

    #[test]
    fn test_table_view_falls_back_to_lines() {
        let theme = Theme::default();
        let body = render_view(
            ViewSelection::JsonTable,
            "not json",
            None,
            &theme,
            &AlwaysTimesOut,
        )
        .unwrap();
        assert!(matches!(body, RenderedBody::Lines(_)));
    }
}
