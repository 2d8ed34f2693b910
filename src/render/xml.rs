//! XML body view

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::tui::Theme;

const INDENT: usize = 2;

/// Re-indent an XML document
pub fn reformat(text: &str) -> Result<String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

    loop {
        match reader
            .read_event()
            .with_context(|| format!("Malformed XML at byte {}", reader.buffer_position()))?
        {
            Event::Eof => break,
            event => writer
                .write_event(event)
                .context("Failed to write XML event")?,
        }
    }

    String::from_utf8(writer.into_inner()).context("Reformatted XML is not UTF-8")
}

/// Indent and colorize an XML body. Malformed XML is shown unchanged.
pub fn render_xml(text: &str, theme: &Theme) -> Vec<Line<'static>> {
    let formatted = match reformat(text) {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::debug!("Keeping XML body as-is: {:#}", e);
            text.to_string()
        }
    };

    formatted
        .lines()
        .map(|line| colorize_line(line, theme))
        .collect()
}

fn colorize_line(line: &str, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix('<') {
            let end = body.find('>').map(|i| i + 2).unwrap_or(rest.len());
            let markup = &rest[..end];
            let style = if markup.starts_with("<!--") || markup.starts_with("<?") {
                Style::default().fg(theme.muted)
            } else {
                Style::default().fg(theme.accent)
            };
            spans.push(Span::styled(markup.to_string(), style));
            rest = &rest[end..];
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            spans.push(Span::styled(
                rest[..end].to_string(),
                Style::default().fg(theme.fg),
            ));
            rest = &rest[end..];
        }
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reformat_indents_nested_elements() {
        let formatted = reformat("<a><b>x</b><c/></a>").unwrap();
        let lines: Vec<&str> = formatted.lines().collect();

        assert_eq!(lines.first(), Some(&"<a>"));
        assert_eq!(lines.last(), Some(&"</a>"));
        assert!(lines.iter().any(|l| l.starts_with("  <b>")));
    }

    #[test]
    fn test_reformat_rejects_mismatched_tags() {
        assert!(reformat("<a><b></a>").is_err());
    }

    #[test]
    fn test_render_keeps_malformed_body() {
        let theme = Theme::default();
        let lines = render_xml("<a><b></a>", &theme);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_tags_and_text_are_split() {
        let theme = Theme::default();
        let line = colorize_line("<b>text</b>", &theme);
        let parts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["<b>", "text", "</b>"]);
        assert_eq!(line.spans[0].style.fg, Some(theme.accent));
    }
}
