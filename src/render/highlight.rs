//! Syntax highlighting for text bodies

use std::time::{Duration, Instant};

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const THEME_NAME: &str = "base16-ocean.dark";

/// The highlighter ran out of its time or size budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightTimeout;

/// Highlighting collaborator of the body viewer
pub trait Highlighter {
    fn highlight(
        &self,
        text: &str,
        content_type: Option<&str>,
    ) -> Result<Vec<Line<'static>>, HighlightTimeout>;
}

pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
    budget: Duration,
    max_bytes: usize,
}

impl SyntectHighlighter {
    pub fn new(budget: Duration, max_bytes: usize) -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
            budget,
            max_bytes,
        }
    }

    fn syntax_for(&self, content_type: Option<&str>) -> &SyntaxReference {
        content_type
            .and_then(extension_for_content_type)
            .and_then(|ext| self.syntaxes.find_syntax_by_extension(ext))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }
}

/// Map a media type onto a syntax extension syntect knows
fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let ext = match essence.as_str() {
        "text/html" | "application/xhtml+xml" => "html",
        "text/css" => "css",
        "text/javascript" | "application/javascript" | "application/x-javascript" => "js",
        "text/markdown" => "md",
        "text/x-python" | "application/x-python" => "py",
        "application/x-sh" | "text/x-shellscript" => "sh",
        "application/sql" => "sql",
        "application/yaml" | "application/x-yaml" | "text/yaml" => "yaml",
        "application/toml" => "toml",
        _ if essence.contains("json") => "json",
        _ if essence.contains("xml") => "xml",
        _ => return None,
    };
    Some(ext)
}

impl Highlighter for SyntectHighlighter {
    fn highlight(
        &self,
        text: &str,
        content_type: Option<&str>,
    ) -> Result<Vec<Line<'static>>, HighlightTimeout> {
        if text.len() > self.max_bytes {
            tracing::debug!(size = text.len(), max = self.max_bytes, "Body too large to highlight");
            return Err(HighlightTimeout);
        }

        let Some(theme) = self
            .themes
            .themes
            .get(THEME_NAME)
            .or_else(|| self.themes.themes.values().next())
        else {
            return Ok(plain_lines(text));
        };

        let started = Instant::now();
        let mut highlighter = HighlightLines::new(self.syntax_for(content_type), theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(text) {
            if started.elapsed() > self.budget {
                tracing::debug!(elapsed = ?started.elapsed(), "Highlight budget exceeded");
                return Err(HighlightTimeout);
            }

            let spans = match highlighter.highlight_line(line, &self.syntaxes) {
                Ok(regions) => regions
                    .into_iter()
                    .filter_map(|(style, piece)| {
                        let piece = piece.trim_end_matches(['\n', '\r']).replace('\t', "    ");
                        if piece.is_empty() {
                            return None;
                        }
                        let fg = style.foreground;
                        Some(Span::styled(piece, Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b))))
                    })
                    .collect(),
                Err(e) => {
                    tracing::debug!("Highlighting failed for a line: {}", e);
                    vec![Span::raw(line.trim_end_matches(['\n', '\r']).to_string())]
                }
            };
            lines.push(Line::from(spans));
        }

        Ok(lines)
    }
}

/// Unstyled lines
pub fn plain_lines(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::from(line.replace('\t', "    ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for_content_type("text/html; charset=utf-8"), Some("html"));
        assert_eq!(extension_for_content_type("application/javascript"), Some("js"));
        assert_eq!(extension_for_content_type("application/problem+json"), Some("json"));
        assert_eq!(extension_for_content_type("image/svg+xml"), Some("xml"));
        assert_eq!(extension_for_content_type("text/plain"), None);
    }

    #[test]
    fn test_highlight_keeps_text() {
        let highlighter = SyntectHighlighter::new(Duration::from_secs(5), 1024 * 1024);
        let lines = highlighter
            .highlight("<p>\n\thello\n</p>\n", Some("text/html"))
            .unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[0]), "<p>");
        assert_eq!(line_text(&lines[1]), "    hello");
    }

    #[test]
    fn test_oversized_body_times_out() {
        let highlighter = SyntectHighlighter::new(Duration::from_secs(5), 4);
        assert_eq!(
            highlighter.highlight("too long", Some("text/plain")),
            Err(HighlightTimeout)
        );
    }

    #[test]
    fn test_plain_lines() {
        let lines = plain_lines("a\n\tb");
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[1]), "    b");
    }
}
