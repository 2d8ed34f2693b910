//! JSON body view

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::Theme;

/// Pretty-print and colorize a JSON body. Invalid JSON is shown unchanged.
pub fn render_json(text: &str, theme: &Theme) -> Vec<Line<'static>> {
    let pretty = match jsonxf::pretty_print(text) {
        Ok(pretty) => pretty,
        Err(e) => {
            tracing::debug!("Body is not valid JSON: {}", e);
            text.to_string()
        }
    };

    pretty.lines().map(|line| colorize_line(line, theme)).collect()
}

/// Split one pretty-printed line into styled tokens
fn colorize_line(line: &str, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let start = i;
                i += 1;
                while i < chars.len() {
                    match chars[i] {
                        '\\' => i += 2,
                        '"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                let end = i.min(chars.len());
                let token: String = chars[start..end].iter().collect();

                // A string followed by a colon is an object key
                let is_key = chars[end..].iter().find(|c| !c.is_whitespace()) == Some(&':');
                let style = if is_key {
                    Style::default().fg(theme.accent)
                } else {
                    Style::default().fg(theme.success)
                };
                spans.push(Span::styled(token, style));
            }
            '-' | '0'..='9' => {
                let start = i;
                while i < chars.len()
                    && matches!(chars[i], '-' | '+' | '.' | 'e' | 'E' | '0'..='9')
                {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                spans.push(Span::styled(token, Style::default().fg(theme.warning)));
            }
            't' | 'f' | 'n' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                spans.push(Span::styled(
                    token,
                    Style::default()
                        .fg(theme.accent_secondary)
                        .add_modifier(Modifier::ITALIC),
                ));
            }
            '{' | '}' | '[' | ']' | ',' | ':' => {
                spans.push(Span::styled(c.to_string(), Style::default().fg(theme.muted)));
                i += 1;
            }
            _ => {
                let start = i;
                while i < chars.len() && !matches!(chars[i], '"' | '{' | '}' | '[' | ']' | ',' | ':')
                {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                spans.push(Span::raw(token));
            }
        }
    }

    Line::from(spans)
}
