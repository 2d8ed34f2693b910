//! Markup to terminal text

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template", "noscript", "head"];

/// Render the body of a markup document as plain lines
pub fn render_text(markup: &str) -> Vec<String> {
    let document = Html::parse_document(markup);
    let mut out = TextBuilder::default();

    match Selector::parse("body") {
        Ok(selector) => {
            if let Some(body) = document.select(&selector).next() {
                walk(body, &mut out, false);
            }
        }
        Err(e) => tracing::debug!("Invalid body selector: {:?}", e),
    }

    out.finish()
}

fn walk(element: ElementRef<'_>, out: &mut TextBuilder, in_pre: bool) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_text(text, in_pre),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };

                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.break_line();
                }
                if name == "li" {
                    out.push_text("• ", true);
                }
                walk(child_ref, out, in_pre || name == "pre");
                if block {
                    out.break_line();
                }
            }
            _ => {}
        }
    }
}

#[derive(Default)]
struct TextBuilder {
    lines: Vec<String>,
    current: String,
}

impl TextBuilder {
    fn push_text(&mut self, text: &str, preserve: bool) {
        if preserve {
            let mut parts = text.split('\n');
            if let Some(first) = parts.next() {
                self.current.push_str(first);
            }
            for part in parts {
                self.lines.push(std::mem::take(&mut self.current));
                self.current.push_str(part);
            }
            return;
        }

        for word in text.split_whitespace() {
            if !self.current.is_empty() && !self.current.ends_with(' ') {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
        if text.ends_with(char::is_whitespace) && !self.current.is_empty() {
            self.current.push(' ');
        }
    }

    fn break_line(&mut self) {
        if !self.current.trim().is_empty() {
            let line = self.current.trim_end().to_string();
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.break_line();
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_become_lines() {
        let lines = render_text("<h1>Title</h1><p>First  paragraph</p><p>Second</p>");
        assert_eq!(lines, vec!["Title", "First paragraph", "Second"]);
    }

    #[test]
    fn test_scripts_and_styles_are_skipped() {
        let lines = render_text(
            "<html><head><title>t</title><style>p{}</style></head>\
             <body><script>alert(1)</script><p>Visible</p></body></html>",
        );
        assert_eq!(lines, vec!["Visible"]);
    }

    #[test]
    fn test_inline_elements_join() {
        let lines = render_text("<p>Hello <b>bold</b> world</p>");
        assert_eq!(lines, vec!["Hello bold world"]);
    }

    #[test]
    fn test_lists_get_bullets() {
        let lines = render_text("<ul><li>one</li><li>two</li></ul>");
        assert_eq!(lines, vec!["• one", "• two"]);
    }

    #[test]
    fn test_pre_keeps_line_breaks() {
        let lines = render_text("<pre>a\n  b</pre>");
        assert_eq!(lines, vec!["a", "  b"]);
    }

    #[test]
    fn test_plain_text_body() {
        assert_eq!(render_text("just text"), vec!["just text"]);
        assert!(render_text("").is_empty());
    }
}
