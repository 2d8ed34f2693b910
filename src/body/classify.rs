//! Content classification and view selection

/// Category of the response body derived from its content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentClassification {
    /// Nothing to show
    #[default]
    None,
    /// Text body shown through the syntax highlighter
    Parsed,
    Json,
    Xml,
}

impl ContentClassification {
    /// Classify a body.
    ///
    /// `xml` wins over `json` when a content type mentions both
    /// (e.g. `application/xml+json`). A content type that names neither is
    /// `Parsed` only when there is decoded text to highlight.
    pub fn classify(content_type: Option<&str>, decoded: Option<&str>) -> Self {
        let content_type = match content_type.map(str::trim) {
            Some(ct) if !ct.is_empty() => ct.to_ascii_lowercase(),
            _ => return ContentClassification::None,
        };

        if content_type.contains("xml") {
            ContentClassification::Xml
        } else if content_type.contains("json") {
            ContentClassification::Json
        } else if decoded.map(|d| !d.is_empty()).unwrap_or(false) {
            ContentClassification::Parsed
        } else {
            ContentClassification::None
        }
    }

    /// File extension used when exporting this kind of body
    pub fn file_extension(&self) -> &'static str {
        match self {
            ContentClassification::Json => "json",
            ContentClassification::Xml => "xml",
            _ => "txt",
        }
    }
}

/// The single active body view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSelection {
    Raw,
    Parsed,
    Json,
    Xml,
    JsonTable,
}

impl ViewSelection {
    pub fn name(&self) -> &'static str {
        match self {
            ViewSelection::Raw => "Raw",
            ViewSelection::Parsed => "Highlighted",
            ViewSelection::Json => "JSON",
            ViewSelection::Xml => "XML",
            ViewSelection::JsonTable => "Table",
        }
    }
}

/// Toggle state the selection depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewToggles {
    pub raw_view: bool,
    pub table_view: bool,
    /// Raw view forced by a highlighter timeout
    pub forced_raw: bool,
}

/// Pick the active view, highest priority first
pub fn select_view(
    classification: ContentClassification,
    toggles: ViewToggles,
) -> Option<ViewSelection> {
    if toggles.raw_view || toggles.forced_raw {
        return Some(ViewSelection::Raw);
    }

    match classification {
        ContentClassification::Json if toggles.table_view => Some(ViewSelection::JsonTable),
        ContentClassification::Json => Some(ViewSelection::Json),
        ContentClassification::Xml => Some(ViewSelection::Xml),
        ContentClassification::Parsed => Some(ViewSelection::Parsed),
        ContentClassification::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_content_type() {
        use ContentClassification as C;

        assert_eq!(C::classify(Some("application/xml"), Some("<a/>")), C::Xml);
        assert_eq!(C::classify(Some("text/xml; charset=utf-8"), None), C::Xml);
        assert_eq!(C::classify(Some("application/json"), Some("{}")), C::Json);
        assert_eq!(C::classify(Some("application/vnd.api+json"), Some("")), C::Json);
        assert_eq!(C::classify(Some("application/xml+json"), Some("{}")), C::Xml);
        assert_eq!(C::classify(Some("text/html"), Some("<p>hi</p>")), C::Parsed);
        assert_eq!(C::classify(Some("text/html"), Some("")), C::None);
        assert_eq!(C::classify(Some("text/plain"), None), C::None);
        assert_eq!(C::classify(None, Some("text")), C::None);
        assert_eq!(C::classify(Some("  "), Some("text")), C::None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(ContentClassification::Json.file_extension(), "json");
        assert_eq!(ContentClassification::Xml.file_extension(), "xml");
        assert_eq!(ContentClassification::Parsed.file_extension(), "txt");
        assert_eq!(ContentClassification::None.file_extension(), "txt");
    }

    #[test]
    fn test_raw_has_highest_priority() {
        let toggles = ViewToggles {
            raw_view: true,
            table_view: true,
            forced_raw: false,
        };
        assert_eq!(
            select_view(ContentClassification::Json, toggles),
            Some(ViewSelection::Raw)
        );

        let forced = ViewToggles {
            forced_raw: true,
            ..Default::default()
        };
        assert_eq!(
            select_view(ContentClassification::Parsed, forced),
            Some(ViewSelection::Raw)
        );
    }

    #[test]
    fn test_table_only_applies_to_json() {
        let toggles = ViewToggles {
            table_view: true,
            ..Default::default()
        };
        assert_eq!(
            select_view(ContentClassification::Json, toggles),
            Some(ViewSelection::JsonTable)
        );
        assert_eq!(
            select_view(ContentClassification::Xml, toggles),
            Some(ViewSelection::Xml)
        );
        assert_eq!(select_view(ContentClassification::None, toggles), None);
    }

    #[test]
    fn test_default_views() {
        let toggles = ViewToggles::default();
        assert_eq!(
            select_view(ContentClassification::Json, toggles),
            Some(ViewSelection::Json)
        );
        assert_eq!(
            select_view(ContentClassification::Parsed, toggles),
            Some(ViewSelection::Parsed)
        );
        assert_eq!(select_view(ContentClassification::None, toggles), None);
    }
}
