//! Theme and color definitions

use ratatui::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary foreground color
    pub fg: Color,

    /// Primary background color
    pub bg: Color,

    /// Accent color for highlights and object keys
    pub accent: Color,

    /// Secondary accent
    pub accent_secondary: Color,

    /// Border color
    pub border: Color,

    /// Muted text color
    pub muted: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            fg: Color::Rgb(220, 220, 220),
            bg: Color::Rgb(30, 30, 30),
            accent: Color::Rgb(86, 156, 214),
            accent_secondary: Color::Rgb(180, 140, 220),
            border: Color::Rgb(80, 80, 80),
            muted: Color::Rgb(128, 128, 128),
            success: Color::Rgb(78, 201, 176),
            warning: Color::Rgb(220, 180, 50),
            error: Color::Rgb(244, 71, 71),
            info: Color::Rgb(86, 156, 214),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            fg: Color::Rgb(30, 30, 30),
            bg: Color::Rgb(250, 250, 250),
            accent: Color::Rgb(0, 102, 204),
            accent_secondary: Color::Rgb(120, 60, 170),
            border: Color::Rgb(200, 200, 200),
            muted: Color::Rgb(100, 100, 100),
            success: Color::Rgb(0, 128, 96),
            warning: Color::Rgb(200, 140, 0),
            error: Color::Rgb(200, 0, 0),
            info: Color::Rgb(0, 102, 204),
        }
    }

    /// Look up a theme by its config name
    pub fn named(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_themes() {
        assert_eq!(Theme::named("Light").map(|t| t.bg), Some(Theme::light().bg));
        assert_eq!(Theme::named("dark").map(|t| t.bg), Some(Theme::dark().bg));
        assert!(Theme::named("solarized").is_none());
    }
}
