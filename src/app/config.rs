//! Application configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Body viewer behavior
    pub viewer: ViewerConfig,

    /// TUI settings
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory that claims exports directly (unset: offer a download instead)
    pub export_dir: Option<PathBuf>,

    /// Preference file (defaults to the user data directory)
    pub preference_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Charset used when the response does not name one
    pub default_charset: String,

    /// Window for coalescing content updates (0 = next tick)
    pub coalesce_window_ms: u64,

    /// Time allowed for syntax highlighting before falling back to raw
    pub highlight_budget_ms: u64,

    /// Bodies larger than this are never highlighted
    pub max_highlight_bytes: usize,

    /// How long copy feedback stays visible
    pub copy_feedback_ms: u64,

    /// Delay before the preview reports its height
    pub preview_settle_ms: u64,

    /// Wrap long lines in the raw view
    pub wrap_raw: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Color theme ("dark" or "light")
    pub theme: String,

    /// Show line numbers in the body view
    pub show_line_numbers: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_charset: crate::body::DEFAULT_CHARSET.to_string(),
            coalesce_window_ms: 0,
            highlight_budget_ms: 500,
            max_highlight_bytes: 2 * 1024 * 1024, // 2MB
            copy_feedback_ms: 1000,
            preview_settle_ms: 10,
            wrap_raw: false,
        }
    }
}

impl ViewerConfig {
    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }

    pub fn highlight_budget(&self) -> Duration {
        Duration::from_millis(self.highlight_budget_ms)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }

    pub fn preview_settle(&self) -> Duration {
        Duration::from_millis(self.preview_settle_ms)
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            show_line_numbers: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// A missing file at the default location means defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                let p = PathBuf::from(p);
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.display().to_string()).into());
                }
                p
            }
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;

        let config: Config =
            toml::from_str(&contents).with_context(|| "Failed to parse configuration file")?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    /// Check values the viewer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if encoding_rs::Encoding::for_label(self.viewer.default_charset.as_bytes()).is_none() {
            return Err(ConfigError::ValidationError {
                field: "viewer.default_charset".to_string(),
                reason: format!("unknown charset '{}'", self.viewer.default_charset),
            });
        }

        if self.viewer.highlight_budget_ms == 0 {
            return Err(ConfigError::ValidationError {
                field: "viewer.highlight_budget_ms".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.viewer.max_highlight_bytes == 0 {
            return Err(ConfigError::ValidationError {
                field: "viewer.max_highlight_bytes".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if crate::tui::Theme::named(&self.tui.theme).is_none() {
            return Err(ConfigError::ValidationError {
                field: "tui.theme".to_string(),
                reason: format!("unknown theme '{}' (expected dark or light)", self.tui.theme),
            });
        }

        if let Some(dir) = &self.general.export_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::ValidationError {
                    field: "general.export_dir".to_string(),
                    reason: format!("{} is not a directory", dir.display()),
                });
            }
        }

        Ok(())
    }

    /// Get default configuration file path
    fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "respview", "respview")
            .context("Failed to determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "respview", "respview")
            .context("Failed to determine data directory")?;

        Ok(dirs.data_dir().to_path_buf())
    }
}
