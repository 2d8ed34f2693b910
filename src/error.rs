//! Custom error types for respview
//!
//! Provides structured error handling with context propagation
//! and user-friendly error messages.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for respview operations
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Payload loading errors
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Preference store errors
    #[error("Preference error: {0}")]
    Preference(#[from] PreferenceError),

    /// Preview channel errors
    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),

    /// TUI errors
    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Configuration file not found: {0}")]
    NotFound(String),
}

/// Payload loading errors
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Failed to read payload from {path}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid wrapped payload: {0}")]
    InvalidWrapped(String),
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export")]
    NothingToExport,

    #[error("No download directory available")]
    NoDestination,

    #[error("Failed to write {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Preference store errors
#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read preferences from {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences: {0}")]
    ParseError(String),

    #[error("Failed to write preferences to {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Preview channel errors
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Preview surface is gone")]
    ChannelClosed,

    #[error("Malformed preview message: {0}")]
    Malformed(String),
}

/// TUI errors
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Terminal initialization failed: {0}")]
    InitError(String),

    #[error("Terminal size too small: {width}x{height} (minimum: {min_width}x{min_height})")]
    TerminalTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },
}

impl ViewerError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::Config(e) => format!("Configuration problem: {}", e.user_hint()),
            ViewerError::Payload(e) => format!("Payload issue: {}", e.user_hint()),
            ViewerError::Export(e) => format!("Export issue: {}", e.user_hint()),
            ViewerError::Preference(e) => format!("Preference issue: {}", e.user_hint()),
            ViewerError::Preview(e) => format!("Preview issue: {}", e),
            ViewerError::Tui(e) => format!("Display issue: {}", e.user_hint()),
            ViewerError::Io(e) => format!("File system issue: {}", e),
        }
    }
}

/// Trait for providing user-friendly hints
pub trait UserHint {
    fn user_hint(&self) -> String;
}

impl UserHint for ConfigError {
    fn user_hint(&self) -> String {
        match self {
            ConfigError::ValidationError { field, reason } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
            ConfigError::NotFound(path) => {
                format!("Configuration file '{}' not found. Run with --generate-config to create one.", path)
            }
        }
    }
}

impl UserHint for PayloadError {
    fn user_hint(&self) -> String {
        match self {
            PayloadError::ReadError { path, .. } => {
                format!("Could not read '{}'. Check if the file exists and you have read permissions.", path)
            }
            PayloadError::InvalidWrapped(_) => {
                "The payload is not a JSON string, null, byte array or {\"type\":\"Buffer\"} object.".into()
            }
        }
    }
}

impl UserHint for ExportError {
    fn user_hint(&self) -> String {
        match self {
            ExportError::WriteError { path, .. } => {
                format!("Could not write '{}'. Check the directory permissions.", path.display())
            }
            _ => self.to_string(),
        }
    }
}

impl UserHint for PreferenceError {
    fn user_hint(&self) -> String {
        match self {
            PreferenceError::ParseError(_) => {
                "The preference file is corrupt. Delete it to reset the table view setting.".into()
            }
            _ => self.to_string(),
        }
    }
}

impl UserHint for TuiError {
    fn user_hint(&self) -> String {
        match self {
            TuiError::TerminalTooSmall { min_width, min_height, .. } => {
                format!("Terminal too small. Minimum size is {}x{} characters.", min_width, min_height)
            }
            _ => self.to_string(),
        }
    }
}
