//! Application core module
//!
//! Handles application lifecycle, state management, and coordination
//! between the body viewer, the preview surface and the TUI.

mod config;
mod events;
mod state;

pub use config::Config;
pub use state::{App, AppMode};
