//! Custom TUI widgets

mod preview_popup;
mod response_body;
mod save_dialog;

pub use preview_popup::PreviewPopup;
pub use response_body::{BodyToggles, ResponseBody};
pub use save_dialog::SaveDialog;
