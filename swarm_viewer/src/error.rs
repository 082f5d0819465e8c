//! Errors surfaced by the viewer library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    /// The window or its framebuffer could not be created or updated
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    /// Settings file could not be read, written or removed
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid JSON for [`Settings`](crate::settings::Settings)
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
