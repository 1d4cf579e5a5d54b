//! Error types for the launcher.
//!
//! Data-source failures (missing recents file, non-repository paths, corrupt
//! history) are deliberately *not* represented here: those degrade to empty
//! contributions inside the modules that hit them. [`LauncherError`] covers
//! the failures that are surfaced to the user, which in practice means
//! configuration problems at startup and launch failures on user action.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by launcher operations.
#[derive(Error, Debug)]
pub enum LauncherError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The target application could not be started.
    ///
    /// This is the only runtime failure shown to the user; history is not
    /// updated when a launch fails.
    #[error("launch error: {0}")]
    Launch(String),

    /// TUI-related error.
    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),
}

/// Errors that can occur during TUI operation.
#[derive(Error, Debug)]
pub enum TuiError {
    /// Terminal initialization failed.
    #[error("failed to initialize terminal: {0}")]
    TerminalInit(#[source] std::io::Error),

    /// Terminal rendering failed.
    #[error("render error: {0}")]
    Render(#[source] std::io::Error),

    /// Event handling error.
    #[error("event error: {0}")]
    Event(String),
}

/// A specialized `Result` type for launcher operations.
pub type Result<T> = std::result::Result<T, LauncherError>;
