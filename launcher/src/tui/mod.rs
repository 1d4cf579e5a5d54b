//! Terminal picker for recent projects.
//!
//! Built with [`ratatui`], following a small Model-View split:
//!
//! - [`app`]: picker state, filtering, and the async event loop
//! - [`ui`]: frame rendering
//! - [`terminal`]: raw-mode setup, RAII restoration, and panic handling
//!
//! The picker polls the reconciliation pipeline on a fixed interval and
//! serializes refreshes, so at most one reconcile pass runs at a time.

pub mod app;
pub mod terminal;
pub mod ui;

pub use app::{App, StatusLine, TuiEvent};
pub use terminal::{install_panic_hook, Tui};
