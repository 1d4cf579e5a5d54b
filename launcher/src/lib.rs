//! Trailhead - terminal launcher for the Trae editor.
//!
//! This crate opens project folders in Trae, keeps a capped local history of
//! everything it has opened, merges that history with Trae's own
//! recently-opened state, annotates projects with their git branch, and
//! presents the result in a searchable terminal picker.
//!
//! # Architecture
//!
//! Two project sources feed one pipeline. The local history
//! ([`history::HistoryStore`]) is authoritative: it carries real timestamps
//! from real open events. Trae's own recents ([`editor_recents`]) are
//! advisory: an externally-owned file with an undocumented schema whose
//! failures always degrade to an empty contribution. The
//! [`reconcile::Reconciler`] merges the two, deduplicates by path (history
//! wins), sorts by recency, and enriches each entry with a bounded git
//! branch lookup ([`branch`]).
//!
//! # Modules
//!
//! - [`types`]: the `Project` model and display helpers
//! - [`config`]: `TRAILHEAD_*` environment configuration
//! - [`error`]: error types
//! - [`history`]: capped, persisted open history
//! - [`editor_recents`]: reader for Trae's `storage.json`
//! - [`branch`]: git branch lookup with per-call timeout
//! - [`reconcile`]: the merge/dedup/sort/enrich pipeline
//! - [`launch`]: opening paths and windows in the editor
//! - [`tui`]: the picker interface

pub mod branch;
pub mod config;
pub mod editor_recents;
pub mod error;
pub mod history;
pub mod launch;
pub mod reconcile;
pub mod tui;
pub mod types;

pub use config::Config;
pub use editor_recents::RecentsReader;
pub use error::{LauncherError, Result};
pub use history::{FileStore, HistoryStore, StateStore};
pub use launch::{EditorLauncher, WindowStrategy};
pub use reconcile::Reconciler;
pub use types::Project;
