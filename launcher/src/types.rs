//! Project data model shared across the launcher.
//!
//! A [`Project`] is one row of the recent list: an absolute path, a display
//! name derived from it, a recency timestamp, and an optional git branch.
//! The serialized form (`{name, path, lastUsed, branch?}`) is what the
//! history slot on disk holds, so field names are stable camelCase.

use serde::{Deserialize, Serialize};

/// A project folder known to the launcher.
///
/// Identity is the `path`; `name` is always derivable from it and is stored
/// only for display. `branch` is transient state recomputed on every
/// reconciliation pass and is omitted from the serialized form when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Display label, the last path segment.
    pub name: String,

    /// Absolute filesystem path; the unique key for deduplication.
    pub path: String,

    /// Last-used timestamp in epoch milliseconds. Used only for ordering.
    #[serde(rename = "lastUsed")]
    pub last_used: i64,

    /// Checked-out git branch, if the path is a repository and the lookup
    /// succeeded. `None` is a normal state, not an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Project {
    /// Creates a project for `path` with the given recency timestamp.
    ///
    /// The display name is the last non-empty path segment, falling back to
    /// the full path for degenerate inputs like `/`.
    pub fn new(path: impl Into<String>, last_used: i64) -> Self {
        let path = path.into();
        Self {
            name: basename(&path),
            path,
            last_used,
            branch: None,
        }
    }
}

/// Returns the last non-empty segment of a slash-separated path.
pub fn basename(path: &str) -> String {
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Shortens a path for display: the home prefix becomes `~` and long paths
/// keep only their last three segments (`~/A/B/C/D/proj` -> `~/C/D/proj`).
pub fn smart_truncate_path(path: &str) -> String {
    let home = directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_string_lossy().into_owned())
        .unwrap_or_default();
    smart_truncate_path_with_home(path, &home)
}

fn smart_truncate_path_with_home(path: &str, home: &str) -> String {
    let mut display = path.to_string();
    if !home.is_empty() {
        if let Some(rest) = display.strip_prefix(home) {
            display = format!("~{rest}");
        }
    }

    let parts: Vec<&str> = display.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() <= 3 {
        return display;
    }

    // Keep the last two directories plus the project name.
    let tail = &parts[parts.len() - 3..];
    format!("~/{}", tail.join("/"))
}

/// Truncates `text` to at most `max_len` characters, ending in an ellipsis.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let head: String = text.chars().take(max_len.saturating_sub(1)).collect();
    format!("{head}…")
}

/// Formats the age of an epoch-millisecond timestamp as a short label
/// ("just now", "5m ago", "3h ago", "2d ago").
pub fn format_age(last_used: i64, now: i64) -> String {
    let delta_secs = (now - last_used).max(0) / 1000;
    match delta_secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", delta_secs / 60),
        3600..=86_399 => format!("{}h ago", delta_secs / 3600),
        _ => format!("{}d ago", delta_secs / 86_400),
    }
}
