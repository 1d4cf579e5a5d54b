//! Configuration for the launcher.
//!
//! All settings come from `TRAILHEAD_*` environment variables; every one of
//! them has a default, so the launcher runs with no setup at all.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TRAILHEAD_APP` | `Trae` | Editor application name (AppleScript target) |
//! | `TRAILHEAD_APP_PATH` | `/Applications/Trae.app` | Application bundle passed to `open -a` |
//! | `TRAILHEAD_BUNDLE_ID` | (unset) | Bundle id for the `open -n -b` new-window fallback |
//! | `TRAILHEAD_STATE_DIR` | `~/.trailhead` | Directory holding the recent-projects slot |
//! | `TRAILHEAD_EDITOR_STORAGE` | `~/Library/Application Support/Trae/User/globalStorage/storage.json` | Trae's own recents file |
//! | `TRAILHEAD_REFRESH_MS` | 750 | Picker refresh interval (>= 100) |
//! | `TRAILHEAD_BRANCH_TIMEOUT_MS` | 1500 | Per-project git lookup timeout (> 0) |
//! | `TRAILHEAD_HISTORY_CAP` | 100 | Max persisted history entries (> 0) |

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Default editor application name.
const DEFAULT_APP: &str = "Trae";

/// Default application bundle path for `open -a`.
const DEFAULT_APP_PATH: &str = "/Applications/Trae.app";

/// Default state directory name relative to home.
const DEFAULT_STATE_DIR: &str = ".trailhead";

/// Trae's recents file, relative to home.
const EDITOR_STORAGE_REL: &str =
    "Library/Application Support/Trae/User/globalStorage/storage.json";

/// Default picker refresh interval in milliseconds.
const DEFAULT_REFRESH_MS: u64 = 750;

/// Refresh intervals below this would hammer the git subprocesses.
const MIN_REFRESH_MS: u64 = 100;

/// Default per-project branch lookup timeout in milliseconds.
const DEFAULT_BRANCH_TIMEOUT_MS: u64 = 1500;

/// Default cap on persisted history entries.
const DEFAULT_HISTORY_CAP: usize = 100;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

/// Configuration for the launcher.
#[derive(Debug, Clone)]
pub struct Config {
    /// Editor application name, used as the AppleScript target.
    pub app_name: String,

    /// Application bundle path passed to `open -a`.
    pub app_path: String,

    /// Optional bundle identifier for the relaunch fallback.
    pub bundle_id: Option<String>,

    /// Directory holding the persisted recent-projects slot.
    pub state_dir: PathBuf,

    /// Path to the editor's own recents file (`storage.json`).
    pub editor_storage: PathBuf,

    /// Picker refresh interval in milliseconds.
    pub refresh_ms: u64,

    /// Per-project branch lookup timeout in milliseconds.
    pub branch_timeout_ms: u64,

    /// Maximum number of persisted history entries.
    pub history_cap: usize,
}

impl Config {
    /// Creates a `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a numeric variable cannot be parsed or is
    /// out of range, or if the home directory cannot be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
        let home_dir = base_dirs.home_dir();

        let app_name = env::var("TRAILHEAD_APP")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_APP.to_string());

        let app_path = env::var("TRAILHEAD_APP_PATH")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_APP_PATH.to_string());

        let bundle_id = env::var("TRAILHEAD_BUNDLE_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let state_dir = env::var("TRAILHEAD_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir.join(DEFAULT_STATE_DIR));

        let editor_storage = env::var("TRAILHEAD_EDITOR_STORAGE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir.join(EDITOR_STORAGE_REL));

        let refresh_ms = parse_positive_u64("TRAILHEAD_REFRESH_MS", DEFAULT_REFRESH_MS)?;
        if refresh_ms < MIN_REFRESH_MS {
            return Err(ConfigError::InvalidValue {
                key: "TRAILHEAD_REFRESH_MS".to_string(),
                message: format!("refresh interval must be at least {MIN_REFRESH_MS}ms"),
            });
        }

        let branch_timeout_ms =
            parse_positive_u64("TRAILHEAD_BRANCH_TIMEOUT_MS", DEFAULT_BRANCH_TIMEOUT_MS)?;

        let history_cap = match env::var("TRAILHEAD_HISTORY_CAP") {
            Ok(val) => {
                let cap = val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                    key: "TRAILHEAD_HISTORY_CAP".to_string(),
                    message: format!("expected positive integer, got '{val}'"),
                })?;
                if cap == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "TRAILHEAD_HISTORY_CAP".to_string(),
                        message: "history cap must be greater than 0".to_string(),
                    });
                }
                cap
            }
            Err(_) => DEFAULT_HISTORY_CAP,
        };

        Ok(Self {
            app_name,
            app_path,
            bundle_id,
            state_dir,
            editor_storage,
            refresh_ms,
            branch_timeout_ms,
            history_cap,
        })
    }
}

/// Parses an optional positive-integer environment variable.
fn parse_positive_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(val) => {
            let parsed = val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected positive integer, got '{val}'"),
            })?;
            if parsed == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "value must be greater than 0".to_string(),
                });
            }
            Ok(parsed)
        }
        Err(_) => Ok(default),
    }
}
