//! Reader for Trae's own recently-opened-folders state.
//!
//! Trae persists the workspaces it can restore in
//! `~/Library/Application Support/Trae/User/globalStorage/storage.json`
//! under `backupWorkspaces.folders`, each folder carrying a percent-encoded
//! `file://` URI. That schema is undocumented and owned by the editor, so
//! this reader is strictly advisory: any failure at all (missing file, bad
//! JSON, unfamiliar structure) contributes an empty list rather than an
//! error.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

/// URI scheme prefix carried by Trae's folder entries.
const FILE_SCHEME: &str = "file://";

/// Top-level shape of `storage.json`. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct EditorStorage {
    #[serde(rename = "backupWorkspaces", default)]
    backup_workspaces: Option<BackupWorkspaces>,
}

#[derive(Debug, Default, Deserialize)]
struct BackupWorkspaces {
    #[serde(default)]
    folders: Vec<FolderEntry>,
}

#[derive(Debug, Deserialize)]
struct FolderEntry {
    #[serde(rename = "folderUri", default)]
    folder_uri: Option<String>,
}

/// Reads folder paths from the editor's persisted recents file.
#[derive(Debug, Clone)]
pub struct RecentsReader {
    storage_path: PathBuf,
}

impl RecentsReader {
    /// Creates a reader over the given `storage.json` path.
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
        }
    }

    /// Returns the absolute folder paths in the editor's recents, in the
    /// file's enumeration order.
    ///
    /// Only entries with a `file://` URI count; the scheme is stripped and
    /// percent-escapes are decoded. Every failure mode yields `[]`.
    pub fn read(&self) -> Vec<String> {
        let contents = match std::fs::read_to_string(&self.storage_path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.storage_path.display(), error = %e, "editor storage not readable");
                return Vec::new();
            }
        };

        let storage: EditorStorage = match serde_json::from_str(&contents) {
            Ok(storage) => storage,
            Err(e) => {
                debug!(path = %self.storage_path.display(), error = %e, "editor storage not parseable");
                return Vec::new();
            }
        };

        storage
            .backup_workspaces
            .unwrap_or_default()
            .folders
            .into_iter()
            .filter_map(|folder| folder.folder_uri)
            .filter_map(|uri| {
                uri.strip_prefix(FILE_SCHEME)
                    .map(|encoded| percent_decode(encoded))
            })
            .collect()
    }
}

/// Decodes percent-escaped bytes; malformed escapes pass through verbatim.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push((high << 4) | low);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
