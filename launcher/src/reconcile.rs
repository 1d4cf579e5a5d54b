//! The recent-projects reconciliation pipeline.
//!
//! This is the core of the launcher: it merges the local history with the
//! editor's own recents, deduplicates by path, sorts by recency, and
//! enriches every entry with its current git branch. The merged view is
//! recomputed on every call and never persisted.
//!
//! # Merge policy
//!
//! Local history entries carry real timestamps from real open events and
//! win on path collisions. External entries have no usable recency, so they
//! are synthesized with `last_used = now`, which means a folder only known
//! to the editor outranks older genuine history on every refresh. That is
//! intended behavior, not a bug: the external source is treated as "open in
//! the editor right now", and opening such a folder through the launcher
//! promotes it into history with a real timestamp.
//!
//! # Failure semantics
//!
//! No step is fatal. Either source failing contributes an empty list, and
//! every branch lookup failure is just an absent branch.

use std::cmp::Reverse;
use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use crate::branch;
use crate::editor_recents::RecentsReader;
use crate::history::{HistoryStore, StateStore};
use crate::types::{now_millis, Project};

/// Merges, deduplicates, sorts, and enriches the recent-projects list.
#[derive(Debug, Clone)]
pub struct Reconciler<S> {
    history: HistoryStore<S>,
    recents: RecentsReader,
    branch_timeout: Duration,
}

impl<S: StateStore> Reconciler<S> {
    /// Creates a reconciler over the two project sources.
    pub fn new(history: HistoryStore<S>, recents: RecentsReader, branch_timeout: Duration) -> Self {
        Self {
            history,
            recents,
            branch_timeout,
        }
    }

    /// Produces the merged, deduplicated, recency-sorted, branch-enriched
    /// project list.
    ///
    /// Branch lookups run concurrently across entries, each bounded by the
    /// configured timeout; the list order is fixed before they are attached.
    pub async fn reconcile(&self) -> Vec<Project> {
        let mut merged = self.history.get();
        let local_count = merged.len();

        // External entries carry no timestamp of their own; stamp them with
        // "now" and let local entries win on collision.
        let now = now_millis();
        for path in self.recents.read() {
            if !merged.iter().any(|p| p.path == path) {
                merged.push(Project::new(path, now));
            }
        }

        // Stable: external entries tie on `now` and keep the reader's
        // enumeration order.
        merged.sort_by_key(|p| Reverse(p.last_used));

        let lookups = merged
            .iter()
            .map(|p| branch::resolve(Path::new(&p.path), self.branch_timeout));
        let branches = join_all(lookups).await;
        for (project, branch) in merged.iter_mut().zip(branches) {
            project.branch = branch;
        }

        debug!(
            total = merged.len(),
            local = local_count,
            "reconciled project list"
        );
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::FileStore;
    use std::io::Write;

    const TIMEOUT: Duration = Duration::from_secs(5);

    struct Fixture {
        _dir: tempfile::TempDir,
        history: HistoryStore<FileStore>,
        reconciler: Reconciler<FileStore>,
    }

    /// Builds a reconciler over a tempdir-backed slot and an optional
    /// synthetic storage.json.
    fn fixture(history_json: Option<&str>, storage_json: Option<&str>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::new(dir.path().join("state"));
        let history = HistoryStore::new(store.clone(), 100);
        if let Some(json) = history_json {
            store.write(json).unwrap();
        }

        let storage_path = dir.path().join("storage.json");
        if let Some(json) = storage_json {
            let mut file = std::fs::File::create(&storage_path).unwrap();
            file.write_all(json.as_bytes()).unwrap();
        }

        let reconciler = Reconciler::new(
            history.clone(),
            RecentsReader::new(storage_path),
            TIMEOUT,
        );
        Fixture {
            _dir: dir,
            history,
            reconciler,
        }
    }

    fn storage_with(paths: &[&str]) -> String {
        let folders: Vec<String> = paths
            .iter()
            .map(|p| format!(r#"{{"folderUri": "file://{p}"}}"#))
            .collect();
        format!(
            r#"{{"backupWorkspaces": {{"folders": [{}]}}}}"#,
            folders.join(",")
        )
    }

    #[tokio::test]
    async fn external_now_outranks_older_history() {
        // History knows /p/a with an old timestamp; the editor also lists
        // /p/a plus /p/b. The collision keeps the history identity, and the
        // synthesized entry sorts first.
        let fx = fixture(
            Some(r#"[{"name":"a","path":"/p/a","lastUsed":1000}]"#),
            Some(&storage_with(&["/p/a", "/p/b"])),
        );

        let projects = fx.reconciler.reconcile().await;
        let paths: Vec<&str> = projects.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/p/b", "/p/a"]);
        assert_eq!(projects[1].last_used, 1000);
        assert!(projects[0].last_used > 1000);
    }

    #[tokio::test]
    async fn dedup_keeps_exactly_one_entry_per_path() {
        let fx = fixture(
            Some(r#"[{"name":"a","path":"/p/a","lastUsed":1000}]"#),
            Some(&storage_with(&["/p/a", "/p/a"])),
        );

        let projects = fx.reconciler.reconcile().await;
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].path, "/p/a");
        assert_eq!(projects[0].last_used, 1000);
    }

    #[tokio::test]
    async fn missing_recents_file_preserves_history() {
        let fx = fixture(
            Some(r#"[{"name":"a","path":"/p/a","lastUsed":1000},{"name":"b","path":"/p/b","lastUsed":2000}]"#),
            None,
        );

        let projects = fx.reconciler.reconcile().await;
        let paths: Vec<&str> = projects.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/p/b", "/p/a"]);
    }

    #[tokio::test]
    async fn malformed_recents_file_preserves_history() {
        let fx = fixture(
            Some(r#"[{"name":"a","path":"/p/a","lastUsed":1000}]"#),
            Some("{{ nope"),
        );

        let projects = fx.reconciler.reconcile().await;
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].path, "/p/a");
    }

    #[tokio::test]
    async fn both_sources_empty_yields_empty() {
        let fx = fixture(None, None);
        assert!(fx.reconciler.reconcile().await.is_empty());
    }

    #[tokio::test]
    async fn sorted_descending_by_last_used() {
        let fx = fixture(
            Some(
                r#"[{"name":"a","path":"/p/a","lastUsed":1000},
                    {"name":"b","path":"/p/b","lastUsed":3000},
                    {"name":"c","path":"/p/c","lastUsed":2000}]"#,
            ),
            None,
        );

        let projects = fx.reconciler.reconcile().await;
        for pair in projects.windows(2) {
            assert!(pair[0].last_used >= pair[1].last_used);
        }
    }

    #[tokio::test]
    async fn external_entries_keep_enumeration_order() {
        let fx = fixture(None, Some(&storage_with(&["/p/x", "/p/y", "/p/z"])));

        let projects = fx.reconciler.reconcile().await;
        let paths: Vec<&str> = projects.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/p/x", "/p/y", "/p/z"]);
    }

    #[tokio::test]
    async fn reconcile_is_idempotent_over_path_order() {
        let fx = fixture(
            Some(r#"[{"name":"a","path":"/p/a","lastUsed":1000}]"#),
            Some(&storage_with(&["/p/b", "/p/c"])),
        );

        let first: Vec<String> = fx
            .reconciler
            .reconcile()
            .await
            .into_iter()
            .map(|p| p.path)
            .collect();
        let second: Vec<String> = fx
            .reconciler
            .reconcile()
            .await
            .into_iter()
            .map(|p| p.path)
            .collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn non_repository_paths_have_no_branch() {
        let fx = fixture(None, None);
        fx.history.record_open("/p/not-a-repo").unwrap();

        let projects = fx.reconciler.reconcile().await;
        assert_eq!(projects.len(), 1);
        assert!(projects[0].branch.is_none());
    }
}
