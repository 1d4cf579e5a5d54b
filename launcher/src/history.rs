//! Local history of projects opened through the launcher.
//!
//! The history lives in a single JSON slot on disk: a most-recent-first
//! array of [`Project`] objects, capped at a fixed number of entries. The
//! slot is modeled as an injected [`StateStore`] rather than ambient file
//! access so tests can swap in an in-memory store.
//!
//! Reads never fail: a missing or corrupt slot degrades to an empty list.
//! Writes are last-writer-wins; there is exactly one interactive writer
//! (the launcher's record-on-open), so no locking is needed.

use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{now_millis, Project};

/// A named slot of persisted state.
///
/// Implementations hold one serialized document. `read` distinguishes
/// "slot absent" (`Ok(None)`) from real I/O failures.
pub trait StateStore {
    /// Reads the slot contents, or `None` if the slot has never been written.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replaces the slot contents.
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// File-backed [`StateStore`] holding the recent-projects slot.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

/// File name of the recent-projects slot inside the state directory.
const SLOT_FILE: &str = "recent_projects.json";

impl FileStore {
    /// Creates a store rooted at `state_dir`.
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join(SLOT_FILE),
        }
    }
}

impl StateStore for FileStore {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)
    }
}

/// Capped, ordered, persisted list of projects the launcher has opened.
#[derive(Debug, Clone)]
pub struct HistoryStore<S> {
    store: S,
    cap: usize,
}

impl<S: StateStore> HistoryStore<S> {
    /// Creates a history over `store`, keeping at most `cap` entries.
    pub fn new(store: S, cap: usize) -> Self {
        Self { store, cap }
    }

    /// Returns the persisted history, most-recent-first.
    ///
    /// A missing slot, unreadable slot, or corrupt document all degrade to
    /// an empty list; this source is never an error.
    pub fn get(&self) -> Vec<Project> {
        let contents = match self.store.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read history slot");
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(projects) => projects,
            Err(e) => {
                warn!(error = %e, "history slot is corrupt, resetting to empty");
                Vec::new()
            }
        }
    }

    /// Records that `path` was just opened.
    ///
    /// Read-modify-write against the slot: any existing entry for the same
    /// path is removed, a fresh entry is inserted at the front with the
    /// current time, and the list is truncated to the cap.
    ///
    /// # Errors
    ///
    /// Returns an error only if the final write fails; a corrupt prior state
    /// is silently replaced.
    pub fn record_open(&self, path: &str) -> Result<()> {
        let mut projects = self.get();
        projects.retain(|p| p.path != path);
        projects.insert(0, Project::new(path, now_millis()));
        projects.truncate(self.cap);

        let serialized = serde_json::to_string(&projects)?;
        self.store.write(&serialized)?;
        debug!(path, entries = projects.len(), "recorded open in history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// In-memory slot for unit tests.
    #[derive(Clone, Default)]
    struct MemStore {
        contents: Rc<RefCell<Option<String>>>,
        fail_reads: bool,
    }

    impl StateStore for MemStore {
        fn read(&self) -> io::Result<Option<String>> {
            if self.fail_reads {
                return Err(io::Error::other("slot unavailable"));
            }
            Ok(self.contents.borrow().clone())
        }

        fn write(&self, contents: &str) -> io::Result<()> {
            *self.contents.borrow_mut() = Some(contents.to_string());
            Ok(())
        }
    }

    fn history() -> HistoryStore<MemStore> {
        HistoryStore::new(MemStore::default(), 100)
    }

    #[test]
    fn empty_slot_yields_empty_list() {
        assert!(history().get().is_empty());
    }

    #[test]
    fn corrupt_slot_degrades_to_empty() {
        let store = MemStore::default();
        store.write("not json at all").unwrap();
        let history = HistoryStore::new(store, 100);
        assert!(history.get().is_empty());
    }

    #[test]
    fn failing_reads_degrade_to_empty() {
        let store = MemStore {
            fail_reads: true,
            ..MemStore::default()
        };
        let history = HistoryStore::new(store, 100);
        assert!(history.get().is_empty());
    }

    #[test]
    fn record_open_inserts_at_front() {
        let history = history();
        history.record_open("/p/a").unwrap();
        history.record_open("/p/b").unwrap();

        let projects = history.get();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].path, "/p/b");
        assert_eq!(projects[1].path, "/p/a");
    }

    #[test]
    fn record_open_dedupes_by_path() {
        let history = history();
        history.record_open("/p/a").unwrap();
        history.record_open("/p/b").unwrap();
        history.record_open("/p/a").unwrap();

        let projects = history.get();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].path, "/p/a");
        assert_eq!(projects[1].path, "/p/b");
    }

    #[test]
    fn record_open_enforces_cap() {
        let store = MemStore::default();
        let history = HistoryStore::new(store, 100);
        for i in 0..100 {
            history.record_open(&format!("/p/{i}")).unwrap();
        }
        assert_eq!(history.get().len(), 100);

        // One more distinct path evicts the oldest entry.
        history.record_open("/p/x").unwrap();
        let projects = history.get();
        assert_eq!(projects.len(), 100);
        assert_eq!(projects[0].path, "/p/x");
        assert!(!projects.iter().any(|p| p.path == "/p/0"));
    }

    #[test]
    fn record_open_replaces_corrupt_slot() {
        let store = MemStore::default();
        store.write("{{ broken").unwrap();
        let history = HistoryStore::new(store, 100);

        history.record_open("/p/a").unwrap();
        let projects = history.get();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].path, "/p/a");
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert!(store.read().unwrap().is_none());
        store.write("[1,2,3]").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn timestamps_are_monotonic_enough_for_ordering() {
        let history = history();
        history.record_open("/p/a").unwrap();
        history.record_open("/p/b").unwrap();

        let projects = history.get();
        assert!(projects[0].last_used >= projects[1].last_used);
    }
}
