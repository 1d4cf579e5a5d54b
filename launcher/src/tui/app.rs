//! Picker state and event loop.
//!
//! The picker is event-driven: keyboard input arrives from a dedicated
//! reader thread, refresh results arrive from spawned reconcile tasks, and
//! a `tokio::select!` loop multiplexes both with the polling timer. All
//! state changes happen on the loop; the spawned tasks only compute.
//!
//! Refreshes are serialized: a timer tick that fires while a reconcile is
//! still in flight is dropped, so overlapping passes never race on the
//! displayed list.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Result, TuiError};
use crate::history::StateStore;
use crate::launch::{self, EditorLauncher};
use crate::reconcile::Reconciler;
use crate::tui::terminal::Tui;
use crate::tui::ui;
use crate::types::Project;

/// Poll interval for the input reader thread.
const INPUT_POLL_MS: u64 = 100;

/// Events that drive the picker loop.
#[derive(Debug)]
pub enum TuiEvent {
    /// A key press from the input thread.
    Key(KeyEvent),
    /// Terminal resize; forces a redraw.
    Resize,
    /// A reconcile pass finished with this list.
    Refreshed(Vec<Project>),
}

/// Transient message shown in the picker's status line.
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

/// The picker application.
pub struct App<S> {
    reconciler: Reconciler<S>,
    launcher: EditorLauncher<S>,
    refresh_interval: Duration,

    /// Most recent reconciled list (unfiltered).
    pub projects: Vec<Project>,
    /// Incremental text filter over name and path.
    pub filter: String,
    /// Selection state for the rendered list.
    pub list_state: ListState,
    /// True until the first reconcile completes.
    pub loading: bool,
    /// Transient status message, if any.
    pub status: Option<StatusLine>,

    refresh_in_flight: bool,
    should_quit: bool,
}

impl<S> App<S>
where
    S: StateStore + Clone + Send + Sync + 'static,
{
    /// Creates a picker.
    ///
    /// `initial` is shown immediately (the persisted history) while the
    /// first reconcile is still running.
    pub fn new(
        reconciler: Reconciler<S>,
        launcher: EditorLauncher<S>,
        refresh_interval: Duration,
        initial: Vec<Project>,
    ) -> Self {
        let mut list_state = ListState::default();
        if !initial.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            reconciler,
            launcher,
            refresh_interval,
            projects: initial,
            filter: String::new(),
            list_state,
            loading: true,
            status: None,
            refresh_in_flight: false,
            should_quit: false,
        }
    }

    /// Runs the picker until the user quits or opens a project.
    pub async fn run(mut self) -> Result<()> {
        let mut tui = Tui::new().map_err(TuiError::TerminalInit)?;

        let (tx, mut rx) = mpsc::channel::<TuiEvent>(64);
        spawn_input_thread(tx.clone());

        // The interval's first tick fires immediately and doubles as the
        // initial load.
        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while !self.should_quit {
            tui.draw(|frame| ui::draw(frame, &mut self))
                .map_err(TuiError::Render)?;

            tokio::select! {
                _ = ticker.tick() => self.start_refresh(&tx),
                event = rx.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }

        tui.restore().map_err(TuiError::Render)?;
        Ok(())
    }

    /// Returns the projects matching the current filter, in list order.
    pub fn filtered(&self) -> Vec<&Project> {
        if self.filter.is_empty() {
            return self.projects.iter().collect();
        }
        let needle = self.filter.to_lowercase();
        self.projects
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle) || p.path.to_lowercase().contains(&needle)
            })
            .collect()
    }

    fn selected_project(&self) -> Option<Project> {
        let filtered = self.filtered();
        self.list_state
            .selected()
            .and_then(|i| filtered.get(i))
            .map(|p| (*p).clone())
    }

    fn start_refresh(&mut self, tx: &mpsc::Sender<TuiEvent>) {
        if self.refresh_in_flight {
            debug!("reconcile still in flight, dropping refresh tick");
            return;
        }
        self.refresh_in_flight = true;

        let reconciler = self.reconciler.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let projects = reconciler.reconcile().await;
            let _ = tx.send(TuiEvent::Refreshed(projects)).await;
        });
    }

    async fn handle_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key) => self.handle_key(key).await,
            TuiEvent::Resize => {}
            TuiEvent::Refreshed(projects) => {
                self.projects = projects;
                self.loading = false;
                self.refresh_in_flight = false;
                self.clamp_selection();
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('y') => self.copy_selected_path().await,
                KeyCode::Char('r') => self.reveal_selected().await,
                KeyCode::Char('n') => self.open_new_window().await,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if self.filter.is_empty() {
                    self.should_quit = true;
                } else {
                    self.filter.clear();
                    self.reset_selection();
                }
            }
            KeyCode::Enter => self.open_selected().await,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Backspace => {
                self.filter.pop();
                self.reset_selection();
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.reset_selection();
            }
            _ => {}
        }
    }

    async fn open_selected(&mut self) {
        let Some(project) = self.selected_project() else {
            return;
        };
        match self.launcher.open(&project.path).await {
            Ok(()) => {
                // The launcher's job is done once the editor has the folder.
                self.should_quit = true;
            }
            Err(e) => self.set_status(format!("Failed to open {}: {e}", project.name), true),
        }
    }

    async fn open_new_window(&mut self) {
        match self.launcher.new_window().await {
            Ok(()) => self.should_quit = true,
            Err(e) => self.set_status(format!("Failed to open new window: {e}"), true),
        }
    }

    async fn copy_selected_path(&mut self) {
        let Some(project) = self.selected_project() else {
            return;
        };
        match launch::copy_to_clipboard(&project.path).await {
            Ok(()) => self.set_status(format!("Copied {}", project.path), false),
            Err(e) => self.set_status(format!("Copy failed: {e}"), true),
        }
    }

    async fn reveal_selected(&mut self) {
        let Some(project) = self.selected_project() else {
            return;
        };
        if let Err(e) = launch::reveal_in_finder(&project.path).await {
            self.set_status(format!("Reveal failed: {e}"), true);
        }
    }

    fn set_status(&mut self, message: String, is_error: bool) {
        self.status = Some(StatusLine { message, is_error });
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.filtered().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.list_state.select(Some(next));
    }

    fn reset_selection(&mut self) {
        if self.filtered().is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered().len();
        match self.list_state.selected() {
            Some(_) if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None if len > 0 => self.list_state.select(Some(0)),
            _ => {}
        }
    }
}

/// Spawns the blocking input reader.
///
/// Crossterm's `poll`/`read` block, so they live on their own thread and
/// feed the async loop through the channel. The thread exits when the
/// receiver side is dropped.
fn spawn_input_thread(tx: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        let ready = match event::poll(Duration::from_millis(INPUT_POLL_MS)) {
            Ok(ready) => ready,
            Err(_) => break,
        };
        if !ready {
            if tx.is_closed() {
                break;
            }
            continue;
        }
        let tui_event = match event::read() {
            Ok(CrosstermEvent::Key(key)) if key.kind == event::KeyEventKind::Press => {
                TuiEvent::Key(key)
            }
            Ok(CrosstermEvent::Resize(..)) => TuiEvent::Resize,
            Ok(_) => continue,
            Err(_) => break,
        };
        if tx.blocking_send(tui_event).is_err() {
            break;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor_recents::RecentsReader;
    use crate::history::{FileStore, HistoryStore};

    fn test_app(initial: Vec<Project>) -> (tempfile::TempDir, App<FileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryStore::new(FileStore::new(dir.path()), 100);
        let reconciler = Reconciler::new(
            history.clone(),
            RecentsReader::new(dir.path().join("storage.json")),
            Duration::from_secs(1),
        );
        let launcher = EditorLauncher::new("Trae", "/Applications/Trae.app", None, history);
        let app = App::new(reconciler, launcher, Duration::from_millis(750), initial);
        (dir, app)
    }

    fn projects(paths: &[&str]) -> Vec<Project> {
        paths
            .iter()
            .enumerate()
            .map(|(i, p)| Project::new(*p, 1000 - i as i64))
            .collect()
    }

    #[test]
    fn filter_matches_name_and_path_case_insensitively() {
        let (_dir, mut app) = test_app(projects(&["/src/Widget", "/src/gadget", "/other/tool"]));

        app.filter = "WIDG".to_string();
        let filtered = app.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].path, "/src/Widget");

        app.filter = "src".to_string();
        assert_eq!(app.filtered().len(), 2);
    }

    #[test]
    fn empty_filter_shows_everything() {
        let (_dir, app) = test_app(projects(&["/p/a", "/p/b"]));
        assert_eq!(app.filtered().len(), 2);
    }

    #[test]
    fn selection_clamps_to_filtered_length() {
        let (_dir, mut app) = test_app(projects(&["/p/a", "/p/b", "/p/c"]));
        app.list_state.select(Some(2));

        app.filter = "a".to_string();
        app.clamp_selection();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn selection_cleared_when_nothing_matches() {
        let (_dir, mut app) = test_app(projects(&["/p/a"]));
        app.filter = "zzz".to_string();
        app.clamp_selection();
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn move_selection_stays_in_bounds() {
        let (_dir, mut app) = test_app(projects(&["/p/a", "/p/b"]));
        app.move_selection(-1);
        assert_eq!(app.list_state.selected(), Some(0));
        app.move_selection(1);
        assert_eq!(app.list_state.selected(), Some(1));
        app.move_selection(5);
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[tokio::test]
    async fn refreshed_event_replaces_list_and_clears_loading() {
        let (_dir, mut app) = test_app(Vec::new());
        assert!(app.loading);

        app.handle_event(TuiEvent::Refreshed(projects(&["/p/a"])))
            .await;
        assert!(!app.loading);
        assert_eq!(app.projects.len(), 1);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn typing_updates_filter_and_backspace_reverts() {
        let (_dir, mut app) = test_app(projects(&["/p/a"]));

        app.handle_key(KeyEvent::from(KeyCode::Char('a'))).await;
        app.handle_key(KeyEvent::from(KeyCode::Char('b'))).await;
        assert_eq!(app.filter, "ab");

        app.handle_key(KeyEvent::from(KeyCode::Backspace)).await;
        assert_eq!(app.filter, "a");
    }

    #[tokio::test]
    async fn esc_clears_filter_before_quitting() {
        let (_dir, mut app) = test_app(projects(&["/p/a"]));

        app.filter = "abc".to_string();
        app.handle_key(KeyEvent::from(KeyCode::Esc)).await;
        assert!(app.filter.is_empty());
        assert!(!app.should_quit);

        app.handle_key(KeyEvent::from(KeyCode::Esc)).await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn ctrl_c_quits() {
        let (_dir, mut app) = test_app(Vec::new());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .await;
        assert!(app.should_quit);
    }
}
