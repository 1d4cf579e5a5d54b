//! Opening paths and windows in the editor.
//!
//! [`EditorLauncher::open`] is the one write path into local history: it
//! spawns macOS `open -a` pointed at the editor bundle and records the path
//! only after the spawn succeeded. [`EditorLauncher::new_window`] drives the
//! AppleScript fallback chain for opening an empty editor window, modeled as
//! an ordered list of [`WindowStrategy`] values tried until one succeeds.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{LauncherError, Result};
use crate::history::{HistoryStore, StateStore};

/// One way of convincing the editor to open a new window.
///
/// Strategies are ordered from least to most intrusive; the chain stops at
/// the first success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStrategy {
    /// Activate the app and send the ⌘⇧N keystroke via System Events.
    Keystroke,
    /// Click "New Window" (or "New") in the app's File menu.
    MenuClick,
    /// Relaunch the app with `open -n ... --args --new-window`.
    Relaunch,
}

/// The new-window fallback chain, in order.
pub const WINDOW_STRATEGIES: [WindowStrategy; 3] = [
    WindowStrategy::Keystroke,
    WindowStrategy::MenuClick,
    WindowStrategy::Relaunch,
];

/// Opens paths and windows in the editor and records opens into history.
#[derive(Debug, Clone)]
pub struct EditorLauncher<S> {
    app_name: String,
    app_path: String,
    bundle_id: Option<String>,
    history: HistoryStore<S>,
}

impl<S: StateStore> EditorLauncher<S> {
    /// Creates a launcher for the given application.
    pub fn new(
        app_name: impl Into<String>,
        app_path: impl Into<String>,
        bundle_id: Option<String>,
        history: HistoryStore<S>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            app_path: app_path.into(),
            bundle_id,
            history,
        }
    }

    /// Opens `path` in the editor and records it in local history.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Launch`] if the application cannot be
    /// started; no history entry is written in that case.
    pub async fn open(&self, path: &str) -> Result<()> {
        let status = Command::new("open")
            .arg("-a")
            .arg(&self.app_path)
            .arg(path)
            .status()
            .await
            .map_err(|e| LauncherError::Launch(format!("failed to run open: {e}")))?;

        if !status.success() {
            return Err(LauncherError::Launch(format!(
                "open exited with {status} for {path}"
            )));
        }

        info!(path, app = %self.app_path, "opened in editor");
        self.history.record_open(path)
    }

    /// Opens a new, empty editor window.
    ///
    /// Tries each [`WindowStrategy`] in order; after the first success a
    /// best-effort close-workspace pass detaches the window from any
    /// restored folder (its failure is ignored).
    ///
    /// # Errors
    ///
    /// Returns the last strategy's error if every strategy fails.
    pub async fn new_window(&self) -> Result<()> {
        let strategy = run_strategy_chain(|s| self.attempt(s)).await?;
        debug!(?strategy, "new window opened");
        if let Err(e) = self.close_workspace().await {
            debug!(error = %e, "close-workspace scripting failed, ignoring");
        }
        Ok(())
    }

    async fn attempt(&self, strategy: WindowStrategy) -> Result<()> {
        match strategy {
            WindowStrategy::Keystroke => {
                let script = format!(
                    "tell application \"{app}\" to activate\n\
                     tell application \"System Events\" to keystroke \"n\" using {{command down, shift down}}",
                    app = self.app_name
                );
                run_osascript(&script).await
            }
            WindowStrategy::MenuClick => {
                let script = format!(
                    "tell application \"{app}\" to activate\n\
                     tell application \"System Events\"\n\
                       tell application process \"{app}\"\n\
                         set frontmost to true\n\
                         try\n\
                           click menu item \"New Window\" of menu \"File\" of menu bar 1\n\
                         on error\n\
                           click menu item \"New\" of menu \"File\" of menu bar 1\n\
                         end try\n\
                       end tell\n\
                     end tell",
                    app = self.app_name
                );
                run_osascript(&script).await
            }
            WindowStrategy::Relaunch => {
                let mut cmd = Command::new("open");
                cmd.arg("-n");
                match &self.bundle_id {
                    Some(bundle_id) => {
                        cmd.arg("-b").arg(bundle_id);
                    }
                    None => {
                        cmd.arg("-a").arg(&self.app_name);
                    }
                }
                cmd.args(["--args", "--new-window"]);

                let status = cmd
                    .status()
                    .await
                    .map_err(|e| LauncherError::Launch(format!("failed to run open: {e}")))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(LauncherError::Launch(format!(
                        "open -n exited with {status}"
                    )))
                }
            }
        }
    }

    /// Detaches the fresh window from any restored workspace: click
    /// "Close Workspace"/"Close Folder", or fall back to ⌘W plus a new ⌘⇧N.
    async fn close_workspace(&self) -> Result<()> {
        let menu_script = format!(
            "tell application \"{app}\" to activate\n\
             tell application \"System Events\"\n\
               tell application process \"{app}\"\n\
                 set frontmost to true\n\
                 try\n\
                   click menu item \"Close Workspace\" of menu \"File\" of menu bar 1\n\
                 on error\n\
                   click menu item \"Close Folder\" of menu \"File\" of menu bar 1\n\
                 end try\n\
               end tell\n\
             end tell",
            app = self.app_name
        );

        if run_osascript(&menu_script).await.is_ok() {
            return Ok(());
        }

        let close_window = format!(
            "tell application \"{app}\" to activate\n\
             tell application \"System Events\"\n\
               keystroke \"w\" using {{command down}}\n\
             end tell",
            app = self.app_name
        );
        run_osascript(&close_window).await?;

        let reopen = format!(
            "tell application \"{app}\" to activate\n\
             tell application \"System Events\" to keystroke \"n\" using {{command down, shift down}}",
            app = self.app_name
        );
        run_osascript(&reopen).await
    }
}

/// Drives the new-window fallback chain.
///
/// Calls `attempt` for each strategy in [`WINDOW_STRATEGIES`] order and
/// stops at the first success, returning the strategy that worked. If every
/// strategy fails, the last error is returned.
async fn run_strategy_chain<F, Fut>(mut attempt: F) -> Result<WindowStrategy>
where
    F: FnMut(WindowStrategy) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let mut last_err = None;
    for strategy in WINDOW_STRATEGIES {
        match attempt(strategy).await {
            Ok(()) => return Ok(strategy),
            Err(e) => {
                warn!(?strategy, error = %e, "new-window strategy failed, trying next");
                last_err = Some(e);
            }
        }
    }
    Err(last_err
        .unwrap_or_else(|| LauncherError::Launch("no window strategy available".to_string())))
}

/// Runs an AppleScript snippet via `osascript -e`.
async fn run_osascript(script: &str) -> Result<()> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| LauncherError::Launch(format!("failed to run osascript: {e}")))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(LauncherError::Launch(format!(
            "osascript failed: {}",
            stderr.trim()
        )))
    }
}

/// Reveals `path` in Finder (`open -R`).
pub async fn reveal_in_finder(path: &str) -> Result<()> {
    let status = Command::new("open")
        .arg("-R")
        .arg(path)
        .status()
        .await
        .map_err(|e| LauncherError::Launch(format!("failed to run open -R: {e}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(LauncherError::Launch(format!(
            "open -R exited with {status}"
        )))
    }
}

/// Puts `text` on the system clipboard via `pbcopy`.
pub async fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut child = Command::new("pbcopy")
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| LauncherError::Launch(format!("failed to run pbcopy: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| LauncherError::Launch(format!("failed to write to pbcopy: {e}")))?;
    }

    let status = child
        .wait()
        .await
        .map_err(|e| LauncherError::Launch(format!("pbcopy did not exit: {e}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(LauncherError::Launch(format!(
            "pbcopy exited with {status}"
        )))
    }
}
