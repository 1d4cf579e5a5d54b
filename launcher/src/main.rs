//! Trailhead - terminal launcher for the Trae editor.
//!
//! # Commands
//!
//! - `trailhead` / `trailhead pick`: searchable picker over recent projects
//! - `trailhead open <PATH>`: open a folder in Trae and record it
//! - `trailhead recent [--json]`: print the reconciled recent list
//! - `trailhead new-window`: open an empty Trae window
//!
//! # Environment Variables
//!
//! See the [`config`](trailhead::config) module for available options.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trailhead::config::Config;
use trailhead::editor_recents::RecentsReader;
use trailhead::history::{FileStore, HistoryStore};
use trailhead::launch::EditorLauncher;
use trailhead::reconcile::Reconciler;
use trailhead::tui::{install_panic_hook, App};
use trailhead::types::{format_age, now_millis, smart_truncate_path};

/// Trailhead - terminal launcher for the Trae editor.
///
/// Opens project folders in Trae and keeps a merged, searchable list of
/// recent projects combining local history with Trae's own recents.
#[derive(Parser, Debug)]
#[command(name = "trailhead")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    TRAILHEAD_APP               Editor application name (default: Trae)
    TRAILHEAD_APP_PATH          Application bundle (default: /Applications/Trae.app)
    TRAILHEAD_BUNDLE_ID         Bundle id for the new-window relaunch fallback
    TRAILHEAD_STATE_DIR         State directory (default: ~/.trailhead)
    TRAILHEAD_EDITOR_STORAGE    Trae's storage.json path override
    TRAILHEAD_REFRESH_MS        Picker refresh interval (default: 750)
    TRAILHEAD_BRANCH_TIMEOUT_MS Git lookup timeout per project (default: 1500)

EXAMPLES:
    # Launch the picker
    trailhead

    # Open a folder directly
    trailhead open ~/src/my-project

    # Script against the recent list
    trailhead recent --json | jq '.[].path'
")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the searchable project picker (the default).
    Pick,

    /// Open a folder or file in Trae and record it in history.
    Open {
        /// Path to open.
        path: PathBuf,
    },

    /// Print the reconciled recent-projects list.
    Recent {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Open a new, empty Trae window.
    NewWindow,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // One cooperative loop; branch lookups are interleaved futures, not
    // threads.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Pick) {
        Command::Pick => runtime.block_on(run_picker(config)),
        Command::Open { path } => {
            init_logging();
            runtime.block_on(run_open(config, path))
        }
        Command::Recent { json } => {
            init_logging();
            runtime.block_on(run_recent(config, json))
        }
        Command::NewWindow => {
            init_logging();
            runtime.block_on(run_new_window(config))
        }
    }
}

/// Builds the component graph shared by every command.
fn build(
    config: &Config,
) -> (
    HistoryStore<FileStore>,
    Reconciler<FileStore>,
    EditorLauncher<FileStore>,
) {
    let history = HistoryStore::new(FileStore::new(&config.state_dir), config.history_cap);
    let reconciler = Reconciler::new(
        history.clone(),
        RecentsReader::new(&config.editor_storage),
        Duration::from_millis(config.branch_timeout_ms),
    );
    let launcher = EditorLauncher::new(
        config.app_name.clone(),
        config.app_path.clone(),
        config.bundle_id.clone(),
        history.clone(),
    );
    (history, reconciler, launcher)
}

/// Runs the picker TUI.
async fn run_picker(config: Config) -> Result<()> {
    // The picker owns the terminal, so logging stays off here.
    install_panic_hook();

    let (history, reconciler, launcher) = build(&config);

    // Show the persisted history immediately; the first reconcile replaces
    // it once branch lookups finish.
    let mut initial = history.get();
    initial.sort_by_key(|p| std::cmp::Reverse(p.last_used));

    let app = App::new(
        reconciler,
        launcher,
        Duration::from_millis(config.refresh_ms),
        initial,
    );
    app.run().await?;
    Ok(())
}

/// Opens a single path in the editor.
async fn run_open(config: Config, path: PathBuf) -> Result<()> {
    let path = std::fs::canonicalize(&path)
        .with_context(|| format!("Not a valid path: {}", path.display()))?;
    let path = path.to_string_lossy().into_owned();

    let (_, _, launcher) = build(&config);
    launcher
        .open(&path)
        .await
        .with_context(|| format!("Failed to open {path} in {}", config.app_name))?;

    info!(path, "opened");
    Ok(())
}

/// Prints the reconciled recent list.
async fn run_recent(config: Config, json: bool) -> Result<()> {
    let (_, reconciler, _) = build(&config);
    let projects = reconciler.reconcile().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    let now = now_millis();
    for project in &projects {
        let branch = project.branch.as_deref().unwrap_or("-");
        println!(
            "{:<24} {:<20} {:<10} {}",
            project.name,
            branch,
            format_age(project.last_used, now),
            smart_truncate_path(&project.path),
        );
    }
    Ok(())
}

/// Runs the new-window fallback chain.
async fn run_new_window(config: Config) -> Result<()> {
    let (_, _, launcher) = build(&config);
    launcher
        .new_window()
        .await
        .context("Failed to open a new window")?;
    println!("New {} window opened", config.app_name);
    Ok(())
}

/// Initializes the logging subsystem for non-TUI commands.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}
