//! Git branch lookup for project directories.
//!
//! One subprocess is spawned per project per refresh, so every call is
//! bounded by a caller-supplied timeout and the child is killed if the
//! future is dropped. Anything that is not a clean, non-empty answer
//! (missing git, non-repository path, detached HEAD, timeout) is `None`.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

/// Resolves the checked-out branch name for `path`, if any.
///
/// Runs `git branch --show-current` in the directory. Never returns an
/// error: every failure mode maps to `None`.
pub async fn resolve(path: &Path, timeout: Duration) -> Option<String> {
    let lookup = Command::new("git")
        .args(["branch", "--show-current"])
        .current_dir(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            debug!(path = %path.display(), error = %e, "branch lookup failed to run");
            return None;
        }
        Err(_) => {
            debug!(path = %path.display(), ?timeout, "branch lookup timed out");
            return None;
        }
    };

    if !output.status.success() {
        return None;
    }

    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if branch.is_empty() {
        // Detached HEAD prints nothing with --show-current.
        None
    } else {
        Some(branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn non_repository_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn missing_directory_yields_none() {
        assert_eq!(resolve(Path::new("/no/such/dir"), TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn zero_timeout_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), Duration::from_nanos(1)).await, None);
    }
}
