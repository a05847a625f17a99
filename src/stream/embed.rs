//! Embed fallback - hands proxy embed pages to the system browser
//!
//! Sources that need no extraction cannot be played natively; they are
//! opened through the proxy's embeddable player page instead.

use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Errors from opening an embed page
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("No URL opener found ({0})")]
    NotFound(&'static str),
    #[error("Failed to start opener: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("Opener exited with status {0}")]
    Exited(i32),
}

/// Platform command used to open URLs
pub fn opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Open `url` in the default browser
pub async fn open_in_browser(url: &str) -> Result<(), OpenError> {
    let program = opener();
    tracing::info!(%url, program, "opening embed page");

    let status = Command::new(program)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OpenError::NotFound(program)
            } else {
                OpenError::StartFailed(e)
            }
        })?;

    // explorer.exe reports 1 even on success
    if status.success() || cfg!(target_os = "windows") {
        Ok(())
    } else {
        Err(OpenError::Exited(status.code().unwrap_or(-1)))
    }
}
