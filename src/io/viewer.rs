use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Why a document could not be shown. Never affects the outcome of a sale.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Could not open file: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Something that can show a file to the operator.
pub trait Viewer {
    /// Hand the file over and return without waiting for the viewer to close.
    fn open(&self, path: &Path) -> Result<(), LaunchError>;
}

/// Opens files with the host's default application.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemViewer;

impl SystemViewer {
    fn command(path: &Path) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        if !path.exists() {
            return Err(LaunchError::NotFound(path.to_path_buf()));
        }

        let child = Self::command(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        debug!(pid = child.id(), path = %path.display(), "launched viewer");
        Ok(())
    }
}
