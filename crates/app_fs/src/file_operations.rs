//! File operations module
//! Destination-side operations used while exporting

use crate::{FsError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// File operations trait
pub trait FileOperations: Send + Sync {
    /// Create a directory and any missing parents. Existing directories are fine.
    fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Write `bytes` to `path`, replacing any existing file
    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Reveal a directory in the system file manager
    fn open_directory(&self, path: &Path) -> Result<()>;
}

/// Default implementation of file operations
#[derive(Debug, Clone)]
pub struct DefaultFileOperations {
    /// When false, `open_directory` only logs instead of launching a file manager
    reveal: bool,
}

impl DefaultFileOperations {
    pub fn new() -> Self {
        Self { reveal: true }
    }

    /// Build an instance that never launches an external program
    pub fn headless() -> Self {
        Self { reveal: false }
    }

    pub fn with_reveal(mut self, reveal: bool) -> Self {
        self.reveal = reveal;
        self
    }
}

impl Default for DefaultFileOperations {
    fn default() -> Self {
        Self::new()
    }
}

impl FileOperations for DefaultFileOperations {
    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            return Ok(());
        }

        if path.exists() {
            return Err(FsError::InvalidPath(format!(
                "Not a directory: {}",
                path.display()
            )));
        }

        std::fs::create_dir_all(path).map_err(|e| map_io(e, path))?;
        tracing::debug!("Created directory: {}", path.display());

        Ok(())
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::write(path, bytes).map_err(|e| map_io(e, path))?;
        tracing::trace!("Wrote {} bytes: {}", bytes.len(), path.display());
        Ok(())
    }

    #[cfg(feature = "open-external")]
    fn open_directory(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(FsError::NotFound(path.display().to_string()));
        }

        if !self.reveal {
            tracing::info!("Export destination: {}", path.display());
            return Ok(());
        }

        open::that_detached(path).map_err(|e| {
            FsError::InvalidOperation(format!("Failed to open file manager: {}", e))
        })?;

        tracing::info!("Opened in file manager: {}", path.display());
        Ok(())
    }

    #[cfg(not(feature = "open-external"))]
    fn open_directory(&self, path: &Path) -> Result<()> {
        tracing::info!("Export destination: {}", path.display());
        Ok(())
    }
}

fn map_io(e: std::io::Error, path: &Path) -> FsError {
    match e.kind() {
        ErrorKind::PermissionDenied => FsError::AccessDenied(path.display().to_string()),
        ErrorKind::NotFound => FsError::NotFound(path.display().to_string()),
        _ => FsError::Io(e),
    }
}
