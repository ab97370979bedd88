//! CarExtractor File System Layer
//!
//! Provides the file-system capabilities the export engine consumes:
//! - Export name sanitization
//! - Destination file operations (create, write, reveal)
//! - Destination directory selection

mod sanitize;
mod file_operations;
mod picker;

pub use sanitize::{sanitize_export_name, is_valid_component};
pub use file_operations::{FileOperations, DefaultFileOperations};
pub use picker::{DirectoryPicker, FixedDirectory, PromptDirectory};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
