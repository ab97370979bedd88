//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Domain errors =====
    /// Catalog could not be opened or produced no usable data
    #[error("Failed to load catalog: {0}")]
    LoadFailed(String),

    /// One record could not be exported; the batch continues
    #[error("Export failed for {name}: {reason}")]
    ExportItemFailed { name: String, reason: String },

    /// Input is not a catalog
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    // ===== Ambient errors =====
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File system error: {0}")]
    Fs(#[from] app_fs::FsError),

    #[error("Image encode error: {0}")]
    ImageEncode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Build an item failure for a named record
    pub fn item_failed(name: &str, reason: impl std::fmt::Display) -> Self {
        AppError::ExportItemFailed {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::ExportItemFailed { .. }
                | AppError::InvalidRequest(_)
                | AppError::Io(_)
                | AppError::Fs(_)
                | AppError::ImageEncode(_)
        )
    }

    /// Is this a fatal error for the current attempt?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::LoadFailed(_) => "The asset catalog could not be opened.".to_string(),
            AppError::InvalidFile(path) => format!("Not an asset catalog: {}", path),
            AppError::ExportItemFailed { name, .. } => format!("Could not export {}", name),
            _ => self.to_string(),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::ImageEncode(e.to_string())
    }
}
