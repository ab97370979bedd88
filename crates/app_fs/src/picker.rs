//! Destination directory selection

use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Asks the user for an export destination. `None` means the user cancelled.
pub trait DirectoryPicker: Send + Sync {
    fn pick_directory(&self) -> Option<PathBuf>;
}

/// Picker that always answers with a preset directory
#[derive(Debug, Clone)]
pub struct FixedDirectory(pub Option<PathBuf>);

impl DirectoryPicker for FixedDirectory {
    fn pick_directory(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Blocking terminal prompt
#[derive(Debug, Clone, Default)]
pub struct PromptDirectory {
    suggestion: Option<PathBuf>,
}

impl PromptDirectory {
    pub fn new(suggestion: Option<PathBuf>) -> Self {
        Self { suggestion }
    }

    /// Suggest the user's download directory
    #[cfg(feature = "open-external")]
    pub fn with_download_dir() -> Self {
        Self::new(dirs_next::download_dir())
    }

    pub fn suggestion(&self) -> Option<PathBuf> {
        self.suggestion.clone()
    }

    fn resolve(&self, answer: &str) -> Option<PathBuf> {
        let answer = answer.trim();
        if answer.is_empty() {
            return self.suggestion.clone();
        }
        Some(PathBuf::from(answer))
    }
}

impl DirectoryPicker for PromptDirectory {
    fn pick_directory(&self) -> Option<PathBuf> {
        let mut stderr = std::io::stderr();
        match &self.suggestion {
            Some(s) => {
                let _ = write!(stderr, "Choose export folder [{}]: ", s.display());
            }
            None => {
                let _ = write!(stderr, "Choose export folder: ");
            }
        }
        let _ = stderr.flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => self.resolve(&line),
        }
    }
}
