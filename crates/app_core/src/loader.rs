//! Catalog loading
//!
//! Opens a source, waits (bounded) for it to finish enumerating, resolves
//! group names and freezes the result into a sorted [`RecordStore`].

use crate::record::{Record, UNKNOWN_GROUP};
use crate::source::{CatalogOpener, CatalogSource, SourceKey};
use crate::store::RecordStore;
use crate::AppError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_PROGRESS_BATCH: usize = 100;

/// Load progress, 0.0 to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadProgress {
    pub fraction: f32,
    pub processed: usize,
    pub total: usize,
}

impl LoadProgress {
    fn milestone(fraction: f32) -> Self {
        Self {
            fraction,
            processed: 0,
            total: 0,
        }
    }
}

/// How the completion race ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Signalled,
    TimedOut,
    /// The source offered no completion signal
    Immediate,
}

#[derive(Debug, Clone)]
pub struct CatalogLoader {
    timeout: Duration,
    progress_batch: usize,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new(DEFAULT_COMPLETION_TIMEOUT, DEFAULT_PROGRESS_BATCH)
    }
}

impl CatalogLoader {
    pub fn new(timeout: Duration, progress_batch: usize) -> Self {
        Self {
            timeout,
            progress_batch: progress_batch.max(1),
        }
    }

    /// Open `path` and build a store from it
    pub async fn load(
        &self,
        opener: &dyn CatalogOpener,
        path: &Path,
        progress: &mpsc::UnboundedSender<LoadProgress>,
    ) -> Result<(RecordStore, Arc<dyn CatalogSource>), AppError> {
        tracing::info!(path = %path.display(), "Loading catalog");
        let _ = progress.send(LoadProgress::milestone(0.1));

        let source = opener.open(path).map_err(|e| {
            tracing::error!("Failed to open {}: {}", path.display(), e);
            AppError::LoadFailed(e.to_string())
        })?;
        let _ = progress.send(LoadProgress::milestone(0.2));

        let readiness = self.wait_ready(source.as_ref()).await;
        tracing::debug!(?readiness, "Catalog source ready");
        let _ = progress.send(LoadProgress::milestone(0.5));

        let store = self.build_store(Arc::clone(&source), progress).await?;
        let _ = progress.send(LoadProgress {
            fraction: 1.0,
            processed: store.len(),
            total: store.len(),
        });

        tracing::info!(
            records = store.len(),
            groups = store.groups().len(),
            "Catalog loaded"
        );
        Ok((store, source))
    }

    /// Race the completion signal against the timeout; whichever comes
    /// first lets loading continue.
    async fn wait_ready(&self, source: &dyn CatalogSource) -> Readiness {
        let Some(completion) = source.take_completion() else {
            return Readiness::Immediate;
        };

        tokio::select! {
            _ = completion => Readiness::Signalled,
            _ = tokio::time::sleep(self.timeout) => {
                tracing::warn!(
                    "Catalog completion not signalled within {:?}, continuing with what is enumerated",
                    self.timeout
                );
                Readiness::TimedOut
            }
        }
    }

    async fn build_store(
        &self,
        source: Arc<dyn CatalogSource>,
        progress: &mpsc::UnboundedSender<LoadProgress>,
    ) -> Result<RecordStore, AppError> {
        let (raw_records, groups) = tokio::task::spawn_blocking(move || {
            source.records().map(|records| (records, source.groups()))
        })
        .await
        .map_err(|e| AppError::LoadFailed(format!("enumeration task failed: {}", e)))?
        .map_err(|e| AppError::LoadFailed(e.to_string()))?;

        // First group listing a key owns it
        let mut owner: HashMap<SourceKey, String> = HashMap::new();
        for group in groups {
            for key in group.members {
                owner.entry(key).or_insert_with(|| group.name.clone());
            }
        }

        let total = raw_records.len();
        let mut records = Vec::with_capacity(total);

        for raw in raw_records {
            let group = owner
                .get(&raw.key)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string());
            records.push(Record::from_raw(raw, group));

            let processed = records.len();
            if processed % self.progress_batch == 0 {
                let _ = progress.send(LoadProgress {
                    fraction: 0.5 + 0.4 * processed as f32 / total as f32,
                    processed,
                    total,
                });
            }
        }

        Ok(RecordStore::from_unsorted(records))
    }
}
