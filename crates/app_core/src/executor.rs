//! Export batch execution
//!
//! Runs a plan sequentially. Item failures are recorded and the batch
//! keeps going; the destination is opened exactly once at the end.

use crate::guard::{FlightToken, SingleFlight};
use crate::payload::{encode_payload, output_file_name};
use crate::planner::{ExportPlan, PlanEntry};
use crate::AppError;
use app_fs::FileOperations;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_THROTTLE_EVERY: usize = 10;
pub const DEFAULT_THROTTLE_PAUSE: Duration = Duration::from_millis(50);

/// Events emitted while a batch runs
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Started { total: usize },
    Progress { completed: usize, total: usize },
    Completed(ExportSummary),
}

/// Outcome of one batch
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub total: usize,
    pub succeeded: usize,
    /// (record name, reason)
    pub failed: Vec<(String, String)>,
    pub destination: PathBuf,
}

impl ExportSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Snapshot of the running (or last) batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStatus {
    pub in_progress: bool,
    pub total: usize,
    pub completed: usize,
}

impl ExportStatus {
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

/// Executes export plans, one at a time
#[derive(Debug, Clone)]
pub struct ExportExecutor {
    guard: SingleFlight,
    status: Arc<RwLock<ExportStatus>>,
    throttle_every: usize,
    throttle_pause: Duration,
}

impl Default for ExportExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_EVERY, DEFAULT_THROTTLE_PAUSE)
    }
}

impl ExportExecutor {
    pub fn new(throttle_every: usize, throttle_pause: Duration) -> Self {
        Self {
            guard: SingleFlight::new(),
            status: Arc::new(RwLock::new(ExportStatus::default())),
            throttle_every,
            throttle_pause,
        }
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_active()
    }

    /// Updated after every item, readable while the batch runs
    pub fn status(&self) -> ExportStatus {
        *self.status.read()
    }

    /// Claim the executor ahead of `run_claimed`
    pub fn try_claim(&self) -> Option<FlightToken> {
        self.guard.try_acquire()
    }

    /// Run `plan`. Returns `None` without writing or emitting anything when
    /// another batch is already running.
    pub async fn run(
        &self,
        plan: ExportPlan,
        ops: &dyn FileOperations,
        events: &mpsc::UnboundedSender<ExportEvent>,
    ) -> Option<ExportSummary> {
        let Some(token) = self.try_claim() else {
            tracing::debug!("Export already running, request dropped");
            return None;
        };
        Some(self.run_claimed(token, plan, ops, events).await)
    }

    /// Run `plan` with an already claimed token
    pub async fn run_claimed(
        &self,
        token: FlightToken,
        plan: ExportPlan,
        ops: &dyn FileOperations,
        events: &mpsc::UnboundedSender<ExportEvent>,
    ) -> ExportSummary {
        let total = plan.len();
        tracing::info!(total, root = %plan.root.display(), "Export started");
        *self.status.write() = ExportStatus {
            in_progress: true,
            total,
            completed: 0,
        };
        let _ = events.send(ExportEvent::Started { total });

        let mut succeeded = 0;
        let mut failed = Vec::new();

        for (index, entry) in plan.entries.iter().enumerate() {
            match export_entry(entry, ops) {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    tracing::warn!(
                        record = entry.record.name(),
                        dir = %entry.target_dir.display(),
                        "Export item failed: {}",
                        e
                    );
                    failed.push((entry.record.name().to_string(), e.to_string()));
                }
            }

            let completed = index + 1;
            self.status.write().completed = completed;
            let _ = events.send(ExportEvent::Progress { completed, total });

            if self.throttle_every > 0 && completed % self.throttle_every == 0 && completed < total {
                tokio::time::sleep(self.throttle_pause).await;
            } else {
                // Let listeners on the same task see this item
                tokio::task::yield_now().await;
            }
        }

        drop(token);
        self.status.write().in_progress = false;

        let summary = ExportSummary {
            total,
            succeeded,
            failed,
            destination: plan.root.clone(),
        };

        tracing::info!(
            total,
            succeeded,
            failed = summary.failed.len(),
            "Export completed"
        );

        if let Err(e) = ops.open_directory(&plan.root) {
            tracing::warn!("Failed to open destination {}: {}", plan.root.display(), e);
        }

        let _ = events.send(ExportEvent::Completed(summary.clone()));
        summary
    }
}

fn export_entry(entry: &PlanEntry, ops: &dyn FileOperations) -> Result<(), AppError> {
    let record = &entry.record;
    ops.ensure_dir(&entry.target_dir)
        .map_err(|e| AppError::item_failed(record.name(), e))?;

    let bytes = encode_payload(record)?;
    let path = entry.target_dir.join(output_file_name(record));
    ops.write_file(&path, &bytes)
        .map_err(|e| AppError::item_failed(record.name(), e))?;

    tracing::trace!(path = %path.display(), bytes = bytes.len(), "Wrote export item");
    Ok(())
}
