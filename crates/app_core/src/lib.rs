//! CarExtractor core domain logic
//!
//! This crate contains:
//! - Catalog records and the per-load record store
//! - Filtering, selection and scale bucketing
//! - Export planning and execution
//! - Catalog loading
//! - Application state, configuration and error types

pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod guard;
pub mod loader;
pub mod payload;
pub mod planner;
pub mod record;
pub mod scale;
pub mod selection;
pub mod source;
pub mod state;
pub mod store;

pub use config::{AppConfig, ExportConfig, GeneralConfig, LoaderConfig};
pub use error::AppError;
pub use executor::{ExportEvent, ExportExecutor, ExportStatus, ExportSummary};
pub use filter::{filter_groups, visible, FilterState};
pub use guard::{FlightToken, SingleFlight};
pub use loader::{CatalogLoader, LoadProgress, Readiness};
pub use payload::{encode_payload, output_file_name};
pub use planner::{plan, ExportPlan, ExportRequest, PlanEntry};
pub use record::{Record, RecordId, RecordKind, UNKNOWN_GROUP, UNKNOWN_NAME};
pub use scale::{base_name, bucket_of, filter_for_export, ExportScaleOption, ScaleBucket, ScaleFilter};
pub use selection::{SelectionEffect, SelectionState};
pub use source::{
    CatalogOpener, CatalogSource, EmptyPayload, Idiom, RawRecord, RecordPayload, SourceGroup, SourceKey,
    SourceVariant,
};
pub use state::{AppState, ExportOverrides, LoadStatus};
pub use store::{localized_cmp, RecordStore};
