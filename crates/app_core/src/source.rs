//! Catalog source capability
//!
//! The archive decoder lives outside this crate. It is consumed through
//! [`CatalogOpener`] and [`CatalogSource`]; per-record pixel and byte access
//! goes through [`RecordPayload`].

use crate::AppError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::oneshot;

/// The source's own handle for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey(pub u64);

/// Record variant as reported by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceVariant {
    Bitmap,
    Color,
    ThemeColor,
    Gradient,
    Effect,
    Pdf,
    Svg,
    RawData,
    Other,
}

/// Device family a record targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Idiom {
    #[default]
    Universal,
    Phone,
    Pad,
    Tv,
    CarPlay,
    Watch,
    Marketing,
    Unknown,
}

impl Idiom {
    pub fn label(self) -> &'static str {
        match self {
            Idiom::Universal => "Universal",
            Idiom::Phone => "iPhone",
            Idiom::Pad => "iPad",
            Idiom::Tv => "Apple TV",
            Idiom::CarPlay => "CarPlay",
            Idiom::Watch => "Watch",
            Idiom::Marketing => "Marketing",
            Idiom::Unknown => "Unknown",
        }
    }
}

/// Lazily produces the bytes behind a record.
///
/// Every accessor may return `None`; the export path turns that into an
/// item failure.
pub trait RecordPayload: Send + Sync {
    /// Decoded pixels of a bitmap record
    fn bitmap(&self) -> Option<RgbaImage> {
        None
    }

    /// RGBA color of a color record
    fn color(&self) -> Option<[u8; 4]> {
        None
    }

    /// Rendered preview for kinds without a native pixel buffer
    fn preview(&self) -> Option<RgbaImage> {
        None
    }

    /// Undecoded bytes for vector and raw records
    fn raw_bytes(&self) -> Option<Vec<u8>> {
        None
    }
}

/// Payload that has nothing to offer
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyPayload;

impl RecordPayload for EmptyPayload {}

/// One enumerated record, before group resolution
pub struct RawRecord {
    pub key: SourceKey,
    pub name: Option<String>,
    pub variant: SourceVariant,
    pub scale: f64,
    pub idiom: Idiom,
    pub pixel_size: Option<(u32, u32)>,
    pub payload: Arc<dyn RecordPayload>,
}

/// A named group and the records it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroup {
    pub name: String,
    pub members: Vec<SourceKey>,
}

/// An opened catalog
pub trait CatalogSource: Send + Sync {
    /// All records currently known to the decoder
    fn records(&self) -> Result<Vec<RawRecord>, AppError>;

    /// Group listing used to resolve each record's group name
    fn groups(&self) -> Vec<SourceGroup>;

    /// One-shot "enumeration finished" signal. Best-effort: it may never fire,
    /// and it can only be taken once.
    fn take_completion(&self) -> Option<oneshot::Receiver<()>>;

    /// Persist replaced bitmaps back to the archive
    fn write_back(&self, replacements: &[(SourceKey, RgbaImage)]) -> Result<(), AppError> {
        let _ = replacements;
        Err(AppError::InvalidFile("catalog is read-only".to_string()))
    }
}

/// Opens catalog files
pub trait CatalogOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Arc<dyn CatalogSource>, AppError>;
}
