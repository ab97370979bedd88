//! Catalog records

use crate::source::{EmptyPayload, Idiom, RawRecord, RecordPayload, SourceKey, SourceVariant};
use image::RgbaImage;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Group name used when a record's owner cannot be found
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Name used when the source reports none
pub const UNKNOWN_NAME: &str = "Unknown";

/// Load-scoped record identifier. Not stable across reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Closed classification of a record's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "color")]
    Color,
    #[serde(rename = "gradient")]
    Gradient,
    #[serde(rename = "effect")]
    Effect,
    #[serde(rename = "pdf")]
    VectorPdf,
    #[serde(rename = "svg")]
    VectorSvg,
    #[serde(rename = "rawData")]
    RawData,
    #[serde(rename = "unknown")]
    Unknown,
}

impl RecordKind {
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Image,
        RecordKind::Color,
        RecordKind::Gradient,
        RecordKind::Effect,
        RecordKind::VectorPdf,
        RecordKind::VectorSvg,
        RecordKind::RawData,
        RecordKind::Unknown,
    ];

    pub fn from_variant(variant: SourceVariant) -> Self {
        match variant {
            SourceVariant::Bitmap => RecordKind::Image,
            SourceVariant::Color | SourceVariant::ThemeColor => RecordKind::Color,
            SourceVariant::Gradient => RecordKind::Gradient,
            SourceVariant::Effect => RecordKind::Effect,
            SourceVariant::Pdf => RecordKind::VectorPdf,
            SourceVariant::Svg => RecordKind::VectorSvg,
            SourceVariant::RawData => RecordKind::RawData,
            SourceVariant::Other => RecordKind::Unknown,
        }
    }

    /// Whether records of this kind can carry a resolution variant at all
    pub fn has_scale_concept(self) -> bool {
        match self {
            RecordKind::VectorPdf
            | RecordKind::VectorSvg
            | RecordKind::Color
            | RecordKind::Gradient
            | RecordKind::Effect => false,
            RecordKind::Image | RecordKind::RawData | RecordKind::Unknown => true,
        }
    }

    /// Extension of exported files.
    ///
    /// RawData is written with `.png` even though its bytes pass through untouched.
    pub fn file_extension(self) -> &'static str {
        match self {
            RecordKind::VectorPdf => "pdf",
            RecordKind::VectorSvg => "svg",
            RecordKind::Image
            | RecordKind::Color
            | RecordKind::Gradient
            | RecordKind::Effect
            | RecordKind::RawData
            | RecordKind::Unknown => "png",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Image => "image",
            RecordKind::Color => "color",
            RecordKind::Gradient => "gradient",
            RecordKind::Effect => "effect",
            RecordKind::VectorPdf => "pdf",
            RecordKind::VectorSvg => "svg",
            RecordKind::RawData => "rawData",
            RecordKind::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Image => "Images",
            RecordKind::Color => "Colors",
            RecordKind::Gradient => "Gradients",
            RecordKind::Effect => "Effects",
            RecordKind::VectorPdf => "PDF",
            RecordKind::VectorSvg => "SVG",
            RecordKind::RawData => "Raw Data",
            RecordKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown kind '{}'", s))
    }
}

/// One exportable resource.
///
/// Cloning is cheap: the payload and the replacement slot are shared, so an
/// image replacement is visible through every clone.
#[derive(Clone)]
pub struct Record {
    id: RecordId,
    name: String,
    group_name: String,
    kind: RecordKind,
    scale: f64,
    idiom: Idiom,
    source_key: SourceKey,
    pixel_size: Option<(u32, u32)>,
    payload: Arc<dyn RecordPayload>,
    replacement: Arc<RwLock<Option<RgbaImage>>>,
}

impl Record {
    /// Create a record with a fresh id and no payload
    pub fn new(name: impl Into<String>, group_name: impl Into<String>, kind: RecordKind, scale: f64) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into(),
            group_name: group_name.into(),
            kind,
            scale,
            idiom: Idiom::Universal,
            source_key: SourceKey(0),
            pixel_size: None,
            payload: Arc::new(EmptyPayload),
            replacement: Arc::new(RwLock::new(None)),
        }
    }

    /// Wrap an enumerated record
    pub fn from_raw(raw: RawRecord, group_name: String) -> Self {
        let kind = RecordKind::from_variant(raw.variant);
        let scale = if kind.has_scale_concept() && raw.scale > 0.0 {
            raw.scale
        } else {
            1.0
        };

        Record::new(raw.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()), group_name, kind, scale)
            .with_idiom(raw.idiom)
            .with_source_key(raw.key)
            .with_pixel_size(raw.pixel_size)
            .with_payload(raw.payload)
    }

    pub fn with_payload(mut self, payload: Arc<dyn RecordPayload>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_pixel_size(mut self, pixel_size: Option<(u32, u32)>) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    pub fn with_idiom(mut self, idiom: Idiom) -> Self {
        self.idiom = idiom;
        self
    }

    pub fn with_source_key(mut self, key: SourceKey) -> Self {
        self.source_key = key;
        self
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn idiom(&self) -> Idiom {
        self.idiom
    }

    pub fn source_key(&self) -> SourceKey {
        self.source_key
    }

    pub fn payload(&self) -> &dyn RecordPayload {
        self.payload.as_ref()
    }

    pub fn is_bitmap(&self) -> bool {
        self.kind == RecordKind::Image
    }

    /// Pixel dimensions, reflecting any replaced image
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        if let Some(img) = self.replacement.read().as_ref() {
            return Some(img.dimensions());
        }
        self.pixel_size
    }

    /// False for scale-less kinds and for 1x (or smaller) bitmaps
    pub fn has_scale_identifier(&self) -> bool {
        self.kind.has_scale_concept() && self.scale > 1.0
    }

    /// "@2x", "@3x", or empty for 1x
    pub fn scale_text(&self) -> String {
        let s = self.scale as i64;
        if s > 1 {
            format!("@{}x", s)
        } else {
            String::new()
        }
    }

    /// "W × H" for records with known pixel size
    pub fn size_text(&self) -> String {
        self.pixel_size()
            .map(|(w, h)| format!("{} × {}", w, h))
            .unwrap_or_default()
    }

    /// Current pixels of a bitmap record, preferring a replacement
    pub fn bitmap(&self) -> Option<RgbaImage> {
        if let Some(img) = self.replacement.read().as_ref() {
            return Some(img.clone());
        }
        self.payload.bitmap()
    }

    /// Replace the pixels of this record in place
    pub(crate) fn replace_bitmap(&self, image: RgbaImage) {
        *self.replacement.write() = Some(image);
    }

    /// Replaced pixels, if any
    pub fn replacement(&self) -> Option<RgbaImage> {
        self.replacement.read().clone()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("group_name", &self.group_name)
            .field("kind", &self.kind)
            .field("scale", &self.scale)
            .field("pixel_size", &self.pixel_size())
            .finish()
    }
}
