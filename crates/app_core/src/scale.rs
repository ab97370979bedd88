//! Resolution-variant classification and export-time scale filtering

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Resolution variant of a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScaleBucket {
    X1,
    X2,
    X3,
    None,
}

impl ScaleBucket {
    pub fn label(self) -> &'static str {
        match self {
            ScaleBucket::X1 => "@1x",
            ScaleBucket::X2 => "@2x",
            ScaleBucket::X3 => "@3x",
            ScaleBucket::None => "No Scale",
        }
    }
}

/// Classify a record's resolution variant.
///
/// Scale-less kinds and non-integral scales land in [`ScaleBucket::None`].
pub fn bucket_of(record: &Record) -> ScaleBucket {
    if !record.kind().has_scale_concept() {
        return ScaleBucket::None;
    }
    match record.scale() {
        s if s == 1.0 => ScaleBucket::X1,
        s if s == 2.0 => ScaleBucket::X2,
        s if s == 3.0 => ScaleBucket::X3,
        _ => ScaleBucket::None,
    }
}

/// Scale filter applied to the visible list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScaleFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1x")]
    X1,
    #[serde(rename = "2x")]
    X2,
    #[serde(rename = "3x")]
    X3,
    #[serde(rename = "none")]
    NoIdentifier,
}

impl ScaleFilter {
    pub fn matches(self, record: &Record) -> bool {
        match self {
            ScaleFilter::All => true,
            ScaleFilter::X1 => record.scale() == 1.0,
            ScaleFilter::X2 => record.scale() == 2.0,
            ScaleFilter::X3 => record.scale() == 3.0,
            ScaleFilter::NoIdentifier => !record.has_scale_identifier(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleFilter::All => "all",
            ScaleFilter::X1 => "1x",
            ScaleFilter::X2 => "2x",
            ScaleFilter::X3 => "3x",
            ScaleFilter::NoIdentifier => "none",
        }
    }
}

impl FromStr for ScaleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ScaleFilter::All),
            "1x" | "@1x" => Ok(ScaleFilter::X1),
            "2x" | "@2x" => Ok(ScaleFilter::X2),
            "3x" | "@3x" => Ok(ScaleFilter::X3),
            "none" | "no-identifier" => Ok(ScaleFilter::NoIdentifier),
            _ => Err(format!("unknown scale filter '{}'", s)),
        }
    }
}

/// Resolution option requested for an export.
///
/// Declaration order is the canonical planning order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExportScaleOption {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1x")]
    Only1x,
    #[serde(rename = "2x")]
    Only2x,
    #[serde(rename = "3x")]
    Only3x,
    #[serde(rename = "2x+3x")]
    TwoAndThreeX,
    #[serde(rename = "highest")]
    HighestOnly,
}

impl ExportScaleOption {
    pub const ALL: [ExportScaleOption; 6] = [
        ExportScaleOption::All,
        ExportScaleOption::Only1x,
        ExportScaleOption::Only2x,
        ExportScaleOption::Only3x,
        ExportScaleOption::TwoAndThreeX,
        ExportScaleOption::HighestOnly,
    ];

    /// Subdirectory used when several options are exported at once
    pub fn dir_name(self) -> &'static str {
        match self {
            ExportScaleOption::All => "All",
            ExportScaleOption::Only1x => "Only-1x",
            ExportScaleOption::Only2x => "Only-2x",
            ExportScaleOption::Only3x => "Only-3x",
            ExportScaleOption::TwoAndThreeX => "TwoAndThreeX",
            ExportScaleOption::HighestOnly => "HighestOnly",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportScaleOption::All => "all",
            ExportScaleOption::Only1x => "1x",
            ExportScaleOption::Only2x => "2x",
            ExportScaleOption::Only3x => "3x",
            ExportScaleOption::TwoAndThreeX => "2x+3x",
            ExportScaleOption::HighestOnly => "highest",
        }
    }

    /// Per-record predicate. HighestOnly needs the whole set, see [`filter_for_export`].
    pub fn matches(self, scale: f64) -> bool {
        match self {
            ExportScaleOption::All | ExportScaleOption::HighestOnly => true,
            ExportScaleOption::Only1x => scale == 1.0,
            ExportScaleOption::Only2x => scale == 2.0,
            ExportScaleOption::Only3x => scale == 3.0,
            ExportScaleOption::TwoAndThreeX => scale == 2.0 || scale == 3.0,
        }
    }
}

impl fmt::Display for ExportScaleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportScaleOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportScaleOption::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s) || o.dir_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown export scale '{}'", s))
    }
}

/// Name with the "@2x" and "@3x" markers removed
pub fn base_name(name: &str) -> String {
    name.replace("@2x", "").replace("@3x", "")
}

/// Records that an export with `option` should write
pub fn filter_for_export(records: &[Record], option: ExportScaleOption) -> Vec<Record> {
    match option {
        ExportScaleOption::HighestOnly => highest_only(records),
        _ => records
            .iter()
            .filter(|r| option.matches(r.scale()))
            .cloned()
            .collect(),
    }
}

/// Keep the highest scale per base name; the first record wins ties.
/// Output follows the first appearance of each base name.
fn highest_only(records: &[Record]) -> Vec<Record> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Record> = Vec::new();

    for record in records {
        let base = base_name(record.name());
        match slots.get(&base) {
            Some(&idx) => {
                if record.scale() > kept[idx].scale() {
                    kept[idx] = record.clone();
                }
            }
            None => {
                slots.insert(base, kept.len());
                kept.push(record.clone());
            }
        }
    }

    kept
}
