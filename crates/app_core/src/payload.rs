//! Export payloads and output file names

use crate::record::{Record, RecordKind};
use crate::AppError;
use app_fs::sanitize_export_name;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Edge length of the swatch written for color records
const COLOR_SWATCH_SIZE: u32 = 64;

/// File name an exported record is written under
pub fn output_file_name(record: &Record) -> String {
    let mut name = sanitize_export_name(record.name());

    if record.scale() > 1.0 {
        name.push_str(&format!("@{}x", record.scale() as i64));
    }

    format!("{}.{}", name, record.kind().file_extension())
}

/// Bytes written for `record`
pub fn encode_payload(record: &Record) -> Result<Vec<u8>, AppError> {
    let missing = |what: &str| AppError::item_failed(record.name(), format!("{} unavailable", what));

    match record.kind() {
        RecordKind::Image => {
            let bitmap = record.bitmap().ok_or_else(|| missing("bitmap"))?;
            encode_png(&bitmap)
        }
        RecordKind::Color => {
            let color = record.payload().color().ok_or_else(|| missing("color"))?;
            let swatch = RgbaImage::from_pixel(COLOR_SWATCH_SIZE, COLOR_SWATCH_SIZE, Rgba(color));
            encode_png(&swatch)
        }
        RecordKind::Gradient | RecordKind::Effect | RecordKind::Unknown => {
            let preview = record.payload().preview().ok_or_else(|| missing("preview"))?;
            encode_png(&preview)
        }
        RecordKind::VectorPdf | RecordKind::VectorSvg | RecordKind::RawData => {
            record.payload().raw_bytes().ok_or_else(|| missing("raw data"))
        }
    }
}

pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, AppError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
