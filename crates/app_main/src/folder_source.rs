//! Folder-backed catalog source
//!
//! Treats a directory tree as a catalog: every subdirectory is a group and
//! every file a record. Kind comes from the extension, scale from an
//! `@2x`/`@3x` stem suffix. Enumeration runs on a worker thread and fires
//! the completion signal when it is done.

use app_core::{
    AppError, CatalogOpener, CatalogSource, Idiom, RawRecord, RecordPayload, SourceGroup, SourceKey, SourceVariant,
};
use image::{ImageFormat, ImageReader, RgbaImage};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Opens directories as catalogs
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderOpener;

impl CatalogOpener for FolderOpener {
    fn open(&self, path: &Path) -> Result<Arc<dyn CatalogSource>, AppError> {
        if !path.is_dir() {
            return Err(AppError::InvalidFile(path.display().to_string()));
        }
        Ok(Arc::new(FolderSource::spawn(path.to_path_buf())))
    }
}

#[derive(Debug, Clone)]
struct FolderEntry {
    key: SourceKey,
    path: PathBuf,
    name: String,
    /// Relative directory with `/` separators; `None` for files at the root
    group: Option<String>,
    variant: SourceVariant,
    scale: f64,
    pixel_size: Option<(u32, u32)>,
}

#[derive(Debug, Default)]
struct Scan {
    entries: Vec<FolderEntry>,
    error: Option<String>,
}

pub struct FolderSource {
    scan: Arc<RwLock<Scan>>,
    completion: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FolderSource {
    /// Start enumerating `root` in the background
    pub fn spawn(root: PathBuf) -> Self {
        let scan = Arc::new(RwLock::new(Scan::default()));
        let (done_tx, done_rx) = oneshot::channel();

        let worker_scan = Arc::clone(&scan);
        std::thread::spawn(move || {
            let mut entries = Vec::new();
            let result = scan_dir(&root, &root, &mut entries);

            {
                let mut scan = worker_scan.write();
                scan.entries = entries;
                if let Err(e) = result {
                    tracing::error!("Failed to scan {}: {}", root.display(), e);
                    scan.error = Some(e.to_string());
                }
            }

            tracing::debug!(root = %root.display(), "Folder scan finished");
            let _ = done_tx.send(());
        });

        Self {
            scan,
            completion: Mutex::new(Some(done_rx)),
        }
    }
}

impl CatalogSource for FolderSource {
    fn records(&self) -> Result<Vec<RawRecord>, AppError> {
        let scan = self.scan.read();
        if let Some(error) = &scan.error {
            return Err(AppError::LoadFailed(error.clone()));
        }

        Ok(scan
            .entries
            .iter()
            .map(|entry| RawRecord {
                key: entry.key,
                name: Some(entry.name.clone()),
                variant: entry.variant,
                scale: entry.scale,
                idiom: Idiom::Universal,
                pixel_size: entry.pixel_size,
                payload: Arc::new(FilePayload {
                    path: entry.path.clone(),
                }),
            })
            .collect())
    }

    fn groups(&self) -> Vec<SourceGroup> {
        let scan = self.scan.read();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<SourceGroup> = Vec::new();

        for entry in &scan.entries {
            let Some(group) = entry.group.as_deref() else {
                continue;
            };
            let idx = *slots.entry(group).or_insert_with(|| {
                groups.push(SourceGroup {
                    name: group.to_string(),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[idx].members.push(entry.key);
        }

        groups
    }

    fn take_completion(&self) -> Option<oneshot::Receiver<()>> {
        self.completion.lock().take()
    }

    /// Overwrite PNG files with their replacement pixels
    fn write_back(&self, replacements: &[(SourceKey, RgbaImage)]) -> Result<(), AppError> {
        let scan = self.scan.read();
        let paths: HashMap<SourceKey, &Path> = scan.entries.iter().map(|e| (e.key, e.path.as_path())).collect();

        for (key, image) in replacements {
            let path = paths
                .get(key)
                .ok_or_else(|| AppError::InvalidRequest(format!("unknown record {:?}", key)))?;

            if ImageFormat::from_path(path).ok() != Some(ImageFormat::Png) {
                return Err(AppError::InvalidFile(format!(
                    "{} is not a PNG file and cannot be rewritten",
                    path.display()
                )));
            }

            image.save_with_format(path, ImageFormat::Png)?;
            tracing::info!(path = %path.display(), "Replacement written");
        }

        Ok(())
    }
}

/// Reads a record's bytes from disk on demand
struct FilePayload {
    path: PathBuf,
}

impl RecordPayload for FilePayload {
    fn bitmap(&self) -> Option<RgbaImage> {
        match image::open(&self.path) {
            Ok(img) => Some(img.to_rgba8()),
            Err(e) => {
                tracing::warn!("Failed to decode {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn color(&self) -> Option<[u8; 4]> {
        let text = fs::read_to_string(&self.path).ok()?;
        parse_hex_color(&text)
    }

    fn raw_bytes(&self) -> Option<Vec<u8>> {
        fs::read(&self.path).ok()
    }
}

fn scan_dir(root: &Path, dir: &Path, entries: &mut Vec<FolderEntry>) -> std::io::Result<()> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| !is_hidden(p))
        .collect();
    children.sort();
    // Files first, then subdirectories
    let (dirs, files): (Vec<PathBuf>, Vec<PathBuf>) = children.into_iter().partition(|p| p.is_dir());

    for path in files {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let variant = variant_for_extension(&extension);
        let (name, scale) = split_scale_suffix(&stem);
        let pixel_size = match variant {
            SourceVariant::Bitmap => image_dimensions(&path),
            _ => None,
        };

        entries.push(FolderEntry {
            key: SourceKey(entries.len() as u64),
            group: group_of(root, &path),
            path,
            name,
            variant,
            scale,
            pixel_size,
        });
    }

    for dir in dirs {
        scan_dir(root, &dir, entries)?;
    }

    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn variant_for_extension(extension: &str) -> SourceVariant {
    match extension {
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" => SourceVariant::Bitmap,
        "color" => SourceVariant::Color,
        "pdf" => SourceVariant::Pdf,
        "svg" => SourceVariant::Svg,
        "bin" | "dat" | "json" => SourceVariant::RawData,
        _ => SourceVariant::Other,
    }
}

/// `icon@2x` -> (`icon`, 2.0)
fn split_scale_suffix(stem: &str) -> (String, f64) {
    for (suffix, scale) in [("@2x", 2.0), ("@3x", 3.0), ("@1x", 1.0)] {
        if let Some(base) = stem.strip_suffix(suffix) {
            if !base.is_empty() {
                return (base.to_string(), scale);
            }
        }
    }
    (stem.to_string(), 1.0)
}

fn group_of(root: &Path, path: &Path) -> Option<String> {
    let parent = path.parent()?.strip_prefix(root).ok()?;
    if parent.as_os_str().is_empty() {
        return None;
    }
    let parts: Vec<String> = parent
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

fn image_dimensions(path: &Path) -> Option<(u32, u32)> {
    ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// `#RRGGBB` or `#RRGGBBAA`
fn parse_hex_color(text: &str) -> Option<[u8; 4]> {
    let hex = text.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    match hex.len() {
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    fn write_png(path: &Path, w: u32, h: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])).save(path).unwrap();
    }

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_png(&root.join("Toolbar/back.png"), 8, 8);
        write_png(&root.join("Toolbar/back@2x.png"), 16, 16);
        write_png(&root.join("Toolbar/back@3x.png"), 24, 24);
        fs::create_dir_all(root.join("Toolbar/Nested")).unwrap();
        fs::write(root.join("Toolbar/Nested/logo.svg"), "<svg/>").unwrap();
        fs::write(root.join("accent.color"), "#FF800080").unwrap();
        fs::write(root.join(".DS_Store"), "junk").unwrap();
        dir
    }

    async fn opened(root: &Path) -> Arc<dyn CatalogSource> {
        let source = FolderOpener.open(root).unwrap();
        if let Some(done) = source.take_completion() {
            done.await.unwrap();
        }
        source
    }

    #[test]
    fn test_split_scale_suffix() {
        assert_eq!(split_scale_suffix("icon@3x"), ("icon".to_string(), 3.0));
        assert_eq!(split_scale_suffix("icon"), ("icon".to_string(), 1.0));
        assert_eq!(split_scale_suffix("@2x"), ("@2x".to_string(), 1.0));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000"), Some([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("FF800080\n"), Some([255, 128, 0, 128]));
        assert_eq!(parse_hex_color("#12"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_open_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Assets.car");
        fs::write(&file, b"not a folder").unwrap();
        assert!(matches!(FolderOpener.open(&file), Err(AppError::InvalidFile(_))));
    }

    #[tokio::test]
    async fn test_enumerates_records_and_groups() {
        let dir = sample_tree();
        let source = opened(dir.path()).await;

        let records = source.records().unwrap();
        assert_eq!(records.len(), 5);

        let back3 = records.iter().find(|r| r.scale == 3.0).unwrap();
        assert_eq!(back3.name.as_deref(), Some("back"));
        assert_eq!(back3.variant, SourceVariant::Bitmap);
        assert_eq!(back3.pixel_size, Some((24, 24)));
        assert_eq!(back3.payload.bitmap().map(|b| b.dimensions()), Some((24, 24)));

        let accent = records.iter().find(|r| r.name.as_deref() == Some("accent")).unwrap();
        assert_eq!(accent.variant, SourceVariant::Color);
        assert_eq!(accent.payload.color(), Some([255, 128, 0, 128]));

        let names: Vec<String> = source.groups().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Toolbar", "Toolbar/Nested"]);
        assert_eq!(source.groups()[0].members.len(), 3);
        assert!(source.take_completion().is_none());
    }

    #[tokio::test]
    async fn test_write_back_rewrites_png() {
        let dir = sample_tree();
        let source = opened(dir.path()).await;
        let records = source.records().unwrap();
        let back = records.iter().find(|r| r.scale == 1.0 && r.name.as_deref() == Some("back")).unwrap();

        source
            .write_back(&[(back.key, RgbaImage::new(5, 7))])
            .unwrap();
        assert_eq!(image_dimensions(&dir.path().join("Toolbar/back.png")), Some((5, 7)));

        let svg = records.iter().find(|r| r.variant == SourceVariant::Svg).unwrap();
        let err = source.write_back(&[(svg.key, RgbaImage::new(1, 1))]).unwrap_err();
        assert!(matches!(err, AppError::InvalidFile(_)));
    }
}
