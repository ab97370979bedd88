//! Application state management
//!
//! [`AppState`] is the single owner of everything the user interacts with:
//! the loaded store, filters, selections, the staged export and the
//! status of running jobs. Every mutation goes through its methods.

use crate::executor::{ExportEvent, ExportExecutor, ExportStatus, ExportSummary};
use crate::filter::{filter_groups, visible, FilterState};
use crate::guard::SingleFlight;
use crate::loader::{CatalogLoader, LoadProgress};
use crate::planner::{plan, ExportRequest};
use crate::record::{Record, RecordId, RecordKind};
use crate::scale::{ExportScaleOption, ScaleFilter};
use crate::selection::{SelectionEffect, SelectionState};
use crate::source::{CatalogOpener, CatalogSource};
use crate::store::RecordStore;
use crate::{AppConfig, AppError};
use app_fs::{DirectoryPicker, FileOperations};
use image::RgbaImage;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Snapshot of the catalog load
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadStatus {
    pub is_loading: bool,
    pub progress: f32,
}

/// One-off export settings; unset fields fall back to the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOverrides {
    pub scale_options: Option<Vec<ExportScaleOption>>,
    pub preserve_group_structure: Option<bool>,
}

/// Main application state
pub struct AppState {
    /// Application configuration
    pub config: RwLock<AppConfig>,

    /// Current catalog snapshot; replaced wholesale on load
    store: RwLock<Arc<RecordStore>>,
    source: RwLock<Option<Arc<dyn CatalogSource>>>,

    filter: RwLock<FilterState>,
    selection: RwLock<SelectionState>,
    show_detail: RwLock<bool>,

    /// Items staged by `prepare_export_*`, consumed by `confirm_export`
    pending_export: RwLock<Option<Vec<Record>>>,

    load_guard: SingleFlight,
    load_status: RwLock<LoadStatus>,
    executor: ExportExecutor,

    last_error: RwLock<Option<String>>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: AppConfig) -> Self {
        let executor = ExportExecutor::new(config.export.throttle_every, config.export.throttle_pause());

        Self {
            config: RwLock::new(config),
            store: RwLock::new(Arc::new(RecordStore::default())),
            source: RwLock::new(None),
            filter: RwLock::new(FilterState::default()),
            selection: RwLock::new(SelectionState::new()),
            show_detail: RwLock::new(false),
            pending_export: RwLock::new(None),
            load_guard: SingleFlight::new(),
            load_status: RwLock::new(LoadStatus::default()),
            executor,
            last_error: RwLock::new(None),
        }
    }

    /// Save the current configuration
    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.read().save()
    }

    pub fn save_config_to(&self, path: &Path) -> anyhow::Result<()> {
        self.config.read().save_to(path)
    }

    // ========================================
    // Loading
    // ========================================

    /// Load a catalog and install it as the current store.
    ///
    /// Returns `Ok(None)` when a load is already running; the request is
    /// dropped. On failure the previous store stays installed.
    pub async fn load(&self, opener: &dyn CatalogOpener, path: &Path) -> Result<Option<usize>, AppError> {
        let Some(_token) = self.load_guard.try_acquire() else {
            tracing::debug!("Load already running, request dropped");
            return Ok(None);
        };

        *self.load_status.write() = LoadStatus {
            is_loading: true,
            progress: 0.0,
        };

        let loader = {
            let config = self.config.read();
            CatalogLoader::new(config.loader.completion_timeout(), config.loader.progress_batch)
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<LoadProgress>();
        let load = async move { loader.load(opener, path, &tx).await };
        let track = async {
            while let Some(p) = rx.recv().await {
                self.load_status.write().progress = p.fraction;
            }
        };
        let (result, ()) = tokio::join!(load, track);

        self.load_status.write().is_loading = false;

        match result {
            Ok((store, source)) => {
                let count = store.len();
                *self.store.write() = Arc::new(store);
                *self.source.write() = Some(source);
                *self.selection.write() = SelectionState::new();
                *self.show_detail.write() = false;
                *self.pending_export.write() = None;
                *self.last_error.write() = None;
                Ok(Some(count))
            }
            Err(e) => {
                *self.last_error.write() = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn load_status(&self) -> LoadStatus {
        *self.load_status.read()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Current store. Holders keep a consistent snapshot across reloads.
    pub fn store(&self) -> Arc<RecordStore> {
        Arc::clone(&self.store.read())
    }

    pub fn has_catalog(&self) -> bool {
        self.source.read().is_some()
    }

    // ========================================
    // Filtering
    // ========================================

    pub fn filter(&self) -> FilterState {
        self.filter.read().clone()
    }

    pub fn set_filter(&self, state: FilterState) {
        *self.filter.write() = state;
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.filter.write().search_text = text.into();
    }

    pub fn set_kind_filter(&self, kind: Option<RecordKind>) {
        self.filter.write().kind = kind;
    }

    pub fn set_scale_filter(&self, scale: ScaleFilter) {
        self.filter.write().scale = scale;
    }

    pub fn set_group_filter(&self, group: Option<String>) {
        self.filter.write().group = group;
    }

    pub fn set_group_search_text(&self, text: impl Into<String>) {
        self.filter.write().group_search_text = text.into();
    }

    /// Records passing the current filters, in store order
    pub fn visible_records(&self) -> Vec<Record> {
        let store = self.store();
        let filter = self.filter.read();
        visible(store.records(), &filter).into_iter().cloned().collect()
    }

    /// Groups offered for multi-selection
    pub fn filtered_groups(&self) -> Vec<String> {
        let groups = self.store().groups();
        filter_groups(&groups, &self.filter.read().group_search_text)
    }

    // ========================================
    // Selection
    // ========================================

    pub fn select_only(&self, id: RecordId) {
        let effect = self.selection.write().select_only(id);
        self.apply_effect(effect);
    }

    pub fn toggle_selection(&self, id: RecordId) {
        let effect = self.selection.write().toggle(id);
        self.apply_effect(effect);
    }

    pub fn extend_selection(&self, id: RecordId) {
        let effect = self.selection.write().extend(id);
        self.apply_effect(effect);
    }

    pub fn clear_selection(&self) {
        self.selection.write().clear_items();
    }

    fn apply_effect(&self, effect: SelectionEffect) {
        if effect == SelectionEffect::ShowDetail {
            *self.show_detail.write() = true;
        }
    }

    pub fn show_detail(&self) -> bool {
        *self.show_detail.read()
    }

    pub fn set_show_detail(&self, show: bool) {
        *self.show_detail.write() = show;
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selection.read().is_selected(id)
    }

    pub fn selected_records(&self) -> Vec<Record> {
        let store = self.store();
        self.selection.read().selected_records(&store)
    }

    pub fn toggle_group(&self, name: &str) {
        self.selection.write().toggle_group(name);
    }

    pub fn select_all_groups(&self) {
        let candidates = self.filtered_groups();
        self.selection.write().select_all_groups(&candidates);
    }

    pub fn invert_groups(&self) {
        let candidates = self.filtered_groups();
        self.selection.write().invert_groups(&candidates);
    }

    pub fn clear_groups(&self) {
        self.selection.write().clear_groups();
    }

    pub fn is_group_selected(&self, name: &str) -> bool {
        self.selection.read().is_group_selected(name)
    }

    pub fn selected_groups(&self) -> Vec<String> {
        self.selection.read().selected_groups().iter().cloned().collect()
    }

    // ========================================
    // Counts
    // ========================================

    pub fn total_count(&self) -> usize {
        self.store().len()
    }

    pub fn filtered_count(&self) -> usize {
        let store = self.store();
        let filter = self.filter.read();
        visible(store.records(), &filter).len()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.read().selected_count()
    }

    pub fn count_of_kind(&self, kind: RecordKind) -> usize {
        self.store().count_of_kind(kind)
    }

    pub fn count_in_group(&self, name: &str) -> usize {
        self.store().count_in_group(name)
    }

    /// One-line summary for a status bar
    pub fn status_text(&self) -> String {
        let selected = self.selected_count();
        if selected > 0 {
            return format!("{} selected", selected);
        }

        let total = self.total_count();
        let filtered = self.filtered_count();
        if filtered == total {
            format!("{} items", total)
        } else {
            format!("{} of {} shown", filtered, total)
        }
    }

    // ========================================
    // Export
    // ========================================

    pub fn prepare_export_selected(&self) -> bool {
        self.stage(self.selected_records())
    }

    pub fn prepare_export_all(&self) -> bool {
        self.stage(self.store().records().to_vec())
    }

    pub fn prepare_export_kind(&self, kind: RecordKind) -> bool {
        self.stage(self.store().records_of_kind(kind))
    }

    pub fn prepare_export_group(&self, name: &str) -> bool {
        self.stage(self.store().group_records(name))
    }

    pub fn prepare_export_selected_groups(&self) -> bool {
        let store = self.store();
        let items = store.records_in_groups(self.selection.read().selected_groups());
        self.stage(items)
    }

    /// Stage `items` for export; nothing happens when there is nothing to export
    fn stage(&self, items: Vec<Record>) -> bool {
        if items.is_empty() {
            tracing::debug!("Nothing to export");
            return false;
        }
        tracing::debug!(count = items.len(), "Export staged");
        *self.pending_export.write() = Some(items);
        true
    }

    pub fn pending_export_count(&self) -> usize {
        self.pending_export.read().as_ref().map_or(0, Vec::len)
    }

    pub fn cancel_export(&self) {
        *self.pending_export.write() = None;
    }

    /// Ask for a destination and export the staged items. Options not set
    /// in `overrides` come from the configuration; only the chosen
    /// destination is remembered. `Ok(None)` when nothing was staged, the
    /// picker was dismissed or another export is running.
    pub async fn confirm_export(
        &self,
        picker: &dyn DirectoryPicker,
        ops: &dyn FileOperations,
        overrides: &ExportOverrides,
        events: Option<&mpsc::UnboundedSender<ExportEvent>>,
    ) -> Result<Option<ExportSummary>, AppError> {
        let Some(items) = self.pending_export.write().take() else {
            return Ok(None);
        };

        let Some(root) = picker.pick_directory() else {
            tracing::info!("Export cancelled, no destination chosen");
            return Ok(None);
        };

        let (options, preserve) = {
            let mut config = self.config.write();
            config.export.last_destination = Some(root.clone());
            let options = match &overrides.scale_options {
                Some(options) if !options.is_empty() => options.clone(),
                _ => config.export.scale_options(),
            };
            let preserve = overrides
                .preserve_group_structure
                .unwrap_or(config.export.preserve_group_structure);
            (options, preserve)
        };

        let request = ExportRequest::new(items, options, preserve)?;
        Ok(self.export(&request, &root, ops, events).await)
    }

    /// Plan and run `request` below `root`. `None` when another export is running.
    pub async fn export(
        &self,
        request: &ExportRequest,
        root: &Path,
        ops: &dyn FileOperations,
        events: Option<&mpsc::UnboundedSender<ExportEvent>>,
    ) -> Option<ExportSummary> {
        let Some(token) = self.executor.try_claim() else {
            tracing::debug!("Export already running, request dropped");
            return None;
        };

        let export_plan = plan(request, root);
        let summary = match events {
            Some(events) => self.executor.run_claimed(token, export_plan, ops, events).await,
            None => {
                let (tx, _rx) = mpsc::unbounded_channel();
                self.executor.run_claimed(token, export_plan, ops, &tx).await
            }
        };

        if !summary.all_succeeded() {
            *self.last_error.write() = Some(format!(
                "{} of {} items could not be exported",
                summary.failed.len(),
                summary.total
            ));
        }
        Some(summary)
    }

    /// Live while a batch runs
    pub fn export_status(&self) -> ExportStatus {
        self.executor.status()
    }

    pub fn last_destination(&self) -> Option<PathBuf> {
        self.config.read().export.last_destination.clone()
    }

    // ========================================
    // Editing
    // ========================================

    /// Replace the pixels of an image record in place
    pub fn replace_image(&self, id: RecordId, image: RgbaImage) -> Result<(), AppError> {
        let store = self.store();
        let record = store
            .get(id)
            .ok_or_else(|| AppError::InvalidRequest(format!("no record {}", id)))?;

        if record.kind() != RecordKind::Image {
            return Err(AppError::InvalidRequest(format!(
                "{} is a {}, only images can be replaced",
                record.name(),
                record.kind().label()
            )));
        }

        tracing::info!(name = record.name(), "Image replaced");
        record.replace_bitmap(image);
        Ok(())
    }

    /// Hand every replaced image to the source. Returns how many were written.
    pub fn save(&self) -> Result<usize, AppError> {
        let source = self
            .source
            .read()
            .clone()
            .ok_or_else(|| AppError::InvalidRequest("no catalog loaded".to_string()))?;

        let replacements: Vec<_> = self
            .store()
            .records()
            .iter()
            .filter_map(|r| r.replacement().map(|img| (r.source_key(), img)))
            .collect();

        if replacements.is_empty() {
            return Ok(0);
        }

        source.write_back(&replacements)?;
        tracing::info!(count = replacements.len(), "Replacements saved");
        Ok(replacements.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Idiom, RawRecord, RecordPayload, SourceGroup, SourceKey, SourceVariant};
    use app_fs::{DefaultFileOperations, FixedDirectory};
    use image::Rgba;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    struct Pixels;

    impl RecordPayload for Pixels {
        fn bitmap(&self) -> Option<RgbaImage> {
            Some(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])))
        }
    }

    /// In-memory catalog: (key, name, group, variant, scale)
    #[derive(Default)]
    struct MemorySource {
        entries: Vec<(u64, &'static str, &'static str, SourceVariant, f64)>,
        written: Mutex<Vec<SourceKey>>,
    }

    impl CatalogSource for MemorySource {
        fn records(&self) -> Result<Vec<RawRecord>, AppError> {
            Ok(self
                .entries
                .iter()
                .map(|(key, name, _, variant, scale)| RawRecord {
                    key: SourceKey(*key),
                    name: Some(name.to_string()),
                    variant: *variant,
                    scale: *scale,
                    idiom: Idiom::Universal,
                    pixel_size: Some((4, 4)),
                    payload: Arc::new(Pixels),
                })
                .collect())
        }

        fn groups(&self) -> Vec<SourceGroup> {
            let mut groups: Vec<SourceGroup> = Vec::new();
            for (key, _, group, _, _) in &self.entries {
                match groups.iter_mut().find(|g| g.name == *group) {
                    Some(g) => g.members.push(SourceKey(*key)),
                    None => groups.push(SourceGroup {
                        name: group.to_string(),
                        members: vec![SourceKey(*key)],
                    }),
                }
            }
            groups
        }

        fn take_completion(&self) -> Option<oneshot::Receiver<()>> {
            None
        }

        fn write_back(&self, replacements: &[(SourceKey, RgbaImage)]) -> Result<(), AppError> {
            self.written
                .lock()
                .extend(replacements.iter().map(|(key, _)| *key));
            Ok(())
        }
    }

    struct MemoryOpener(Option<Arc<MemorySource>>);

    impl CatalogOpener for MemoryOpener {
        fn open(&self, path: &Path) -> Result<Arc<dyn CatalogSource>, AppError> {
            match &self.0 {
                Some(source) => Ok(Arc::clone(source) as Arc<dyn CatalogSource>),
                None => Err(AppError::InvalidFile(path.display().to_string())),
            }
        }
    }

    fn catalog() -> Arc<MemorySource> {
        Arc::new(MemorySource {
            entries: vec![
                (1, "icon", "Toolbar", SourceVariant::Bitmap, 1.0),
                (2, "icon@2x", "Toolbar", SourceVariant::Bitmap, 2.0),
                (3, "icon@3x", "Toolbar", SourceVariant::Bitmap, 3.0),
                (4, "tint", "Colors", SourceVariant::Color, 1.0),
                (5, "logo", "Brand", SourceVariant::Pdf, 1.0),
            ],
            ..Default::default()
        })
    }

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.export.throttle_pause_ms = 0;
        config
    }

    async fn loaded() -> (AppState, Arc<MemorySource>) {
        let source = catalog();
        let state = AppState::new(quiet_config());
        let count = state
            .load(&MemoryOpener(Some(Arc::clone(&source))), Path::new("Assets.car"))
            .await
            .unwrap();
        assert_eq!(count, Some(5));
        (state, source)
    }

    fn id_of(state: &AppState, name: &str) -> RecordId {
        state
            .store()
            .records()
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.id())
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_installs_store() {
        let (state, _) = loaded().await;
        assert!(state.has_catalog());
        assert_eq!(state.load_status(), LoadStatus { is_loading: false, progress: 1.0 });
        assert_eq!(state.store().groups(), vec!["Brand", "Colors", "Toolbar"]);
        assert_eq!(state.status_text(), "5 items");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_store() {
        let (state, _) = loaded().await;
        let before = state.store();

        let err = state
            .load(&MemoryOpener(None), Path::new("broken.car"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LoadFailed(_)));
        assert!(Arc::ptr_eq(&before, &state.store()));
        assert!(state.last_error().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_load_dropped() {
        let state = AppState::new(quiet_config());
        let _token = state.load_guard.try_acquire().unwrap();
        let result = state
            .load(&MemoryOpener(Some(catalog())), Path::new("Assets.car"))
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(state.store().is_empty());
    }

    #[tokio::test]
    async fn test_reload_resets_selection_but_keeps_filters() {
        let (state, source) = loaded().await;
        state.set_search_text("icon");
        state.select_only(id_of(&state, "icon"));
        assert!(state.show_detail());
        assert_eq!(state.status_text(), "1 selected");

        state
            .load(&MemoryOpener(Some(source)), Path::new("Assets.car"))
            .await
            .unwrap();

        assert_eq!(state.selected_count(), 0);
        assert!(!state.show_detail());
        assert_eq!(state.filter().search_text, "icon");
        assert_eq!(state.status_text(), "3 of 5 shown");
    }

    #[tokio::test]
    async fn test_filters_compose() {
        let (state, _) = loaded().await;
        state.set_kind_filter(Some(RecordKind::Image));
        state.set_scale_filter(ScaleFilter::X2);

        let names: Vec<String> = state.visible_records().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["icon@2x"]);

        state.set_scale_filter(ScaleFilter::NoIdentifier);
        state.set_kind_filter(None);
        let names: Vec<String> = state.visible_records().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["icon", "logo", "tint"]);
    }

    #[tokio::test]
    async fn test_group_selection_over_filtered_candidates() {
        let (state, _) = loaded().await;
        state.toggle_group("Brand");
        state.set_group_search_text("o");
        assert_eq!(state.filtered_groups(), vec!["Colors", "Toolbar"]);

        state.invert_groups();
        assert_eq!(state.selected_groups(), vec!["Brand", "Colors", "Toolbar"]);

        state.invert_groups();
        assert_eq!(state.selected_groups(), vec!["Brand"]);

        state.select_all_groups();
        state.clear_groups();
        assert!(state.selected_groups().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_export_is_noop_when_empty() {
        let (state, _) = loaded().await;
        assert!(!state.prepare_export_selected());
        assert!(!state.prepare_export_group("Nope"));
        assert!(!state.prepare_export_kind(RecordKind::VectorSvg));
        assert_eq!(state.pending_export_count(), 0);

        assert!(state.prepare_export_kind(RecordKind::Image));
        assert_eq!(state.pending_export_count(), 3);
    }

    #[tokio::test]
    async fn test_confirm_export_writes_to_picked_directory() {
        let (state, _) = loaded().await;
        state.config.write().export.default_scale_options = vec![ExportScaleOption::HighestOnly];
        state.toggle_group("Toolbar");
        assert!(state.prepare_export_selected_groups());

        let dir = tempfile::tempdir().unwrap();
        let picker = FixedDirectory(Some(dir.path().to_path_buf()));
        let summary = state
            .confirm_export(&picker, &DefaultFileOperations::headless(), &ExportOverrides::default(), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.total, 1);
        assert!(dir.path().join("icon@3x@3x.png").is_file());
        assert_eq!(state.pending_export_count(), 0);
        assert_eq!(state.last_destination(), Some(dir.path().to_path_buf()));

        let status = state.export_status();
        assert!(!status.in_progress);
        assert_eq!(status.progress(), 1.0);
    }

    #[tokio::test]
    async fn test_dismissed_picker_cancels() {
        let (state, _) = loaded().await;
        assert!(state.prepare_export_all());
        let result = state
            .confirm_export(
                &FixedDirectory(None),
                &DefaultFileOperations::headless(),
                &ExportOverrides::default(),
                None,
            )
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(state.pending_export_count(), 0);
    }

    #[tokio::test]
    async fn test_export_rejected_while_running() {
        let (state, _) = loaded().await;
        let dir = tempfile::tempdir().unwrap();
        let request = ExportRequest::new(state.store().records().to_vec(), [ExportScaleOption::All], false).unwrap();

        let _token = state.executor.try_claim().unwrap();
        let result = state
            .export(&request, dir.path(), &DefaultFileOperations::headless(), None)
            .await;

        assert!(result.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_replace_image_and_save() {
        let (state, source) = loaded().await;

        let tint = id_of(&state, "tint");
        let err = state.replace_image(tint, RgbaImage::new(1, 1)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));

        let icon = id_of(&state, "icon@2x");
        state.replace_image(icon, RgbaImage::new(8, 6)).unwrap();
        let record = state.store().get(icon).cloned().unwrap();
        assert_eq!(record.pixel_size(), Some((8, 6)));
        assert_eq!(record.name(), "icon@2x");

        assert_eq!(state.save().unwrap(), 1);
        assert_eq!(source.written.lock().as_slice(), &[SourceKey(2)]);
    }

    #[tokio::test]
    async fn test_filter_matching_everything_reads_as_unfiltered() {
        let (state, _) = loaded().await;
        state.set_search_text("o");
        assert_eq!(state.filtered_count(), 5);
        assert_eq!(state.status_text(), "5 items");
    }

    #[tokio::test]
    async fn test_export_overrides_are_not_persisted() {
        let (state, _) = loaded().await;
        assert!(state.prepare_export_group("Toolbar"));

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let overrides = ExportOverrides {
            scale_options: Some(vec![ExportScaleOption::Only2x]),
            preserve_group_structure: Some(true),
        };
        let summary = state
            .confirm_export(
                &FixedDirectory(Some(out.clone())),
                &DefaultFileOperations::headless(),
                &overrides,
                None,
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.total, 1);
        assert!(out.join("Toolbar").join("icon@2x@2x.png").is_file());

        let config_path = dir.path().join("config.toml");
        state.save_config_to(&config_path).unwrap();
        let saved = AppConfig::load_from(&config_path).unwrap();
        assert_eq!(saved.export.default_scale_options, vec![ExportScaleOption::All]);
        assert!(!saved.export.preserve_group_structure);
        assert_eq!(saved.export.last_destination, Some(out));
    }

    /// Records the state's export status whenever a directory is prepared
    struct StatusSpy<'a> {
        state: &'a AppState,
        seen: Mutex<Vec<ExportStatus>>,
    }

    impl FileOperations for StatusSpy<'_> {
        fn ensure_dir(&self, _path: &Path) -> app_fs::Result<()> {
            self.seen.lock().push(self.state.export_status());
            Ok(())
        }

        fn write_file(&self, _path: &Path, _bytes: &[u8]) -> app_fs::Result<()> {
            Ok(())
        }

        fn open_directory(&self, _path: &Path) -> app_fs::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_export_status_visible_while_running() {
        let (state, _) = loaded().await;
        let request = ExportRequest::new(
            state.store().records_of_kind(RecordKind::Image),
            [ExportScaleOption::All],
            false,
        )
        .unwrap();
        let spy = StatusSpy {
            state: &state,
            seen: Mutex::new(Vec::new()),
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        let summary = state.export(&request, Path::new("/out"), &spy, Some(&tx)).await.unwrap();
        assert_eq!(summary.total, 3);

        let expected: Vec<ExportStatus> = (0..3)
            .map(|completed| ExportStatus {
                in_progress: true,
                total: 3,
                completed,
            })
            .collect();
        assert_eq!(*spy.seen.lock(), expected);
        assert!(!state.export_status().in_progress);

        let mut progress = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ExportEvent::Progress { completed, .. } = event {
                progress.push(completed);
            }
        }
        assert_eq!(progress, vec![1, 2, 3]);
    }
}
