//! Command handlers

use crate::cli::{Command, ExportArgs, FilterArgs, GroupsArgs, ListArgs};
use crate::folder_source::FolderOpener;
use anyhow::{bail, Context, Result};
use app_core::{AppState, ExportEvent, ExportOverrides, Record, RecordKind, ScaleBucket};
use app_fs::{DefaultFileOperations, DirectoryPicker, FixedDirectory, PromptDirectory};
use serde::Serialize;
use std::path::Path;
use tokio::sync::mpsc;

/// Run `command`. `config_path` is where remembered settings are saved.
pub async fn run(state: &AppState, command: Command, config_path: &Path) -> Result<()> {
    match command {
        Command::List(args) => list(state, args).await,
        Command::Groups(args) => groups(state, args).await,
        Command::Export(args) => export(state, args, config_path).await,
        Command::Stats(args) => stats(state, &args.catalog).await,
    }
}

async fn open_catalog(state: &AppState, path: &Path) -> Result<()> {
    let count = state
        .load(&FolderOpener, path)
        .await
        .with_context(|| format!("opening {}", path.display()))?;

    match count {
        Some(count) => {
            tracing::debug!(count, "Catalog ready");
            Ok(())
        }
        None => bail!("another catalog is still loading"),
    }
}

fn apply_filters(state: &AppState, filter: &FilterArgs) {
    if let Some(search) = &filter.search {
        state.set_search_text(search.as_str());
    }
    state.set_kind_filter(filter.kind);
    state.set_group_filter(filter.group.clone());
}

/// One line of `list --json`
#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    name: &'a str,
    group: &'a str,
    kind: RecordKind,
    scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<(u32, u32)>,
    file_name: String,
}

impl<'a> From<&'a Record> for RecordRow<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            name: record.name(),
            group: record.group_name(),
            kind: record.kind(),
            scale: record.scale(),
            size: record.pixel_size(),
            file_name: app_core::output_file_name(record),
        }
    }
}

async fn list(state: &AppState, args: ListArgs) -> Result<()> {
    open_catalog(state, &args.catalog.catalog).await?;
    apply_filters(state, &args.filter);
    state.set_scale_filter(args.scale);

    let records = state.visible_records();

    if args.json {
        let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for record in &records {
        println!(
            "{:<40} {:<24} {:<10} {:<5} {}",
            format!("{}{}", record.name(), record.scale_text()),
            record.group_name(),
            record.kind().label(),
            record.scale(),
            record.size_text()
        );
    }
    eprintln!("{}", state.status_text());
    Ok(())
}

async fn groups(state: &AppState, args: GroupsArgs) -> Result<()> {
    open_catalog(state, &args.catalog.catalog).await?;
    if let Some(search) = &args.search {
        state.set_group_search_text(search.as_str());
    }

    for group in state.filtered_groups() {
        println!("{:<40} {}", group, state.count_in_group(&group));
    }
    Ok(())
}

async fn stats(state: &AppState, catalog: &Path) -> Result<()> {
    open_catalog(state, catalog).await?;
    let store = state.store();

    println!("Total: {}", store.len());
    println!("Groups: {}", store.groups().len());
    println!();
    for kind in RecordKind::ALL {
        let count = store.count_of_kind(kind);
        if count > 0 {
            println!("{:<12} {}", kind.label(), count);
        }
    }
    println!();
    for bucket in [ScaleBucket::X1, ScaleBucket::X2, ScaleBucket::X3, ScaleBucket::None] {
        println!("{:<12} {}", bucket.label(), store.count_in_bucket(bucket));
    }
    Ok(())
}

fn overrides_from(args: &ExportArgs) -> ExportOverrides {
    let preserve_group_structure = match (args.preserve_groups, args.flat) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    ExportOverrides {
        scale_options: (!args.scales.is_empty()).then(|| args.scales.clone()),
        preserve_group_structure,
    }
}

async fn export(state: &AppState, args: ExportArgs, config_path: &Path) -> Result<()> {
    open_catalog(state, &args.catalog.catalog).await?;
    let overrides = overrides_from(&args);

    let selection = &args.selection;
    let staged = if let Some(kind) = selection.kind {
        state.prepare_export_kind(kind)
    } else if let [group] = selection.groups.as_slice() {
        state.prepare_export_group(group)
    } else if !selection.groups.is_empty() {
        for group in &selection.groups {
            state.toggle_group(group);
        }
        state.prepare_export_selected_groups()
    } else if let Some(query) = &selection.selected_groups_search {
        state.set_group_search_text(query.as_str());
        state.select_all_groups();
        state.prepare_export_selected_groups()
    } else if let Some(search) = &selection.search {
        state.set_search_text(search.as_str());
        for record in state.visible_records() {
            state.extend_selection(record.id());
        }
        state.prepare_export_selected()
    } else {
        state.prepare_export_all()
    };

    if !staged {
        eprintln!("Nothing to export");
        return Ok(());
    }

    let picker: Box<dyn DirectoryPicker> = match &args.out {
        Some(dir) => Box::new(FixedDirectory(Some(dir.clone()))),
        None => Box::new(PromptDirectory::new(
            state.last_destination().or_else(|| PromptDirectory::with_download_dir().suggestion()),
        )),
    };
    let ops = DefaultFileOperations::new().with_reveal(state.config.read().export.open_destination);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let picker = picker.as_ref();
    let ops_ref = &ops;
    let overrides = &overrides;
    let run = async move { state.confirm_export(picker, ops_ref, overrides, Some(&tx)).await };
    let report = async {
        while let Some(event) = rx.recv().await {
            if let ExportEvent::Progress { completed, total } = event {
                eprint!("\rExporting {}/{}", completed, total);
            }
        }
    };
    let (result, ()) = tokio::join!(run, report);
    eprintln!();

    let Some(summary) = result? else {
        eprintln!("Export cancelled");
        return Ok(());
    };

    println!(
        "Exported {} of {} items to {}",
        summary.succeeded,
        summary.total,
        summary.destination.display()
    );
    for (name, reason) in &summary.failed {
        println!("  failed: {} ({})", name, reason);
    }

    // Remembers the destination; one-off flags never reach the config
    if let Err(e) = state.save_config_to(config_path) {
        tracing::warn!("Failed to save configuration: {}", e);
    }
    Ok(())
}
