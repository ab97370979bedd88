//! Command line definition

use app_core::{ExportScaleOption, RecordKind, ScaleFilter};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Browse and export the contents of asset catalogs
#[derive(Debug, Parser)]
#[command(name = "car_extractor", version, about)]
pub struct Cli {
    /// Use this configuration file instead of the default one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the records passing the filters
    List(ListArgs),
    /// Print the group list with record counts
    Groups(GroupsArgs),
    /// Export records to individual files
    Export(ExportArgs),
    /// Print counts per kind and scale
    Stats(CatalogArg),
}

#[derive(Debug, Args)]
pub struct CatalogArg {
    /// Catalog to open
    pub catalog: PathBuf,
}

/// Record filters shared by `list` and `export`
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive text matched against name and group
    #[arg(long)]
    pub search: Option<String>,

    /// Only records of this kind (image, color, gradient, effect, pdf, svg, rawData, unknown)
    #[arg(long)]
    pub kind: Option<RecordKind>,

    /// Only records in this group
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub catalog: CatalogArg,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Scale filter: all, 1x, 2x, 3x or none
    #[arg(long, default_value = "all")]
    pub scale: ScaleFilter,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub catalog: CatalogArg,

    /// Only groups whose name contains this text
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub catalog: CatalogArg,

    /// Destination folder; asked for interactively when omitted
    #[arg(long, short, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Scale option, repeatable: all, 1x, 2x, 3x, 2x+3x, highest
    #[arg(long = "scale", value_name = "OPT")]
    pub scales: Vec<ExportScaleOption>,

    /// Nest exported files under their group name
    #[arg(long, conflicts_with = "flat")]
    pub preserve_groups: bool,

    /// Write every file directly below the destination (or scale folder)
    #[arg(long)]
    pub flat: bool,

    #[command(flatten)]
    pub selection: ExportSelection,
}

/// Which records to export. Everything when none is given.
#[derive(Debug, Clone, Default, Args)]
#[group(multiple = false)]
pub struct ExportSelection {
    /// Every record of one kind
    #[arg(long)]
    pub kind: Option<RecordKind>,

    /// Records of the named groups, repeatable
    #[arg(long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Records of every group whose name contains this text
    #[arg(long, value_name = "QUERY")]
    pub selected_groups_search: Option<String>,

    /// Records whose name or group contains this text
    #[arg(long)]
    pub search: Option<String>,
}
