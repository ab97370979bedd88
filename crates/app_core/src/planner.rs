//! Export planning: which record goes to which directory

use crate::record::{Record, RecordId, UNKNOWN_GROUP};
use crate::scale::{filter_for_export, ExportScaleOption};
use crate::AppError;
use app_fs::{is_valid_component, sanitize_export_name};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// What to export and how to lay it out
#[derive(Debug, Clone)]
pub struct ExportRequest {
    items: Vec<Record>,
    scale_options: BTreeSet<ExportScaleOption>,
    preserve_group_structure: bool,
}

impl ExportRequest {
    /// Build a request. Duplicate records (same id) are dropped, keeping the first.
    pub fn new<I>(items: Vec<Record>, scale_options: I, preserve_group_structure: bool) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = ExportScaleOption>,
    {
        let scale_options: BTreeSet<_> = scale_options.into_iter().collect();
        if scale_options.is_empty() {
            return Err(AppError::InvalidRequest(
                "at least one scale option is required".to_string(),
            ));
        }

        let mut seen: HashSet<RecordId> = HashSet::with_capacity(items.len());
        let items = items.into_iter().filter(|r| seen.insert(r.id())).collect();

        Ok(Self {
            items,
            scale_options,
            preserve_group_structure,
        })
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// Options in canonical order
    pub fn scale_options(&self) -> impl Iterator<Item = ExportScaleOption> + '_ {
        self.scale_options.iter().copied()
    }

    pub fn preserve_group_structure(&self) -> bool {
        self.preserve_group_structure
    }
}

/// One planned write
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub record: Record,
    pub target_dir: PathBuf,
}

/// Ordered list of planned writes below a destination root
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub root: PathBuf,
    pub entries: Vec<PlanEntry>,
}

impl ExportPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct target directories, in first-use order
    pub fn target_dirs(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| seen.insert(e.target_dir.clone()))
            .map(|e| e.target_dir.clone())
            .collect()
    }
}

/// Plan `request` below `root`. Pure: nothing touches the file system.
pub fn plan(request: &ExportRequest, root: &Path) -> ExportPlan {
    let multiple = request.scale_options.len() > 1;
    let mut entries = Vec::new();

    if request.preserve_group_structure {
        let groups = group_in_order(&request.items);

        for option in request.scale_options() {
            let base = if multiple {
                root.join(option.dir_name())
            } else {
                root.to_path_buf()
            };

            for (group_name, records) in &groups {
                let target_dir = base.join(group_dir_name(group_name));
                push_all(&mut entries, filter_for_export(records, option), &target_dir);
            }
        }
    } else if multiple {
        for option in request.scale_options() {
            let target_dir = root.join(option.dir_name());
            push_all(&mut entries, filter_for_export(&request.items, option), &target_dir);
        }
    } else {
        for option in request.scale_options() {
            push_all(&mut entries, filter_for_export(&request.items, option), root);
        }
    }

    tracing::debug!(
        items = request.items.len(),
        planned = entries.len(),
        options = request.scale_options.len(),
        preserve = request.preserve_group_structure,
        "Export planned"
    );

    ExportPlan {
        root: root.to_path_buf(),
        entries,
    }
}

fn push_all(entries: &mut Vec<PlanEntry>, records: Vec<Record>, target_dir: &Path) {
    entries.extend(records.into_iter().map(|record| PlanEntry {
        record,
        target_dir: target_dir.to_path_buf(),
    }));
}

/// Group records by group name, groups in order of first appearance
fn group_in_order(items: &[Record]) -> Vec<(String, Vec<Record>)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Record>)> = Vec::new();

    for record in items {
        let idx = *slots.entry(record.group_name()).or_insert_with(|| {
            groups.push((record.group_name().to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(record.clone());
    }

    groups
}

/// Group names become a single directory component
fn group_dir_name(name: &str) -> String {
    let sanitized = sanitize_export_name(name);
    if is_valid_component(&sanitized) {
        sanitized
    } else {
        UNKNOWN_GROUP.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;
    use pretty_assertions::assert_eq;
    use ExportScaleOption::*;

    fn image(name: &str, group: &str, scale: f64) -> Record {
        Record::new(name, group, RecordKind::Image, scale)
    }

    fn layout(plan: &ExportPlan) -> Vec<(String, String)> {
        plan.entries
            .iter()
            .map(|e| {
                let rel = e.target_dir.strip_prefix(&plan.root).unwrap();
                (rel.display().to_string(), e.record.name().to_string())
            })
            .collect()
    }

    fn relative_dirs(plan: &ExportPlan) -> BTreeSet<String> {
        plan.target_dirs()
            .iter()
            .map(|d| d.strip_prefix(&plan.root).unwrap().display().to_string())
            .collect()
    }

    #[test]
    fn test_empty_options_rejected() {
        let err = ExportRequest::new(vec![], Vec::<ExportScaleOption>::new(), false).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_items_deduplicated_by_id() {
        let a = image("a", "G", 1.0);
        let request = ExportRequest::new(vec![a.clone(), a.clone(), image("a", "G", 1.0)], [All], false).unwrap();
        assert_eq!(request.items().len(), 2);
    }

    #[test]
    fn test_highest_only_scenario_targets_root() {
        let items = vec![image("icon", "G", 1.0), image("icon@2x", "G", 2.0), image("icon@3x", "G", 3.0)];
        let request = ExportRequest::new(items, [HighestOnly], false).unwrap();
        let plan = plan(&request, Path::new("/out"));

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.entries[0].record.name(), "icon@3x");
        assert_eq!(plan.entries[0].target_dir, PathBuf::from("/out"));
    }

    #[test]
    fn test_single_option_never_nests() {
        let items = vec![image("a", "A", 1.0), image("b", "B", 2.0)];
        for option in ExportScaleOption::ALL {
            let request = ExportRequest::new(items.clone(), [option], false).unwrap();
            let plan = plan(&request, Path::new("/out"));
            assert!(plan.entries.iter().all(|e| e.target_dir == Path::new("/out")));
        }
    }

    #[test]
    fn test_multiple_options_one_dir_each_skipping_empty() {
        let items = vec![image("a", "A", 1.0), image("b@2x", "A", 2.0)];
        let request = ExportRequest::new(items, [Only3x, All, Only2x], false).unwrap();
        let plan = plan(&request, Path::new("/out"));

        assert_eq!(
            layout(&plan),
            vec![
                ("All".to_string(), "a".to_string()),
                ("All".to_string(), "b@2x".to_string()),
                ("Only-2x".to_string(), "b@2x".to_string()),
            ]
        );
    }

    #[test]
    fn test_same_record_planned_per_option() {
        let only = image("b@2x", "A", 2.0);
        let request = ExportRequest::new(vec![only.clone()], [All, Only2x], false).unwrap();
        let plan = plan(&request, Path::new("/out"));
        assert_eq!(plan.len(), 2);
        assert!(plan.entries.iter().all(|e| e.record == only));
    }

    #[test]
    fn test_preserve_groups_single_option() {
        let items = vec![image("x", "Toolbar", 1.0), image("y", "Tabs", 1.0), image("z", "Toolbar", 1.0)];
        let request = ExportRequest::new(items, [All], true).unwrap();
        let plan = plan(&request, Path::new("/out"));

        assert_eq!(
            layout(&plan),
            vec![
                ("Toolbar".to_string(), "x".to_string()),
                ("Toolbar".to_string(), "z".to_string()),
                ("Tabs".to_string(), "y".to_string()),
            ]
        );
    }

    #[test]
    fn test_preserve_groups_two_scales_scenario() {
        let mut items = Vec::new();
        for (i, scale) in [1.0, 2.0, 3.0, 2.0, 1.0].into_iter().enumerate() {
            items.push(image(&format!("a{}", i), "A", scale));
        }
        for (i, scale) in [1.0, 3.0, 1.0].into_iter().enumerate() {
            items.push(image(&format!("b{}", i), "B", scale));
        }

        let request = ExportRequest::new(items, [Only2x, Only3x], true).unwrap();
        let plan = plan(&request, Path::new("/out"));

        let allowed: BTreeSet<String> = ["Only-2x/A", "Only-2x/B", "Only-3x/A", "Only-3x/B"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let used = relative_dirs(&plan);
        assert!(used.is_subset(&allowed));
        // Group B has no 2x records, so that directory is never planned
        assert_eq!(
            used,
            ["Only-2x/A", "Only-3x/A", "Only-3x/B"].iter().map(|s| s.to_string()).collect()
        );
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn test_preserve_groups_highest_per_group() {
        let items = vec![
            image("icon", "Light", 1.0),
            image("icon@3x", "Light", 3.0),
            image("icon@2x", "Dark", 2.0),
        ];
        let request = ExportRequest::new(items, [HighestOnly], true).unwrap();
        let plan = plan(&request, Path::new("/out"));

        assert_eq!(
            layout(&plan),
            vec![
                ("Light".to_string(), "icon@3x".to_string()),
                ("Dark".to_string(), "icon@2x".to_string()),
            ]
        );
    }

    #[test]
    fn test_group_dir_names_are_single_components() {
        assert_eq!(group_dir_name("Icons/Toolbar"), "Icons_Toolbar");
        assert_eq!(group_dir_name(".."), UNKNOWN_GROUP);
        assert_eq!(group_dir_name(""), UNKNOWN_GROUP);
    }
}
