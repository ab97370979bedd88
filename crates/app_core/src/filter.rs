//! Visible-record filtering

use crate::record::{Record, RecordKind};
use crate::scale::ScaleFilter;
use serde::{Deserialize, Serialize};

/// All active filters. They compose by logical AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Case-insensitive substring over name and group name
    pub search_text: String,
    /// `None` shows every kind
    pub kind: Option<RecordKind>,
    pub scale: ScaleFilter,
    pub group: Option<String>,
    /// Narrows the group list offered for multi-selection, not the records
    pub group_search_text: String,
}

impl FilterState {
    /// True when no record filter is active
    pub fn is_empty(&self) -> bool {
        self.search_text.is_empty()
            && self.kind.is_none()
            && self.scale == ScaleFilter::All
            && self.group.is_none()
    }
}

/// Apply `state` to `records`. Only removes elements, never reorders.
pub fn visible<'a>(records: &'a [Record], state: &FilterState) -> Vec<&'a Record> {
    let query = state.search_text.to_lowercase();

    records
        .iter()
        .filter(|r| state.kind.map_or(true, |k| r.kind() == k))
        .filter(|r| state.group.as_deref().map_or(true, |g| r.group_name() == g))
        .filter(|r| state.scale.matches(r))
        .filter(|r| {
            query.is_empty()
                || r.name().to_lowercase().contains(&query)
                || r.group_name().to_lowercase().contains(&query)
        })
        .collect()
}

/// Group names containing `query` (case-insensitive). An empty query keeps all.
pub fn filter_groups(groups: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return groups.to_vec();
    }
    let query = query.to_lowercase();
    groups
        .iter()
        .filter(|g| g.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<Record> {
        vec![
            Record::new("AppIcon", "AppIcon", RecordKind::Image, 1.0),
            Record::new("AppIcon@2x", "AppIcon", RecordKind::Image, 2.0),
            Record::new("accent", "Colors", RecordKind::Color, 1.0),
            Record::new("arrow", "Toolbar", RecordKind::VectorPdf, 1.0),
            Record::new("back@3x", "Toolbar", RecordKind::Image, 3.0),
            Record::new("blob", "Data", RecordKind::RawData, 1.0),
        ]
    }

    fn names(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let records = fixture();
        let state = FilterState::default();
        assert!(state.is_empty());
        assert_eq!(visible(&records, &state).len(), records.len());
    }

    #[test]
    fn test_search_matches_group_name() {
        let records = fixture();
        let state = FilterState {
            search_text: "TOOL".into(),
            ..Default::default()
        };
        assert_eq!(names(&visible(&records, &state)), vec!["arrow", "back@3x"]);
    }

    #[test]
    fn test_filters_compose() {
        let records = fixture();
        let state = FilterState {
            kind: Some(RecordKind::Image),
            scale: ScaleFilter::NoIdentifier,
            ..Default::default()
        };
        assert_eq!(names(&visible(&records, &state)), vec!["AppIcon"]);

        let state = FilterState {
            group: Some("Toolbar".into()),
            scale: ScaleFilter::X3,
            ..Default::default()
        };
        assert_eq!(names(&visible(&records, &state)), vec!["back@3x"]);
    }

    #[test]
    fn test_subset_order_and_idempotence() {
        let records = fixture();
        let states = [
            FilterState::default(),
            FilterState { search_text: "a".into(), ..Default::default() },
            FilterState { scale: ScaleFilter::X1, ..Default::default() },
            FilterState { scale: ScaleFilter::NoIdentifier, search_text: "c".into(), ..Default::default() },
            FilterState { kind: Some(RecordKind::Color), group: Some("Colors".into()), ..Default::default() },
            FilterState { group: Some("Nope".into()), ..Default::default() },
        ];

        for state in &states {
            let once: Vec<Record> = visible(&records, state).into_iter().cloned().collect();

            // Order-preserving subset of the input
            let mut cursor = records.iter();
            for r in &once {
                assert!(cursor.any(|x| x == r), "{:?} out of order", r);
            }

            let twice: Vec<Record> = visible(&once, state).into_iter().cloned().collect();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_filter_groups() {
        let groups = vec!["AppIcon".to_string(), "Toolbar".to_string(), "TabBar".to_string()];
        assert_eq!(filter_groups(&groups, ""), groups);
        assert_eq!(filter_groups(&groups, "bar"), vec!["Toolbar".to_string(), "TabBar".to_string()]);
        assert!(filter_groups(&groups, "zzz").is_empty());
    }
}
