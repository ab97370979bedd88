//! Item and group selection

use crate::record::{Record, RecordId};
use crate::store::RecordStore;
use std::collections::{BTreeSet, HashSet};

/// Side effect requested by a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEffect {
    None,
    /// Plain activation: the detail view should open
    ShowDetail,
}

/// Selected items and selected groups. Independent of filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected_ids: HashSet<RecordId>,
    selected_groups: BTreeSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Items =====

    /// Replace the selection with `id`
    pub fn select_only(&mut self, id: RecordId) -> SelectionEffect {
        self.selected_ids.clear();
        self.selected_ids.insert(id);
        SelectionEffect::ShowDetail
    }

    /// Add or remove `id`
    pub fn toggle(&mut self, id: RecordId) -> SelectionEffect {
        if !self.selected_ids.remove(&id) {
            self.selected_ids.insert(id);
        }
        SelectionEffect::None
    }

    /// Add `id` without removing anything
    pub fn extend(&mut self, id: RecordId) -> SelectionEffect {
        self.selected_ids.insert(id);
        SelectionEffect::None
    }

    pub fn clear_items(&mut self) {
        self.selected_ids.clear();
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selected_ids.contains(&id)
    }

    pub fn selected_ids(&self) -> &HashSet<RecordId> {
        &self.selected_ids
    }

    pub fn selected_count(&self) -> usize {
        self.selected_ids.len()
    }

    /// Selected records in store order
    pub fn selected_records(&self, store: &RecordStore) -> Vec<Record> {
        store.records_with_ids(|id| self.selected_ids.contains(&id))
    }

    // ===== Groups =====

    pub fn toggle_group(&mut self, name: &str) {
        if !self.selected_groups.remove(name) {
            self.selected_groups.insert(name.to_string());
        }
    }

    /// Select every candidate; selections outside `candidates` are kept
    pub fn select_all_groups(&mut self, candidates: &[String]) {
        self.selected_groups.extend(candidates.iter().cloned());
    }

    /// Flip each candidate; selections outside `candidates` are kept
    pub fn invert_groups(&mut self, candidates: &[String]) {
        for name in candidates {
            self.toggle_group(name);
        }
    }

    pub fn clear_groups(&mut self) {
        self.selected_groups.clear();
    }

    pub fn is_group_selected(&self, name: &str) -> bool {
        self.selected_groups.contains(name)
    }

    pub fn selected_groups(&self) -> &BTreeSet<String> {
        &self.selected_groups
    }
}
