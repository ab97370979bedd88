//! Immutable per-load record store

use crate::record::{Record, RecordId, RecordKind};
use crate::scale::{bucket_of, ScaleBucket};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// The records of one catalog load plus derived indices
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    by_id: HashMap<RecordId, usize>,
    /// Group name -> record indices, in store order
    by_group: BTreeMap<String, Vec<usize>>,
}

impl RecordStore {
    /// Build a store from records already in display order
    pub fn new(records: Vec<Record>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_group: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (idx, record) in records.iter().enumerate() {
            by_id.insert(record.id(), idx);
            by_group
                .entry(record.group_name().to_string())
                .or_default()
                .push(idx);
        }

        Self {
            records,
            by_id,
            by_group,
        }
    }

    /// Sort by localized name and build the store
    pub fn from_unsorted(mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| localized_cmp(a.name(), b.name()));
        Self::new(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Distinct group names, sorted
    pub fn groups(&self) -> Vec<String> {
        self.by_group.keys().cloned().collect()
    }

    /// Records of one group in store order
    pub fn group_records(&self, name: &str) -> Vec<Record> {
        self.by_group
            .get(name)
            .map(|idxs| idxs.iter().map(|&i| self.records[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Records belonging to any of `names`, in store order
    pub fn records_in_groups<'a, I>(&self, names: I) -> Vec<Record>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut idxs: Vec<usize> = names
            .into_iter()
            .filter_map(|n| self.by_group.get(n))
            .flatten()
            .copied()
            .collect();
        idxs.sort_unstable();
        idxs.dedup();
        idxs.into_iter().map(|i| self.records[i].clone()).collect()
    }

    pub fn records_of_kind(&self, kind: RecordKind) -> Vec<Record> {
        self.records
            .iter()
            .filter(|r| r.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn count_of_kind(&self, kind: RecordKind) -> usize {
        self.records.iter().filter(|r| r.kind() == kind).count()
    }

    pub fn count_in_group(&self, name: &str) -> usize {
        self.by_group.get(name).map_or(0, Vec::len)
    }

    pub fn count_in_bucket(&self, bucket: ScaleBucket) -> usize {
        self.records.iter().filter(|r| bucket_of(r) == bucket).count()
    }

    /// Records accepted by `is_selected`, in store order
    pub fn records_with_ids<F>(&self, mut is_selected: F) -> Vec<Record>
    where
        F: FnMut(RecordId) -> bool,
    {
        self.records
            .iter()
            .filter(|r| is_selected(r.id()))
            .cloned()
            .collect()
    }
}

/// Case-insensitive name order; exact name breaks ties
pub fn localized_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
