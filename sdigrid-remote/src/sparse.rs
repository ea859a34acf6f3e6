//! Sparse row storage.

use std::collections::BTreeMap;

use sdigrid::data::{DataSource, Record};

use crate::response::RowBatch;

/// Rows loaded so far out of a server-side total.
///
/// Unloaded rows read as `None`, which the grid renders as loading rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRows {
    rows: BTreeMap<usize, Record>,
    length: usize,
}

impl SparseRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether row `index` holds a record.
    pub fn is_loaded(&self, index: usize) -> bool {
        self.rows.contains_key(&index)
    }

    /// Number of loaded rows.
    pub fn loaded_count(&self) -> usize {
        self.rows.len()
    }

    /// Loaded rows in index order.
    pub fn loaded(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.rows.iter().map(|(index, record)| (*index, record))
    }

    pub fn set_len(&mut self, length: usize) {
        self.length = length;
    }

    pub fn insert(&mut self, index: usize, record: Record) {
        self.rows.insert(index, record);
    }

    /// Stores the batch records at `from..` and takes its total as the
    /// new length.
    pub fn merge(&mut self, batch: &RowBatch) {
        for (offset, record) in batch.records.iter().enumerate() {
            self.rows.insert(batch.from + offset, record.clone());
        }
        self.length = batch.total;
    }

    /// Forgets every loaded row. The length stays so the viewport keeps its
    /// place until the next batch arrives.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

impl DataSource for SparseRows {
    fn len(&self) -> usize {
        self.length
    }

    fn item(&self, index: usize) -> Option<&Record> {
        self.rows.get(&index)
    }

    fn item_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.rows.get_mut(&index)
    }
}
