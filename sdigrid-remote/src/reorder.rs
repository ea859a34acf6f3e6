//! Drag-and-drop reorder requests.

use sdigrid::data::DataSource;
use sdigrid::row_move::MoveRowsArgs;

use crate::error::BulkError;

/// Moves rows, by stable id, in front of another row or to the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    /// Ids of the moved rows, in row order.
    pub item_ids: Vec<String>,
    /// Id of the row to insert before, `None` for the end of the list.
    pub insert_before: Option<String>,
}

impl ReorderRequest {
    /// Translates a row move into ids.
    ///
    /// Every moved row, and the target row unless it is the end of the
    /// list, must be loaded.
    pub fn from_move<D: DataSource>(data: &D, args: &MoveRowsArgs) -> Result<Self, BulkError> {
        let mut rows = args.rows.clone();
        rows.sort_unstable();
        rows.dedup();
        let item_ids = rows
            .iter()
            .map(|&row| row_id(data, row))
            .collect::<Result<Vec<_>, _>>()?;
        let insert_before = if args.insert_before >= data.len() {
            None
        } else {
            Some(row_id(data, args.insert_before)?)
        };
        Ok(Self {
            item_ids,
            insert_before,
        })
    }

    /// Form fields of the reorder POST.
    pub fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ajax.reorder", "true".to_string()),
            ("item-modify", self.item_ids.join("/")),
            ("insert-before", self.insert_before.clone().unwrap_or_default()),
        ]
    }
}

pub(crate) fn row_id<D: DataSource>(data: &D, row: usize) -> Result<String, BulkError> {
    data.item(row)
        .ok_or(BulkError::NotLoaded(row))?
        .id()
        .ok_or(BulkError::MissingId(row))
}
