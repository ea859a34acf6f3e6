//! Bulk action bridge.
//!
//! Turns the grid selection into the `item-modify` form field that bulk
//! action buttons submit, and works out which buttons apply to it.

use std::collections::BTreeSet;

use sdigrid::data::DataSource;
use serde_json::Value;

use crate::error::BulkError;
use crate::reorder::row_id;

/// Most rows a bulk action accepts.
pub const MAX_SELECTED: usize = 100;

/// Record field listing the button ids a row disables.
pub const DISABLE_FIELD: &str = "disable";

/// Form field carrying the selected ids.
pub const ITEM_MODIFY_FIELD: &str = "item-modify";

/// Stable ids of the selected rows joined with `/`.
pub fn selected_ids_field<D: DataSource>(data: &D, rows: &[usize]) -> Result<String, BulkError> {
    if rows.len() > MAX_SELECTED {
        return Err(BulkError::TooManySelected {
            count: rows.len(),
            limit: MAX_SELECTED,
        });
    }
    let ids = rows
        .iter()
        .map(|&row| row_id(data, row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids.join("/"))
}

/// Enabled state of the bulk action buttons for a selection.
///
/// Buttons come in two classes: selection buttons need at least one
/// selected row, single buttons need exactly one. On top of that every
/// selected row may name buttons it disables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonStates {
    pub selection_enabled: bool,
    pub single_enabled: bool,
    /// Button ids disabled by one of the selected rows.
    pub disabled: BTreeSet<String>,
}

impl ButtonStates {
    pub fn compute<D: DataSource>(data: &D, rows: &[usize]) -> Self {
        let mut disabled = BTreeSet::new();
        for &row in rows {
            let Some(Value::Array(names)) = data.item(row).and_then(|r| r.get(DISABLE_FIELD)) else {
                continue;
            };
            disabled.extend(names.iter().filter_map(Value::as_str).map(str::to_string));
        }
        Self {
            selection_enabled: !rows.is_empty(),
            single_enabled: rows.len() == 1,
            disabled,
        }
    }

    /// Whether the button `id` of the given class is enabled.
    pub fn is_enabled(&self, id: &str, single: bool) -> bool {
        let class_enabled = if single {
            self.single_enabled
        } else {
            self.selection_enabled
        };
        class_enabled && !self.disabled.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use sdigrid::data::{Record, VecData};
    use serde_json::json;

    use super::*;

    fn data(count: usize) -> VecData {
        let mut data = VecData::new();
        data.set_items(
            (0..count)
                .map(|i| Record::new().with("id", format!("item{i}")))
                .collect(),
        )
        .unwrap();
        data
    }

    #[test]
    fn test_ids_joined_with_slash() {
        let data = data(5);
        assert_eq!(selected_ids_field(&data, &[1, 3]).unwrap(), "item1/item3");
        assert_eq!(selected_ids_field(&data, &[]).unwrap(), "");
    }

    #[test]
    fn test_selection_cap() {
        let data = data(150);
        let rows: Vec<usize> = (0..101).collect();
        assert_eq!(
            selected_ids_field(&data, &rows),
            Err(BulkError::TooManySelected {
                count: 101,
                limit: 100
            })
        );
        let rows: Vec<usize> = (0..100).collect();
        assert!(selected_ids_field(&data, &rows).is_ok());
    }

    #[test]
    fn test_unloaded_row_is_rejected() {
        let data = data(2);
        assert_eq!(selected_ids_field(&data, &[0, 7]), Err(BulkError::NotLoaded(7)));
    }

    #[test]
    fn test_button_states() {
        let mut data = VecData::new();
        data.set_items(vec![
            Record::new().with("id", "a").with("disable", json!(["rename"])),
            Record::new().with("id", "b"),
        ])
        .unwrap();

        let none = ButtonStates::compute(&data, &[]);
        assert!(!none.is_enabled("delete", false));
        assert!(!none.is_enabled("rename", true));

        let one = ButtonStates::compute(&data, &[1]);
        assert!(one.is_enabled("delete", false));
        assert!(one.is_enabled("rename", true));

        let both = ButtonStates::compute(&data, &[0, 1]);
        assert!(both.is_enabled("delete", false));
        assert!(!both.is_enabled("duplicate", true));
        assert!(both.disabled.contains("rename"));
        assert!(!both.is_enabled("rename", false));
    }
}
