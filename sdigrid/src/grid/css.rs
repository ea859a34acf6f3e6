//! Cell CSS overlays and the selection bridge.
//!
//! An overlay is a named [`CssHash`]. Overlays compose: a rendered cell
//! carries the classes of every overlay that names it. Changing an overlay
//! only touches rendered cells whose class actually differs.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use super::{CellCssStylesChangedArgs, CssHash, SelectedRowsChangedArgs, VirtualGrid};
use crate::canvas::Canvas;
use crate::data::DataSource;
use crate::error::{GridError, Result};
use crate::selection::RowSelectionModel;

/// A cell blinking with the flashing class.
///
/// The grid has no timers: the host calls [`VirtualGrid::advance_flash`]
/// every [`CellFlash::INTERVAL`] until it returns false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFlash {
    pub row: usize,
    pub cell: usize,
    remaining: u8,
}

impl CellFlash {
    pub const INTERVAL: Duration = Duration::from_millis(100);

    /// Class toggles left.
    pub fn remaining(&self) -> u8 {
        self.remaining
    }
}

impl<D: DataSource, C: Canvas> VirtualGrid<D, C> {
    // -------------------------------------------------------------------------
    // Overlays
    // -------------------------------------------------------------------------

    /// Registers a new overlay. Fails when `key` is already registered.
    pub fn add_cell_css_styles(&mut self, key: &str, hash: CssHash) -> Result<()> {
        if self.cell_css.iter().any(|(k, _)| k == key) {
            return Err(GridError::CssKeyExists(key.to_string()));
        }
        self.apply_css_diff(Some(&hash), None);
        self.cell_css.push((key.to_string(), hash.clone()));
        self.events
            .on_cell_css_styles_changed
            .notify(&CellCssStylesChangedArgs {
                key: key.to_string(),
                hash: Some(hash),
            });
        Ok(())
    }

    /// Registers or replaces an overlay.
    pub fn set_cell_css_styles(&mut self, key: &str, hash: CssHash) {
        let previous = match self.cell_css.iter().position(|(k, _)| k == key) {
            Some(index) => Some(std::mem::replace(&mut self.cell_css[index].1, hash.clone())),
            None => {
                self.cell_css.push((key.to_string(), hash.clone()));
                None
            }
        };
        self.apply_css_diff(Some(&hash), previous.as_ref());
        self.events
            .on_cell_css_styles_changed
            .notify(&CellCssStylesChangedArgs {
                key: key.to_string(),
                hash: Some(hash),
            });
    }

    /// Drops an overlay. Unknown keys are ignored.
    pub fn remove_cell_css_styles(&mut self, key: &str) {
        let Some(index) = self.cell_css.iter().position(|(k, _)| k == key) else {
            return;
        };
        let (_, previous) = self.cell_css.remove(index);
        self.apply_css_diff(None, Some(&previous));
        self.events
            .on_cell_css_styles_changed
            .notify(&CellCssStylesChangedArgs {
                key: key.to_string(),
                hash: None,
            });
    }

    pub fn cell_css_styles(&self, key: &str) -> Option<&CssHash> {
        self.cell_css
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, hash)| hash)
    }

    fn apply_css_diff(&mut self, added: Option<&CssHash>, removed: Option<&CssHash>) {
        let rows: Vec<usize> = self.rows_cache.keys().copied().collect();
        for row in rows {
            let added_row = added.and_then(|h| h.get(&row));
            let removed_row = removed.and_then(|h| h.get(&row));

            if let Some(removed_row) = removed_row {
                for (column_id, class) in removed_row {
                    if added_row.and_then(|a| a.get(column_id)) != Some(class) {
                        self.toggle_overlay_class(row, column_id, class, false);
                    }
                }
            }
            if let Some(added_row) = added_row {
                for (column_id, class) in added_row {
                    if removed_row.and_then(|r| r.get(column_id)) != Some(class) {
                        self.toggle_overlay_class(row, column_id, class, true);
                    }
                }
            }
        }
    }

    fn toggle_overlay_class(&mut self, row: usize, column_id: &str, class: &str, on: bool) {
        let Some(cell) = self.column_index(column_id) else {
            return;
        };
        if self.rows_cache.get(&row).is_some_and(|n| n.has_cell(cell)) {
            self.canvas.toggle_cell_class(row, cell, class, on);
        }
    }

    /// Starts blinking a rendered cell.
    pub fn flash_cell(&self, row: usize, cell: usize) -> Option<CellFlash> {
        self.rows_cache.get(&row)?;
        Some(CellFlash {
            row,
            cell,
            remaining: 4,
        })
    }

    /// Toggles the flashing class once. Returns true while toggles remain.
    pub fn advance_flash(&mut self, flash: &mut CellFlash) -> bool {
        if flash.remaining == 0 {
            return false;
        }
        let on = flash.remaining % 2 == 0;
        let class = self.options.cell_flashing_css_class.clone();
        self.canvas
            .toggle_cell_class(flash.row, flash.cell, &class, on);
        flash.remaining -= 1;
        flash.remaining > 0
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Installs a selection model and renders its current ranges.
    pub fn set_selection_model(&mut self, model: RowSelectionModel) {
        let has_ranges = !model.ranges().is_empty();
        self.selection = Some(model);
        if has_ranges {
            self.apply_selection_ranges();
        }
    }

    pub fn selection_model(&self) -> Option<&RowSelectionModel> {
        self.selection.as_ref()
    }

    pub fn has_selection_model(&self) -> bool {
        self.selection.is_some()
    }

    /// Selected rows in selection order.
    pub fn selected_rows(&self) -> Result<&[usize]> {
        if self.selection.is_none() {
            return Err(GridError::NoSelectionModel);
        }
        Ok(&self.selected_rows)
    }

    /// Replaces the selection. Always publishes `on_selected_rows_changed`.
    pub fn set_selected_rows(&mut self, rows: &[usize]) -> Result<()> {
        let column_count = self.columns.len();
        let model = self
            .selection
            .as_mut()
            .ok_or(GridError::NoSelectionModel)?;
        model.set_selected_rows(rows, column_count);
        self.apply_selection_ranges();
        Ok(())
    }

    /// Renders the model's ranges as the selection overlay and publishes them.
    pub(super) fn apply_selection_ranges(&mut self) {
        let Some(model) = self.selection.as_ref() else {
            return;
        };
        let ranges = model.ranges().to_vec();
        let class = self.options.selected_cell_css_class.clone();

        let mut rows = Vec::new();
        let mut hash: CssHash = HashMap::new();
        for range in &ranges {
            for row in range.from_row..=range.to_row {
                if !hash.contains_key(&row) {
                    rows.push(row);
                }
                let cells = hash.entry(row).or_default();
                for cell in range.from_cell..=range.to_cell.min(self.columns.len().saturating_sub(1)) {
                    if self.can_cell_be_selected(row, cell) {
                        cells.insert(self.columns[cell].id.clone(), class.clone());
                    }
                }
            }
        }

        let previous = std::mem::replace(&mut self.selected_rows, rows.clone());
        self.set_cell_css_styles(&class, hash);
        self.events
            .on_selected_rows_changed
            .notify(&SelectedRowsChangedArgs { rows: rows.clone() });

        let before: BTreeSet<usize> = previous.into_iter().collect();
        let after: BTreeSet<usize> = rows.into_iter().collect();
        for row in before.symmetric_difference(&after) {
            self.update_row(*row);
        }
    }
}
