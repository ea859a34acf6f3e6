//! Row selection model.
//!
//! Selection is kept as disjoint whole-row ranges. The model only decides
//! which rows are selected; the grid renders the result as a cell overlay
//! and publishes `on_selected_rows_changed`.

use crate::input::{Key, KeyEvent, Modifiers};
use crate::range::{CellRange, ranges_to_rows, rows_to_ranges};

/// Selection mode for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// One row at a time.
    Single,
    /// Ctrl/Shift extend the selection.
    #[default]
    Multi,
}

/// Grid facts the model needs to act on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionContext {
    pub column_count: usize,
    pub row_count: usize,
    pub active_row: Option<usize>,
}

/// Selects whole rows.
#[derive(Debug, Clone)]
pub struct RowSelectionModel {
    ranges: Vec<CellRange>,
    mode: SelectionMode,
    select_active_row: bool,
    /// Row a shift-click extends from.
    anchor: Option<usize>,
}

impl Default for RowSelectionModel {
    fn default() -> Self {
        Self {
            ranges: Vec::new(),
            mode: SelectionMode::Multi,
            select_active_row: true,
            anchor: None,
        }
    }
}

impl RowSelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether moving the active cell also selects its row.
    pub fn with_select_active_row(mut self, select: bool) -> Self {
        self.select_active_row = select;
        self
    }

    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    /// Selected rows, ascending.
    pub fn selected_rows(&self) -> Vec<usize> {
        ranges_to_rows(&self.ranges)
    }

    pub fn is_row_selected(&self, row: usize) -> bool {
        self.ranges.iter().any(|r| row >= r.from_row && row <= r.to_row)
    }

    /// Replaces the selection. Returns true when it changed.
    pub fn set_selected_rows(&mut self, rows: &[usize], column_count: usize) -> bool {
        let ranges = rows_to_ranges(rows, column_count);
        self.anchor = rows.last().copied();
        self.replace(ranges)
    }

    /// Replaces the selection with arbitrary ranges, widened to whole rows.
    pub fn set_selected_ranges(&mut self, ranges: &[CellRange], column_count: usize) -> bool {
        self.set_selected_rows(&ranges_to_rows(ranges), column_count)
    }

    /// Follows the active cell when `select_active_row` is on.
    pub fn handle_active_cell_change(&mut self, row: Option<usize>, column_count: usize) -> bool {
        match row {
            Some(row) if self.select_active_row => {
                self.anchor = Some(row);
                self.replace(vec![CellRange::rows(row, row, column_count)])
            }
            _ => false,
        }
    }

    /// Shift+Up/Down grows or shrinks the selection block around the active row.
    ///
    /// Returns the row that should be scrolled into view when the selection changed.
    pub fn handle_key_down(&mut self, event: &KeyEvent, ctx: SelectionContext) -> Option<usize> {
        let Some(active) = ctx.active_row else {
            return None;
        };
        let shift_only = event.modifiers == Modifiers::SHIFT;
        if !shift_only || !matches!(event.key, Key::Up | Key::Down) || self.mode == SelectionMode::Single {
            return None;
        }

        let mut rows = self.selected_rows();
        if rows.is_empty() {
            rows.push(active);
        }
        let mut top = rows[0] as i64;
        let mut bottom = rows[rows.len() - 1] as i64;
        let active = active as i64;

        let target = if event.key == Key::Down {
            if active < bottom || top == bottom {
                bottom += 1;
                bottom
            } else {
                top += 1;
                top
            }
        } else if active < bottom {
            bottom -= 1;
            bottom
        } else {
            top -= 1;
            top
        };

        if target < 0 || target >= ctx.row_count as i64 {
            return None;
        }
        let block: Vec<usize> = (top.max(0) as usize..=bottom.max(0) as usize).collect();
        self.replace(rows_to_ranges(&block, ctx.column_count));
        Some(target as usize)
    }

    /// Ctrl-click toggles a row, Shift-click selects from the anchor.
    ///
    /// Returns true when the click was consumed. Plain clicks are left to the
    /// grid's active-cell handling.
    pub fn handle_click(&mut self, row: usize, modifiers: Modifiers, column_count: usize) -> bool {
        if self.mode == SelectionMode::Single || !(modifiers.ctrl || modifiers.shift) {
            return false;
        }

        let mut rows = self.selected_rows();
        let selected = rows.contains(&row);

        if modifiers.ctrl {
            if selected {
                rows.retain(|&r| r != row);
            } else {
                rows.push(row);
            }
            self.anchor = Some(row);
        } else if let Some(anchor) = self.anchor.or_else(|| rows.last().copied()) {
            rows = (anchor.min(row)..=anchor.max(row)).collect();
            self.anchor = Some(anchor);
        } else {
            rows = vec![row];
            self.anchor = Some(row);
        }

        self.replace(rows_to_ranges(&rows, column_count));
        true
    }

    /// Keeps ranges valid after the row count shrank.
    pub fn truncate(&mut self, row_count: usize, column_count: usize) -> bool {
        let rows: Vec<usize> = self
            .selected_rows()
            .into_iter()
            .filter(|&r| r < row_count)
            .collect();
        self.replace(rows_to_ranges(&rows, column_count))
    }

    fn replace(&mut self, ranges: Vec<CellRange>) -> bool {
        if ranges == self.ranges {
            return false;
        }
        self.ranges = ranges;
        true
    }
}
