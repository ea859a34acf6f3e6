//! A checkbox column that mirrors the row selection.
//!
//! Route clicks and key presses through the plugin before the grid: when
//! it returns `true` the input was a checkbox toggle and the grid should
//! not see it.
//!
//! ```ignore
//! let mut checkbox = CheckboxSelectColumn::new();
//! columns.insert(0, checkbox.column_definition());
//! let mut grid = VirtualGrid::new(data, columns, options);
//! grid.set_selection_model(RowSelectionModel::new().with_select_active_row(false));
//! checkbox.init(&mut grid);
//!
//! if !checkbox.handle_click(&mut grid, row, cell)? {
//!     grid.handle_click(row, cell, modifiers);
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::canvas::Canvas;
use crate::column::Column;
use crate::data::DataSource;
use crate::error::Result;
use crate::event::{HandlerId, Propagation};
use crate::grid::{VirtualGrid, formatter};
use crate::input::{Key, KeyEvent};

pub const CHECKBOX_COLUMN_ID: &str = "_checkbox_selector";

const CHECKED: &str = "<input type='checkbox' checked='checked'>";
const UNCHECKED: &str = "<input type='checkbox'>";

/// Selection checkboxes in a dedicated column.
#[derive(Debug)]
pub struct CheckboxSelectColumn {
    column_id: String,
    css_class: Option<String>,
    tooltip: String,
    width: u32,
    selected: Rc<RefCell<HashSet<usize>>>,
    subscription: Option<HandlerId>,
}

impl Default for CheckboxSelectColumn {
    fn default() -> Self {
        Self {
            column_id: CHECKBOX_COLUMN_ID.to_string(),
            css_class: None,
            tooltip: "Select/Deselect All".to_string(),
            width: 30,
            selected: Rc::new(RefCell::new(HashSet::new())),
            subscription: None,
        }
    }
}

impl CheckboxSelectColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column_id(mut self, id: impl Into<String>) -> Self {
        self.column_id = id.into();
        self
    }

    pub fn with_css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    /// The column to add to the grid.
    pub fn column_definition(&self) -> Column {
        let mut column = Column::new("sel", UNCHECKED)
            .with_id(self.column_id.clone())
            .with_width(self.width)
            .with_resizable(false)
            .with_sortable(false)
            .with_formatter(self.column_id.clone());
        column.tooltip = Some(self.tooltip.clone());
        column.css_class = self.css_class.clone();
        column
    }

    /// Registers the checkbox formatter and starts tracking the selection.
    pub fn init<D: DataSource, C: Canvas>(&mut self, grid: &mut VirtualGrid<D, C>) {
        let lookup = self.selected.clone();
        grid.register_formatter(
            self.column_id.clone(),
            formatter(move |row, _cell, _value, _column, _item| {
                if lookup.borrow().contains(&row) {
                    CHECKED.to_string()
                } else {
                    UNCHECKED.to_string()
                }
            }),
        );

        let selected = self.selected.clone();
        let id = grid.events.on_selected_rows_changed.subscribe(move |args| {
            *selected.borrow_mut() = args.rows.iter().copied().collect();
            Propagation::Continue
        });
        self.subscription = Some(id);

        if let Ok(rows) = grid.selected_rows() {
            *self.selected.borrow_mut() = rows.iter().copied().collect();
        }
    }

    pub fn destroy<D: DataSource, C: Canvas>(&mut self, grid: &mut VirtualGrid<D, C>) {
        if let Some(id) = self.subscription.take() {
            grid.events.on_selected_rows_changed.unsubscribe(id);
        }
    }

    pub fn is_row_selected(&self, row: usize) -> bool {
        self.selected.borrow().contains(&row)
    }

    /// Header content: checked when every row is selected.
    pub fn header_html<D: DataSource, C: Canvas>(&self, grid: &VirtualGrid<D, C>) -> &'static str {
        let len = grid.data_len();
        if len > 0 && self.selected.borrow().len() == len {
            CHECKED
        } else {
            UNCHECKED
        }
    }

    /// A click on a cell. Returns true when it toggled a checkbox.
    pub fn handle_click<D: DataSource, C: Canvas>(
        &self,
        grid: &mut VirtualGrid<D, C>,
        row: usize,
        cell: usize,
    ) -> Result<bool> {
        if !self.is_checkbox_cell(grid, cell) {
            return Ok(false);
        }
        if self.commit_open_edit(grid) {
            self.toggle_row_selection(grid, row)?;
        }
        Ok(true)
    }

    /// Space on a checkbox cell toggles its row.
    pub fn handle_key_down<D: DataSource, C: Canvas>(
        &self,
        grid: &mut VirtualGrid<D, C>,
        event: KeyEvent,
    ) -> Result<bool> {
        let Some(active) = grid.active_cell() else {
            return Ok(false);
        };
        if event.key != Key::Char(' ') || !self.is_checkbox_cell(grid, active.cell) {
            return Ok(false);
        }
        if self.commit_open_edit(grid) {
            self.toggle_row_selection(grid, active.row)?;
        }
        Ok(true)
    }

    /// The header checkbox was set to `checked`: select all rows or none.
    pub fn handle_header_click<D: DataSource, C: Canvas>(
        &self,
        grid: &mut VirtualGrid<D, C>,
        column_id: &str,
        checked: bool,
    ) -> Result<bool> {
        if column_id != self.column_id {
            return Ok(false);
        }
        if !self.commit_open_edit(grid) {
            return Ok(true);
        }
        let rows: Vec<usize> = if checked {
            (0..grid.data_len()).collect()
        } else {
            Vec::new()
        };
        grid.set_selected_rows(&rows)?;
        Ok(true)
    }

    pub fn toggle_row_selection<D: DataSource, C: Canvas>(
        &self,
        grid: &mut VirtualGrid<D, C>,
        row: usize,
    ) -> Result<()> {
        let mut rows = grid.selected_rows()?.to_vec();
        if self.is_row_selected(row) {
            rows.retain(|&r| r != row);
        } else {
            rows.push(row);
        }
        grid.set_selected_rows(&rows)
    }

    fn is_checkbox_cell<D: DataSource, C: Canvas>(&self, grid: &VirtualGrid<D, C>, cell: usize) -> bool {
        grid.columns().get(cell).is_some_and(|c| c.id == self.column_id)
    }

    fn commit_open_edit<D: DataSource, C: Canvas>(&self, grid: &mut VirtualGrid<D, C>) -> bool {
        let lock = grid.edit_lock().clone();
        !lock.is_active() || lock.commit_current_edit(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Record, VecData};
    use crate::grid::GridOptions;
    use crate::selection::RowSelectionModel;

    fn setup() -> (VirtualGrid<VecData>, CheckboxSelectColumn) {
        let mut data = VecData::new();
        data.set_items(
            (0..3)
                .map(|i| Record::new().with("id", i).with("title", format!("row {i}")))
                .collect(),
        )
        .unwrap();
        let mut checkbox = CheckboxSelectColumn::new();
        let columns = vec![checkbox.column_definition(), Column::new("title", "Title")];
        let mut grid = VirtualGrid::new(data, columns, GridOptions::default());
        grid.set_selection_model(RowSelectionModel::new().with_select_active_row(false));
        checkbox.init(&mut grid);
        grid.resize_viewport(300, 200.0);
        (grid, checkbox)
    }

    #[test]
    fn test_click_toggles_row_and_rerenders_checkbox() {
        let (mut grid, checkbox) = setup();
        assert!(checkbox.handle_click(&mut grid, 1, 0).unwrap());
        assert_eq!(grid.selected_rows().unwrap(), &[1]);
        let cell = grid.canvas().row(1).unwrap().cell(0).unwrap();
        assert_eq!(cell.html, CHECKED);

        assert!(checkbox.handle_click(&mut grid, 1, 0).unwrap());
        assert!(grid.selected_rows().unwrap().is_empty());
        let cell = grid.canvas().row(1).unwrap().cell(0).unwrap();
        assert_eq!(cell.html, UNCHECKED);
    }

    #[test]
    fn test_click_on_other_column_is_not_taken() {
        let (mut grid, checkbox) = setup();
        assert!(!checkbox.handle_click(&mut grid, 1, 1).unwrap());
    }

    #[test]
    fn test_header_selects_all() {
        let (mut grid, checkbox) = setup();
        assert!(checkbox.handle_header_click(&mut grid, CHECKBOX_COLUMN_ID, true).unwrap());
        assert_eq!(grid.selected_rows().unwrap(), &[0, 1, 2]);
        assert_eq!(checkbox.header_html(&grid), CHECKED);
        checkbox.handle_header_click(&mut grid, CHECKBOX_COLUMN_ID, false).unwrap();
        assert_eq!(checkbox.header_html(&grid), UNCHECKED);
    }
}
