//! Column definitions, autosize, resize and reorder.

use std::collections::{HashMap, HashSet};

use super::{ColumnsChangedArgs, VirtualGrid};
use crate::canvas::Canvas;
use crate::column::{Column, ColumnResize, autosize_widths};
use crate::data::DataSource;
use crate::error::{GridError, Result};

impl<D: DataSource, C: Canvas> VirtualGrid<D, C> {
    pub(super) fn install_columns(&mut self, mut columns: Vec<Column>) {
        for column in &mut columns {
            column.normalize(self.options.default_column_width);
        }
        self.column_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect::<HashMap<_, _>>();
        self.columns = columns;

        let known = &self.column_index;
        self.sort_columns.retain(|s| known.contains_key(&s.column_id));
        if self.active.is_some_and(|a| a.cell >= self.columns.len()) {
            self.active = None;
        }
        self.apply_column_widths();
    }

    /// Replaces the columns and re-renders every row.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.invalidate_all_rows();
        self.install_columns(columns);
        if self.options.force_fit_columns {
            self.autosize_columns();
        }
        self.update_row_count();
        self.render();
    }

    fn apply_column_widths(&mut self) {
        let widths: Vec<u32> = self.columns.iter().map(|c| c.width).collect();
        self.canvas.set_column_widths(&widths);
    }

    /// Fits the columns into the viewport width.
    pub fn autosize_columns(&mut self) {
        let widths = autosize_widths(
            &self.columns,
            self.viewport_width,
            self.options.absolute_column_min_width,
        );

        let mut rerender = false;
        for (column, width) in self.columns.iter_mut().zip(widths) {
            if column.width != width {
                rerender |= column.rerender_on_resize;
                column.width = width;
            }
        }
        self.apply_column_widths();

        if rerender {
            self.invalidate_all_rows();
            self.render();
        }
    }

    // -------------------------------------------------------------------------
    // Resize
    // -------------------------------------------------------------------------

    /// Starts dragging the right edge of column `index` from pointer `x`.
    ///
    /// Refused while the open edit cannot be committed, and for columns
    /// that are not resizable.
    pub fn begin_column_resize(&mut self, index: usize, x: i64) -> bool {
        if !self.commit_via_lock() {
            return false;
        }
        self.column_resize = ColumnResize::begin(
            &self.columns,
            index,
            x,
            self.options.force_fit_columns,
            self.options.absolute_column_min_width,
        );
        self.column_resize.is_some()
    }

    pub fn drag_column_resize(&mut self, x: i64) {
        if let Some(session) = &self.column_resize {
            session.drag(&mut self.columns, x);
            self.apply_column_widths();
        }
    }

    /// Finishes the drag and publishes `on_columns_resized`.
    pub fn end_column_resize(&mut self) {
        let Some(session) = self.column_resize.take() else {
            return;
        };
        let rerender = self
            .columns
            .iter()
            .zip(session.previous_widths())
            .any(|(column, &previous)| column.rerender_on_resize && column.width != previous);
        if rerender {
            self.invalidate_all_rows();
        }
        self.render();

        let column_ids = self.columns.iter().map(|c| c.id.clone()).collect();
        self.events
            .on_columns_resized
            .notify(&ColumnsChangedArgs { column_ids });
    }

    /// Sets a column's width as if its edge had been dragged there.
    pub fn set_column_width(&mut self, index: usize, width: u32) -> bool {
        let Some(column) = self.columns.get(index) else {
            return false;
        };
        let current = column.width as i64;
        if !self.begin_column_resize(index, current) {
            return false;
        }
        self.drag_column_resize(width as i64);
        self.end_column_resize();
        true
    }

    // -------------------------------------------------------------------------
    // Reorder
    // -------------------------------------------------------------------------

    /// Reorders the columns to `ids` and publishes `on_columns_reordered`.
    ///
    /// Returns `Ok(false)` when reordering is disabled or the open edit
    /// cannot be committed.
    pub fn reorder_columns(&mut self, ids: &[&str]) -> Result<bool> {
        if ids.len() != self.columns.len() {
            return Err(GridError::InvalidColumnOrder);
        }
        let unique: HashSet<&str> = ids.iter().copied().collect();
        if unique.len() != ids.len() {
            return Err(GridError::InvalidColumnOrder);
        }
        let mut reordered = Vec::with_capacity(ids.len());
        for id in ids {
            let index = self
                .column_index(id)
                .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
            reordered.push(self.columns[index].clone());
        }

        if !self.options.enable_column_reorder || !self.commit_via_lock() {
            return Ok(false);
        }

        self.invalidate_all_rows();
        if let Some(active) = self.active.as_mut() {
            let id = &self.columns[active.cell].id;
            if let Some(cell) = reordered.iter().position(|c| &c.id == id) {
                active.cell = cell;
                self.active_pos_x = cell;
            }
        }
        self.set_columns(reordered);

        let column_ids = ids.iter().map(|id| id.to_string()).collect();
        self.events
            .on_columns_reordered
            .notify(&ColumnsChangedArgs { column_ids });
        Ok(true)
    }
}
