//! Row markup and the render pass.

use std::rc::Rc;

use serde_json::Value;

use super::{RowNode, VirtualGrid};
use crate::canvas::{Canvas, CellMarkup, RowMarkup};
use crate::data::DataSource;
use crate::formatter::{Formatter, default_formatter};
use crate::metadata::ItemMetadata;
use crate::pager::RowRange;

impl<D: DataSource, C: Canvas> VirtualGrid<D, C> {
    /// Brings the canvas in line with the rendered range.
    ///
    /// Rows that left the range are dropped (the active row is kept) and
    /// every row missing from the range is built and handed to the canvas in
    /// a single insert.
    pub fn render(&mut self) {
        let range = self.rendered_range();
        self.cleanup_rows(range);

        if let Some(range) = range {
            let mut batch = Vec::new();
            for row in range.top..=range.bottom {
                if self.rows_cache.contains_key(&row) {
                    continue;
                }
                let (markup, node) = self.build_row(row);
                self.rows_cache.insert(row, node);
                batch.push(markup);
            }
            if !batch.is_empty() {
                log::trace!(
                    "rendering {} row(s) in {}..={}",
                    batch.len(),
                    range.top,
                    range.bottom
                );
                self.canvas.insert_rows(batch);
            }
        }

        self.pager.mark_rendered();
    }

    /// Drops rendered rows outside `keep`, except the active row.
    pub(super) fn cleanup_rows(&mut self, keep: Option<RowRange>) {
        let active_row = self.active.map(|a| a.row);
        let stale: Vec<usize> = self
            .rows_cache
            .keys()
            .copied()
            .filter(|&row| Some(row) != active_row && !keep.is_some_and(|k| k.contains(row)))
            .collect();
        self.remove_rows(&stale);
    }

    fn build_row(&self, row: usize) -> (RowMarkup, RowNode) {
        let item = self.data.item(row);
        let metadata = self.data.item_metadata(row);
        let active = self.active.filter(|a| a.row == row);

        let mut classes = String::from("slick-row");
        if row < self.data.len() && item.is_none() {
            classes.push_str(" loading");
        }
        if active.is_some() {
            classes.push_str(" active");
        }
        classes.push_str(if row % 2 == 1 { " odd" } else { " even" });
        if let Some(extra) = metadata.as_ref().and_then(|m| m.css_classes.as_deref()) {
            classes.push(' ');
            classes.push_str(extra);
        }

        let column_count = self.columns.len();
        let mut node = RowNode::default();
        let mut cells = Vec::with_capacity(column_count);
        let mut cell = 0;
        while cell < column_count {
            let colspan = self.colspan_with(metadata.as_ref(), cell);
            let column = &self.columns[cell];

            let mut cell_classes = format!(
                "slick-cell l{} r{}",
                cell,
                (cell + colspan - 1).min(column_count - 1)
            );
            if let Some(css) = &column.css_class {
                cell_classes.push(' ');
                cell_classes.push_str(css);
            }
            if active.is_some_and(|a| a.cell == cell) {
                cell_classes.push_str(" active");
            }
            for (_, hash) in &self.cell_css {
                if let Some(class) = hash.get(&row).and_then(|h| h.get(&column.id)) {
                    cell_classes.push(' ');
                    cell_classes.push_str(class);
                }
            }

            let html = match item {
                Some(item) => {
                    let value = item.get(&column.field).cloned().unwrap_or(Value::Null);
                    let formatter = self.formatter_for(cell, metadata.as_ref());
                    formatter(row, cell, &value, column, item)
                }
                None => String::new(),
            };

            node.cells.push((cell, colspan));
            cells.push(CellMarkup {
                cell,
                colspan,
                classes: cell_classes,
                html,
            });
            cell += colspan;
        }

        let markup = RowMarkup {
            row,
            top: self.pager.row_top(row),
            classes,
            cells,
        };
        (markup, node)
    }

    /// Number of columns the cell at `cell` covers in `row`.
    pub(super) fn colspan(&self, row: usize, cell: usize) -> usize {
        let metadata = self.data.item_metadata(row);
        self.colspan_with(metadata.as_ref(), cell)
    }

    fn colspan_with(&self, metadata: Option<&ItemMetadata>, cell: usize) -> usize {
        let Some(column) = self.columns.get(cell) else {
            return 1;
        };
        metadata
            .and_then(|m| m.column(&column.id, cell))
            .and_then(|c| c.colspan)
            .map_or(1, |span| span.resolve(cell, self.columns.len()))
    }

    /// Resolves the formatter of a cell.
    pub(super) fn formatter_for(&self, cell: usize, metadata: Option<&ItemMetadata>) -> Formatter {
        let column = &self.columns[cell];
        let name = metadata
            .and_then(|m| m.column(&column.id, cell))
            .and_then(|c| c.formatter.clone())
            .or_else(|| metadata.and_then(|m| m.formatter.clone()))
            .or_else(|| column.formatter.clone());

        if let Some(name) = name {
            match self.formatters.get(&name) {
                Some(formatter) => return formatter.clone(),
                None => log::warn!("unknown formatter '{}' on column '{}'", name, column.id),
            }
        }
        if let Some(formatter) = self
            .formatter_factory
            .as_ref()
            .and_then(|factory| factory(column))
        {
            return formatter;
        }
        Rc::new(default_formatter)
    }

    pub(super) fn format_cell(&self, row: usize, cell: usize) -> String {
        let Some(item) = self.data.item(row) else {
            return String::new();
        };
        let column = &self.columns[cell];
        let value = item.get(&column.field).cloned().unwrap_or(Value::Null);
        let metadata = self.data.item_metadata(row);
        let formatter = self.formatter_for(cell, metadata.as_ref());
        formatter(row, cell, &value, column, item)
    }

    // -------------------------------------------------------------------------
    // In-place updates
    // -------------------------------------------------------------------------

    /// Re-formats one rendered cell. An open editor on it reloads its value.
    pub fn update_cell(&mut self, row: usize, cell: usize) {
        if !self.rows_cache.get(&row).is_some_and(|n| n.has_cell(cell)) {
            return;
        }
        if self.is_editing_cell(row, cell) {
            self.reload_editor();
            return;
        }
        let html = self.format_cell(row, cell);
        self.canvas.update_cell(row, cell, &html);
    }

    /// Re-formats every rendered cell of a row.
    pub fn update_row(&mut self, row: usize) {
        let Some(node) = self.rows_cache.get(&row) else {
            return;
        };
        let cells: Vec<usize> = node.cells.iter().map(|(cell, _)| *cell).collect();
        for cell in cells {
            if cell >= self.columns.len() {
                continue;
            }
            if self.is_editing_cell(row, cell) {
                self.reload_editor();
            } else {
                let html = self.format_cell(row, cell);
                self.canvas.update_cell(row, cell, &html);
            }
        }
    }

    fn is_editing_cell(&self, row: usize, cell: usize) -> bool {
        self.editing.is_some() && self.active.is_some_and(|a| a.row == row && a.cell == cell)
    }

    fn reload_editor(&mut self) {
        let Some(active) = self.active else { return };
        if let (Some(edit), Some(item)) = (self.editing.as_mut(), self.data.item(active.row)) {
            edit.editor.load_value(item);
        }
    }
}
