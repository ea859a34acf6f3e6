//! Rendering substrate.
//!
//! The grid never touches a real view. It describes rows as [`RowMarkup`]
//! and pushes changes into a [`Canvas`]. New rows always arrive in a single
//! [`Canvas::insert_rows`] call per render pass.

use std::collections::BTreeMap;

/// One rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMarkup {
    /// First column covered by the cell.
    pub cell: usize,
    /// Number of columns covered.
    pub colspan: usize,
    /// Space separated classes.
    pub classes: String,
    /// Formatted content.
    pub html: String,
}

impl CellMarkup {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.split_whitespace().any(|c| c == class)
    }

    fn toggle_class(&mut self, class: &str, on: bool) {
        let mut classes: Vec<&str> = self
            .classes
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        if on {
            classes.push(class);
        }
        self.classes = classes.join(" ");
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMarkup {
    pub row: usize,
    /// Position relative to the real canvas top.
    pub top: f64,
    pub classes: String,
    pub cells: Vec<CellMarkup>,
}

impl RowMarkup {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.split_whitespace().any(|c| c == class)
    }

    /// The cell starting at column `cell`.
    pub fn cell(&self, cell: usize) -> Option<&CellMarkup> {
        self.cells.iter().find(|c| c.cell == cell)
    }

    fn cell_mut(&mut self, cell: usize) -> Option<&mut CellMarkup> {
        self.cells.iter_mut().find(|c| c.cell == cell)
    }

    /// Serializes the row as HTML.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"ui-widget-content {}\" style=\"top:{}px\">",
            self.classes, self.top
        );
        for cell in &self.cells {
            html.push_str(&format!("<div class=\"{}\">{}</div>", cell.classes, cell.html));
        }
        html.push_str("</div>");
        html
    }
}

/// Receives the grid's view updates.
pub trait Canvas {
    /// Adds freshly rendered rows, all at once.
    fn insert_rows(&mut self, rows: Vec<RowMarkup>);

    /// Drops rendered rows.
    fn remove_rows(&mut self, rows: &[usize]);

    /// Moves rendered rows after a page offset change.
    fn reposition_rows(&mut self, positions: &[(usize, f64)]);

    /// Replaces a cell's content.
    fn update_cell(&mut self, row: usize, cell: usize, html: &str);

    /// Adds or removes one class on a cell.
    fn toggle_cell_class(&mut self, row: usize, cell: usize, class: &str, on: bool);

    /// Adds or removes one class on a row.
    fn toggle_row_class(&mut self, row: usize, class: &str, on: bool);

    /// Real canvas height.
    fn set_height(&mut self, _height: f64) {}

    /// Real scroll position.
    fn set_scroll_top(&mut self, _scroll_top: f64) {}

    /// Column widths, in column order.
    fn set_column_widths(&mut self, _widths: &[u32]) {}
}

/// A canvas keeping rendered rows in memory.
///
/// Used headless and in tests; `insert_batches` counts bulk inserts.
#[derive(Debug, Clone, Default)]
pub struct MemoryCanvas {
    rows: BTreeMap<usize, RowMarkup>,
    height: f64,
    scroll_top: f64,
    column_widths: Vec<u32>,
    insert_batches: usize,
}

impl MemoryCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &BTreeMap<usize, RowMarkup> {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&RowMarkup> {
        self.rows.get(&row)
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn column_widths(&self) -> &[u32] {
        &self.column_widths
    }

    /// Number of `insert_rows` calls so far.
    pub fn insert_batches(&self) -> usize {
        self.insert_batches
    }
}

impl Canvas for MemoryCanvas {
    fn insert_rows(&mut self, rows: Vec<RowMarkup>) {
        self.insert_batches += 1;
        for row in rows {
            self.rows.insert(row.row, row);
        }
    }

    fn remove_rows(&mut self, rows: &[usize]) {
        for row in rows {
            self.rows.remove(row);
        }
    }

    fn reposition_rows(&mut self, positions: &[(usize, f64)]) {
        for (row, top) in positions {
            if let Some(markup) = self.rows.get_mut(row) {
                markup.top = *top;
            }
        }
    }

    fn update_cell(&mut self, row: usize, cell: usize, html: &str) {
        if let Some(cell) = self.rows.get_mut(&row).and_then(|r| r.cell_mut(cell)) {
            cell.html = html.to_string();
        }
    }

    fn toggle_cell_class(&mut self, row: usize, cell: usize, class: &str, on: bool) {
        if let Some(cell) = self.rows.get_mut(&row).and_then(|r| r.cell_mut(cell)) {
            cell.toggle_class(class, on);
        }
    }

    fn toggle_row_class(&mut self, row: usize, class: &str, on: bool) {
        if let Some(markup) = self.rows.get_mut(&row) {
            let mut classes: Vec<&str> = markup
                .classes
                .split_whitespace()
                .filter(|c| *c != class)
                .collect();
            if on {
                classes.push(class);
            }
            markup.classes = classes.join(" ");
        }
    }

    fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top;
    }

    fn set_column_widths(&mut self, widths: &[u32]) {
        self.column_widths = widths.to_vec();
    }
}
