//! The virtual grid.
//!
//! `VirtualGrid` renders a window of rows out of a [`DataSource`] into a
//! [`Canvas`]. Only rows inside the pager's rendered range exist as nodes;
//! scrolling drops rows that left the range and renders the new ones in one
//! bulk insert.
//!
//! The grid owns columns, the active cell, the open editor, sort state and
//! named cell CSS overlays. Selection semantics live in the
//! [`RowSelectionModel`]; sorting the data is left to whoever subscribes to
//! `on_sort`.
//!
//! # Example
//!
//! ```ignore
//! let mut grid = VirtualGrid::new(data, columns, GridOptions::default());
//! grid.resize_viewport(800, 600.0);
//! grid.events.on_sort.subscribe(|args| {
//!     log::info!("sort by {}", args.sort_cols[0].0.field);
//!     Propagation::Continue
//! });
//! grid.scroll_row_to_top(500);
//! ```

mod columns;
mod css;
mod edit;
mod events;
mod navigation;
mod options;
mod render;

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

pub use css::CellFlash;
pub use events::*;
pub use navigation::NavDirection;
pub use options::GridOptions;

use crate::canvas::{Canvas, MemoryCanvas};
use crate::column::{Column, ColumnResize};
use crate::data::{DataSource, Record};
use crate::edit_lock::{ControllerId, EditLock};
use crate::editor::{
    EditCommand, EditorFactory, EditorLookup, Validator, builtin_editors, builtin_validators,
};
use crate::formatter::{Formatter, FormatterFactory, builtin_formatters};
use crate::pager::{RenderSchedule, RowRange, ScrollDirection, ViewportPager};
use crate::selection::RowSelectionModel;

/// Cell classes of one overlay: row -> column id -> class.
pub type CssHash = HashMap<usize, HashMap<String, String>>;

/// Receives committed edits instead of the grid applying them.
///
/// The handler gets the row as it was before the edit. Apply the command
/// later with [`VirtualGrid::execute_edit_command`].
pub type EditCommandHandler = Box<dyn FnMut(Option<&Record>, &Column, EditCommand)>;

/// A rendered row: the cells it holds as `(first column, colspan)`.
#[derive(Debug, Clone, Default)]
struct RowNode {
    cells: Vec<(usize, usize)>,
}

impl RowNode {
    fn has_cell(&self, cell: usize) -> bool {
        self.cells.iter().any(|(start, _)| *start == cell)
    }
}

/// Virtualized grid over a data source.
pub struct VirtualGrid<D: DataSource, C: Canvas = MemoryCanvas> {
    id: ControllerId,
    options: GridOptions,
    columns: Vec<Column>,
    column_index: HashMap<String, usize>,
    data: D,
    canvas: C,
    pager: ViewportPager,
    viewport_width: u32,

    rows_cache: BTreeMap<usize, RowNode>,
    active: Option<CellPos>,
    active_pos_x: usize,
    editing: Option<edit::ActiveEdit>,
    edit_lock: EditLock,

    cell_css: Vec<(String, CssHash)>,
    sort_columns: Vec<SortColumn>,
    selection: Option<RowSelectionModel>,
    selected_rows: Vec<usize>,
    column_resize: Option<ColumnResize>,

    formatters: HashMap<String, Formatter>,
    formatter_factory: Option<FormatterFactory>,
    editors: HashMap<String, EditorFactory>,
    editor_lookup: Option<EditorLookup>,
    validators: HashMap<String, Validator>,
    edit_command_handler: Option<EditCommandHandler>,

    /// Published events.
    pub events: GridEvents,
}

impl<D: DataSource> VirtualGrid<D, MemoryCanvas> {
    /// Creates a grid rendering into an in-memory canvas.
    pub fn new(data: D, columns: Vec<Column>, options: GridOptions) -> Self {
        Self::with_canvas(data, columns, options, MemoryCanvas::new())
    }
}

impl<D: DataSource, C: Canvas> VirtualGrid<D, C> {
    /// Creates a grid rendering into `canvas`.
    pub fn with_canvas(data: D, columns: Vec<Column>, options: GridOptions, canvas: C) -> Self {
        let mut grid = Self {
            id: ControllerId::next(),
            options,
            columns: Vec::new(),
            column_index: HashMap::new(),
            data,
            canvas,
            pager: ViewportPager::new(),
            viewport_width: 0,
            rows_cache: BTreeMap::new(),
            active: None,
            active_pos_x: 0,
            editing: None,
            edit_lock: EditLock::new(),
            cell_css: Vec::new(),
            sort_columns: Vec::new(),
            selection: None,
            selected_rows: Vec::new(),
            column_resize: None,
            formatters: builtin_formatters(),
            formatter_factory: None,
            editors: builtin_editors(),
            editor_lookup: None,
            validators: builtin_validators(),
            edit_command_handler: None,
            events: GridEvents::default(),
        };
        grid.install_columns(columns);
        grid.update_row_count();
        grid
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Shares an edit lock with other grids.
    pub fn with_edit_lock(mut self, lock: EditLock) -> Self {
        self.edit_lock = lock;
        self
    }

    pub fn with_formatter(mut self, name: impl Into<String>, formatter: Formatter) -> Self {
        self.formatters.insert(name.into(), formatter);
        self
    }

    pub fn with_formatter_factory(mut self, factory: FormatterFactory) -> Self {
        self.formatter_factory = Some(factory);
        self
    }

    pub fn with_editor(mut self, name: impl Into<String>, factory: EditorFactory) -> Self {
        self.editors.insert(name.into(), factory);
        self
    }

    pub fn with_editor_lookup(mut self, lookup: EditorLookup) -> Self {
        self.editor_lookup = Some(lookup);
        self
    }

    pub fn with_validator(mut self, name: impl Into<String>, validator: Validator) -> Self {
        self.validators.insert(name.into(), validator);
        self
    }

    pub fn with_edit_command_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(Option<&Record>, &Column, EditCommand) + 'static,
    {
        self.edit_command_handler = Some(Box::new(handler));
        self
    }

    /// Registers a formatter after construction.
    pub fn register_formatter(&mut self, name: impl Into<String>, formatter: Formatter) {
        self.formatters.insert(name.into(), formatter);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn controller_id(&self) -> ControllerId {
        self.id
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    /// Mutable data access. Call [`invalidate`](Self::invalidate) or the
    /// row-level invalidation methods afterwards.
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn pager(&self) -> &ViewportPager {
        &self.pager
    }

    pub fn edit_lock(&self) -> &EditLock {
        &self.edit_lock
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Position of a column id.
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.column_index.get(id).copied()
    }

    /// Rows including the add-row slot.
    pub fn row_count(&self) -> usize {
        self.data.len() + usize::from(self.options.enable_add_row)
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    pub fn item(&self, row: usize) -> Option<&Record> {
        self.data.item(row)
    }

    /// Rows currently rendered.
    pub fn rendered_rows(&self) -> Vec<usize> {
        self.rows_cache.keys().copied().collect()
    }

    pub fn is_row_rendered(&self, row: usize) -> bool {
        self.rows_cache.contains_key(&row)
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn scroll_direction(&self) -> ScrollDirection {
        self.pager.direction()
    }

    /// Raw viewport rows at the current scroll position.
    pub fn viewport(&self) -> RowRange {
        self.pager.visible_range(self.pager.scroll_top())
    }

    /// Viewport rows clamped to existing rows.
    pub fn visible_range(&self) -> Option<RowRange> {
        self.viewport().clamp_to(self.row_count())
    }

    /// Rows that should exist as nodes at the current scroll position.
    pub fn rendered_range(&self) -> Option<RowRange> {
        self.pager
            .rendered_range(self.pager.scroll_top(), self.pager.direction())
    }

    // -------------------------------------------------------------------------
    // Row count and invalidation
    // -------------------------------------------------------------------------

    /// Re-reads the data length, drops nodes past the end and re-pages.
    pub fn update_row_count(&mut self) {
        let row_count = self.row_count();
        let stale: Vec<usize> = self
            .rows_cache
            .range(row_count..)
            .map(|(row, _)| *row)
            .collect();
        self.remove_rows(&stale);

        let old_offset = self.pager.offset();
        self.pager.configure(
            self.options.row_height,
            row_count,
            self.pager.viewport_height(),
            self.options.max_supported_css_height,
        );
        self.canvas.set_height(self.pager.real_height());
        if self.pager.offset() != old_offset {
            self.reposition_rows();
        }
        self.canvas.set_scroll_top(self.pager.scroll_top());
    }

    /// Forgets the nodes of `rows`. Takes effect on the next render.
    pub fn invalidate_rows(&mut self, rows: &[usize]) {
        if rows.is_empty() {
            return;
        }
        if let Some(active) = self.active {
            if self.editing.is_some() && rows.contains(&active.row) {
                self.make_active_cell_normal();
            }
        }
        let cached: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|row| self.rows_cache.contains_key(row))
            .collect();
        self.remove_rows(&cached);
    }

    pub fn invalidate_row(&mut self, row: usize) {
        self.invalidate_rows(&[row]);
    }

    /// Forgets every node. Takes effect on the next render.
    pub fn invalidate_all_rows(&mut self) {
        if self.editing.is_some() {
            self.make_active_cell_normal();
        }
        let all = self.rendered_rows();
        self.remove_rows(&all);
    }

    /// Re-reads everything and renders.
    pub fn invalidate(&mut self) {
        self.update_row_count();
        self.invalidate_all_rows();
        self.render();
    }

    fn remove_rows(&mut self, rows: &[usize]) {
        if rows.is_empty() {
            return;
        }
        for row in rows {
            self.rows_cache.remove(row);
        }
        self.canvas.remove_rows(rows);
    }

    fn reposition_rows(&mut self) {
        let positions: Vec<(usize, f64)> = self
            .rows_cache
            .keys()
            .map(|&row| (row, self.pager.row_top(row)))
            .collect();
        self.canvas.reposition_rows(&positions);
    }

    // -------------------------------------------------------------------------
    // Viewport and scrolling
    // -------------------------------------------------------------------------

    /// Resizes the viewport and re-renders.
    pub fn resize_viewport(&mut self, width: u32, height: f64) {
        self.viewport_width = width;
        self.pager.set_viewport_height(height);
        if self.options.force_fit_columns {
            self.autosize_columns();
        }
        self.update_row_count();
        self.render();
    }

    /// Scrolls to a virtual position without rendering.
    pub fn scroll_to(&mut self, virtual_y: f64) {
        let change = self.pager.scroll_to(virtual_y);
        if change.offset_changed {
            let keep = self.rendered_range();
            self.cleanup_rows(keep);
            self.reposition_rows();
        }
        if change.scroll_top_changed {
            self.canvas.set_scroll_top(change.scroll_top);
            self.notify_viewport_changed();
        }
    }

    /// Reacts to the substrate's scrollbar moving to `real_scroll_top`.
    ///
    /// Renders right away for small moves. For page jumps the returned
    /// schedule asks the host to call [`render`](Self::render) after a delay;
    /// a newer schedule replaces a pending one.
    pub fn handle_scroll(&mut self, real_scroll_top: f64) -> RenderSchedule {
        let outcome = self.pager.handle_scroll(real_scroll_top);
        if outcome.invalidate_all {
            self.invalidate_all_rows();
        } else if outcome.offset_changed {
            let keep = self.rendered_range();
            self.cleanup_rows(keep);
            self.reposition_rows();
            self.canvas.set_scroll_top(self.pager.scroll_top());
        }
        if outcome.render == RenderSchedule::Now {
            self.render();
        }
        if outcome.viewport_changed() {
            self.notify_viewport_changed();
        }
        self.events.on_scroll.notify(&ScrollArgs {
            scroll_top: self.pager.scroll_top(),
        });
        outcome.render
    }

    /// Puts `row` at the top of the viewport.
    pub fn scroll_row_to_top(&mut self, row: usize) {
        self.scroll_to(row as f64 * self.options.row_height);
        self.render();
    }

    /// Scrolls the minimum needed to show `row`. With `do_paging` the row
    /// lands on the opposite edge instead, like a page turn.
    pub fn scroll_row_into_view(&mut self, row: usize, do_paging: bool) {
        let rh = self.options.row_height;
        let vh = self.pager.viewport_height();
        let virtual_top = self.pager.scroll_top() + self.pager.offset();
        let row_at_top = row as f64 * rh;
        let row_at_bottom = (row + 1) as f64 * rh - vh;

        if (row + 1) as f64 * rh > virtual_top + vh {
            self.scroll_to(if do_paging { row_at_top } else { row_at_bottom });
            self.render();
        } else if row_at_top < virtual_top {
            self.scroll_to(if do_paging { row_at_bottom } else { row_at_top });
            self.render();
        }
    }

    /// Scrolls one viewport down (`1`) or up (`-1`) and moves the active cell along.
    pub fn scroll_page(&mut self, dir: i64) {
        let rh = self.options.row_height;
        let visible_rows = (self.pager.viewport_height() / rh).floor() as i64;
        let delta = dir * visible_rows;
        let top_row = self.pager.row_at(self.pager.scroll_top()) as i64;
        self.scroll_to(((top_row + delta).max(0)) as f64 * rh);
        self.render();

        if !self.options.enable_cell_navigation {
            return;
        }
        let Some(active) = self.active else { return };
        let last = self.row_count() as i64 - 1;
        if last < 0 {
            return;
        }
        let row = (active.row as i64 + delta).clamp(0, last) as usize;
        let pos_x = self.active_pos_x;
        let mut cell = 0;
        let mut target = None;
        while cell <= pos_x && cell < self.columns.len() {
            if self.can_cell_be_active(row, cell) {
                target = Some(cell);
            }
            cell += self.colspan(row, cell);
        }
        match target {
            Some(cell) => {
                self.set_active_cell_internal(Some(CellPos::new(row, cell)), false);
                self.active_pos_x = pos_x;
            }
            None => self.reset_active_cell(),
        }
    }

    fn notify_viewport_changed(&mut self) {
        let args = ViewportChangedArgs {
            viewport: self.viewport(),
            direction: self.pager.direction(),
        };
        self.events.on_viewport_changed.notify(&args);
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    pub fn sort_columns(&self) -> &[SortColumn] {
        &self.sort_columns
    }

    /// Records the sort state shown in the headers. Does not sort the data.
    pub fn set_sort_columns(&mut self, sort_columns: Vec<SortColumn>) {
        self.sort_columns = sort_columns
            .into_iter()
            .filter(|s| self.column_index.contains_key(&s.column_id))
            .collect();
    }

    pub fn set_sort_column(&mut self, column_id: impl Into<String>, sort_asc: bool) {
        self.set_sort_columns(vec![SortColumn {
            column_id: column_id.into(),
            sort_asc,
        }]);
    }

    /// Header click on a sortable column: toggles its direction and fires
    /// `on_sort`. Ctrl removes the column from a multi-column sort, Shift
    /// appends to it.
    pub fn handle_header_click(&mut self, column_id: &str, modifiers: crate::input::Modifiers) {
        let Some(index) = self.column_index(column_id) else {
            return;
        };
        let column = self.columns[index].clone();
        if !column.sortable || !self.commit_via_lock() {
            return;
        }

        let multi = self.options.multi_column_sort;
        let mut sort_columns = std::mem::take(&mut self.sort_columns);
        let position = sort_columns.iter().position(|s| s.column_id == column.id);
        let mut sort_asc = column.default_sort_asc;
        if let Some(i) = position {
            sort_columns[i].sort_asc = !sort_columns[i].sort_asc;
            sort_asc = sort_columns[i].sort_asc;
        }

        if modifiers.ctrl && multi {
            if let Some(i) = position {
                sort_columns.remove(i);
            }
        } else {
            let existing = position.map(|i| sort_columns[i].clone());
            if !modifiers.shift || !multi {
                sort_columns.clear();
            }
            match existing {
                None => sort_columns.push(SortColumn {
                    column_id: column.id.clone(),
                    sort_asc,
                }),
                Some(existing) if sort_columns.is_empty() => sort_columns.push(existing),
                Some(_) => {}
            }
        }
        self.set_sort_columns(sort_columns);

        let sort_cols = if multi {
            self.sort_columns
                .iter()
                .filter_map(|s| {
                    self.column_index(&s.column_id)
                        .map(|i| (self.columns[i].clone(), s.sort_asc))
                })
                .collect()
        } else {
            vec![(column, sort_asc)]
        };
        log::debug!("sort requested on {} column(s)", sort_cols.len());
        self.events.on_sort.notify(&SortArgs {
            multi_column_sort: multi,
            sort_cols,
        });
    }

    /// Commits any open edit through the edit lock.
    fn commit_via_lock(&mut self) -> bool {
        let lock = self.edit_lock.clone();
        lock.commit_current_edit(self)
    }
}

impl<D: DataSource + std::fmt::Debug, C: Canvas> std::fmt::Debug for VirtualGrid<D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualGrid")
            .field("id", &self.id)
            .field("columns", &self.columns.len())
            .field("data", &self.data)
            .field("rendered", &self.rows_cache.len())
            .field("active", &self.active)
            .finish()
    }
}

/// Shorthand for registering closures as formatters.
pub fn formatter<F>(f: F) -> Formatter
where
    F: Fn(usize, usize, &serde_json::Value, &Column, &Record) -> String + 'static,
{
    Rc::new(f)
}
