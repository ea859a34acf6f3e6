//! Event arguments published by the grid.

use crate::column::Column;
use crate::data::Record;
use crate::input::{KeyEvent, Modifiers};
use crate::pager::{RowRange, ScrollDirection};

use super::CssHash;
use crate::event::Event;

/// A cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub cell: usize,
}

impl CellPos {
    pub fn new(row: usize, cell: usize) -> Self {
        Self { row, cell }
    }
}

/// Sort state of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    pub column_id: String,
    pub sort_asc: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportChangedArgs {
    /// Raw viewport rows.
    pub viewport: RowRange,
    pub direction: ScrollDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollArgs {
    pub scroll_top: f64,
}

/// A sort request. Sorting the data is up to the subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct SortArgs {
    pub multi_column_sort: bool,
    /// Columns in priority order with their direction.
    pub sort_cols: Vec<(Column, bool)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeforeEditArgs {
    pub row: usize,
    pub cell: usize,
    pub column_id: String,
    pub item: Option<Record>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellChangeArgs {
    pub row: usize,
    pub cell: usize,
    /// The row after the edit was applied, unless an edit command handler
    /// deferred it.
    pub item: Option<Record>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddNewRowArgs {
    pub item: Record,
    pub column_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrorArgs {
    pub row: usize,
    pub cell: usize,
    pub column_id: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRowsChangedArgs {
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellCssStylesChangedArgs {
    pub key: String,
    /// `None` when the overlay was removed.
    pub hash: Option<CssHash>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnsChangedArgs {
    pub column_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickArgs {
    pub row: usize,
    pub cell: usize,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyDownArgs {
    pub event: KeyEvent,
    pub active: Option<CellPos>,
}

/// Every event the grid publishes.
#[derive(Debug, Default)]
pub struct GridEvents {
    pub on_viewport_changed: Event<ViewportChangedArgs>,
    pub on_scroll: Event<ScrollArgs>,
    pub on_sort: Event<SortArgs>,
    pub on_active_cell_changed: Event<Option<CellPos>>,
    /// A handler returning a stop value vetoes editing.
    pub on_before_edit_cell: Event<BeforeEditArgs>,
    pub on_cell_change: Event<CellChangeArgs>,
    pub on_add_new_row: Event<AddNewRowArgs>,
    pub on_validation_error: Event<ValidationErrorArgs>,
    pub on_selected_rows_changed: Event<SelectedRowsChangedArgs>,
    pub on_cell_css_styles_changed: Event<CellCssStylesChangedArgs>,
    pub on_columns_resized: Event<ColumnsChangedArgs>,
    pub on_columns_reordered: Event<ColumnsChangedArgs>,
    /// A handler returning `StopImmediate` suppresses the default click action.
    pub on_click: Event<ClickArgs>,
    /// A handler returning `StopImmediate` suppresses the default key action.
    pub on_key_down: Event<KeyDownArgs>,
}
