//! Headless virtual grid
//!
//! Renders a window of rows out of an arbitrarily large data source into a
//! pluggable canvas, with editing, selection, sorting state and column
//! resize. Plugins for row dragging, checkbox selection and responsive
//! column sizing live next to the grid.

pub mod canvas;
pub mod checkbox;
pub mod column;
pub mod data;
pub mod debounce;
pub mod edit_lock;
pub mod editor;
pub mod error;
pub mod event;
pub mod formatter;
pub mod grid;
pub mod input;
pub mod metadata;
pub mod pager;
pub mod range;
pub mod responsive;
pub mod row_move;
pub mod selection;

pub use error::{GridError, Result};
pub use grid::VirtualGrid;

pub mod prelude {
    pub use crate::canvas::{Canvas, CellMarkup, MemoryCanvas, RowMarkup};
    pub use crate::checkbox::CheckboxSelectColumn;
    pub use crate::column::Column;
    pub use crate::data::{DataSource, Record, VecData, field_comparer};
    pub use crate::edit_lock::{EditController, EditLock};
    pub use crate::editor::{EditCommand, Editor, Validation};
    pub use crate::error::{GridError, Result};
    pub use crate::event::{Event, Propagation};
    pub use crate::grid::{CellPos, GridEvents, GridOptions, NavDirection, SortColumn, VirtualGrid};
    pub use crate::input::{Key, KeyEvent, Modifiers};
    pub use crate::metadata::{ColumnMetadata, ItemMetadata};
    pub use crate::pager::{RenderSchedule, RowRange, ScrollDirection, ViewportPager};
    pub use crate::responsive::Responsiveness;
    pub use crate::row_move::{MoveRowsArgs, RowMoveManager, RowMoveOptions};
    pub use crate::selection::RowSelectionModel;
}
