//! Drag-and-drop row reordering.
//!
//! The manager tracks one drag gesture at a time. It never moves rows
//! itself: `on_move_rows` tells the host which rows should go where, and
//! the host reorders its data (or asks the server to) and re-renders.

use serde::Deserialize;

use crate::canvas::Canvas;
use crate::data::DataSource;
use crate::error::Result;
use crate::event::Event;
use crate::grid::VirtualGrid;

/// Behavior switches for [`RowMoveManager`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowMoveOptions {
    /// Discard an open edit instead of refusing the drag.
    pub cancel_edit_on_drag: bool,
    /// Dragging an unselected row adds it to the selection instead of
    /// replacing the selection.
    pub keep_selection_on_move: bool,
    /// A row dragged without a prior selection stays selected afterwards.
    pub single_stays_selected: bool,
    /// Veto drops directly before or after a moved row.
    pub prevent_dropping_on_self: bool,
}

impl Default for RowMoveOptions {
    fn default() -> Self {
        Self {
            cancel_edit_on_drag: false,
            keep_selection_on_move: false,
            single_stays_selected: true,
            prevent_dropping_on_self: false,
        }
    }
}

/// Rows being moved and the row they would be inserted before.
///
/// `insert_before == data length` means the end of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRowsArgs {
    pub rows: Vec<usize>,
    pub insert_before: usize,
}

impl MoveRowsArgs {
    /// Whether the drop lands right next to one of the moved rows.
    pub fn drops_on_self(&self) -> bool {
        self.rows
            .iter()
            .any(|&row| row == self.insert_before || row + 1 == self.insert_before)
    }
}

#[derive(Debug, Clone)]
struct DragState {
    rows: Vec<usize>,
    insert_before: Option<usize>,
    can_move: bool,
    no_initial_selection: bool,
}

/// Row reordering by dragging a `move` / `selectAndMove` handle column.
#[derive(Debug, Default)]
pub struct RowMoveManager {
    options: RowMoveOptions,
    drag: Option<DragState>,
    /// A handler returning a stop value vetoes the current drop position.
    pub on_before_move_rows: Event<MoveRowsArgs>,
    pub on_move_rows: Event<MoveRowsArgs>,
}

impl RowMoveManager {
    pub fn new(options: RowMoveOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &RowMoveOptions {
        &self.options
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Starts a drag on a cell.
    ///
    /// Only handle columns start a drag, and never while an edit is open.
    /// The dragged row joins (or replaces) the selection. Returns `Ok(true)`
    /// when the drag was taken.
    pub fn handle_drag_start<D: DataSource, C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<D, C>,
        row: usize,
        cell: usize,
    ) -> Result<bool> {
        let lock = grid.edit_lock().clone();
        if self.options.cancel_edit_on_drag && lock.is_active() {
            lock.cancel_current_edit(grid);
        }
        let is_handle = grid.columns().get(cell).is_some_and(|c| c.is_move_handle());
        if lock.is_active() || !is_handle || row >= grid.data_len() {
            return Ok(false);
        }

        let mut rows = grid.selected_rows()?.to_vec();
        let no_initial_selection = rows.is_empty();
        if no_initial_selection || !rows.contains(&row) {
            if !self.options.keep_selection_on_move {
                rows.clear();
            }
            rows.push(row);
            grid.set_selected_rows(&rows)?;
        }

        log::debug!("dragging {} row(s) from row {}", rows.len(), row);
        self.drag = Some(DragState {
            rows,
            insert_before: None,
            can_move: false,
            no_initial_selection,
        });
        Ok(true)
    }

    /// Tracks the pointer at canvas-relative `y`.
    ///
    /// Returns the row the drop guide should be drawn above, or `None` when
    /// not dragging or the current position is vetoed.
    pub fn handle_drag<D: DataSource, C: Canvas>(
        &mut self,
        grid: &VirtualGrid<D, C>,
        y: f64,
    ) -> Option<usize> {
        let drag = self.drag.as_mut()?;
        let row_height = grid.options().row_height;
        let insert_before = ((y + grid.pager().offset()) / row_height)
            .round()
            .max(0.0) as usize;
        let insert_before = insert_before.min(grid.data_len());

        if drag.insert_before != Some(insert_before) {
            let args = MoveRowsArgs {
                rows: drag.rows.clone(),
                insert_before,
            };
            let vetoed = (self.options.prevent_dropping_on_self && args.drops_on_self())
                || self.on_before_move_rows.notify(&args).is_handled();
            drag.can_move = !vetoed;
            drag.insert_before = Some(insert_before);
        }
        drag.can_move.then_some(insert_before)
    }

    /// Ends the drag, publishing `on_move_rows` when the last position was allowed.
    pub fn handle_drag_end<D: DataSource, C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<D, C>,
    ) -> Result<Option<MoveRowsArgs>> {
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };

        let moved = match drag.insert_before {
            Some(insert_before) if drag.can_move => {
                let args = MoveRowsArgs {
                    rows: drag.rows,
                    insert_before,
                };
                self.on_move_rows.notify(&args);
                Some(args)
            }
            _ => None,
        };

        if !self.options.single_stays_selected && drag.no_initial_selection {
            grid.set_selected_rows(&[])?;
        }
        Ok(moved)
    }

    pub fn destroy(&mut self) {
        self.drag = None;
        self.on_before_move_rows.unsubscribe_all();
        self.on_move_rows.unsubscribe_all();
    }
}

/// Applies a move to a list, returning the new order.
///
/// Moved items keep their relative order and land before the item that
/// was at `insert_before`.
pub fn apply_move<T: Clone>(items: &[T], args: &MoveRowsArgs) -> Vec<T> {
    let moved: Vec<T> = args
        .rows
        .iter()
        .filter_map(|&row| items.get(row).cloned())
        .collect();
    let split = args.insert_before.min(items.len());

    let mut result = Vec::with_capacity(items.len());
    for (i, item) in items[..split].iter().enumerate() {
        if !args.rows.contains(&i) {
            result.push(item.clone());
        }
    }
    result.extend(moved);
    for (i, item) in items[split..].iter().enumerate() {
        if !args.rows.contains(&(split + i)) {
            result.push(item.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::data::{Record, VecData};
    use crate::event::Propagation;
    use crate::grid::GridOptions;
    use crate::selection::RowSelectionModel;

    fn grid() -> VirtualGrid<VecData> {
        let mut data = VecData::new();
        data.set_items(
            (0..5)
                .map(|i| Record::new().with("id", format!("r{i}")).with("title", format!("row {i}")))
                .collect(),
        )
        .unwrap();
        let columns = vec![
            Column::new("handle", "").with_behavior("selectAndMove"),
            Column::new("title", "Title"),
        ];
        let mut grid = VirtualGrid::new(data, columns, GridOptions::default());
        grid.set_selection_model(RowSelectionModel::new());
        grid.resize_viewport(400, 250.0);
        grid
    }

    #[test]
    fn test_drag_outside_handle_is_ignored() {
        let mut grid = grid();
        let mut manager = RowMoveManager::default();
        assert!(!manager.handle_drag_start(&mut grid, 1, 1).unwrap());
        assert!(!manager.is_dragging());
    }

    #[test]
    fn test_drag_selects_row_and_moves() {
        let mut grid = grid();
        let mut manager = RowMoveManager::default();
        assert!(manager.handle_drag_start(&mut grid, 1, 0).unwrap());
        assert_eq!(grid.selected_rows().unwrap(), &[1]);

        assert_eq!(manager.handle_drag(&grid, 4.0 * 25.0 + 3.0), Some(4));
        let moved = manager.handle_drag_end(&mut grid).unwrap().unwrap();
        assert_eq!(moved, MoveRowsArgs { rows: vec![1], insert_before: 4 });
    }

    #[test]
    fn test_insert_before_is_clamped_to_length() {
        let mut grid = grid();
        let mut manager = RowMoveManager::default();
        manager.handle_drag_start(&mut grid, 0, 0).unwrap();
        assert_eq!(manager.handle_drag(&grid, 10_000.0), Some(5));
        assert_eq!(manager.handle_drag(&grid, -40.0), Some(0));
    }

    #[test]
    fn test_prevent_dropping_on_self() {
        let mut grid = grid();
        let mut manager = RowMoveManager::new(RowMoveOptions {
            prevent_dropping_on_self: true,
            ..Default::default()
        });
        manager.handle_drag_start(&mut grid, 2, 0).unwrap();
        assert_eq!(manager.handle_drag(&grid, 3.0 * 25.0), None);
        assert_eq!(manager.handle_drag_end(&mut grid).unwrap(), None);
    }

    #[test]
    fn test_before_move_veto() {
        let mut grid = grid();
        let mut manager = RowMoveManager::default();
        manager
            .on_before_move_rows
            .subscribe(|args| if args.insert_before == 0 { Propagation::StopPropagation } else { Propagation::Continue });
        manager.handle_drag_start(&mut grid, 3, 0).unwrap();
        assert_eq!(manager.handle_drag(&grid, 0.0), None);
        assert_eq!(manager.handle_drag(&grid, 25.0), Some(1));
    }

    #[test]
    fn test_apply_move() {
        let items = vec!["a", "b", "c", "d", "e"];
        let args = MoveRowsArgs { rows: vec![1, 3], insert_before: 0 };
        assert_eq!(apply_move(&items, &args), vec!["b", "d", "a", "c", "e"]);
        let args = MoveRowsArgs { rows: vec![0], insert_before: 5 };
        assert_eq!(apply_move(&items, &args), vec!["b", "c", "d", "e", "a"]);
    }
}
