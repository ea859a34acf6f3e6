//! Active cell, keyboard navigation and clicks.

use super::{CellPos, ClickArgs, KeyDownArgs, VirtualGrid};
use crate::canvas::Canvas;
use crate::data::DataSource;
use crate::input::{Key, KeyEvent, Modifiers};
use crate::metadata::ColumnKey;
use crate::selection::SelectionContext;

/// Direction of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
    /// Right, wrapping to the first focusable cell of the next row.
    Next,
    /// Left, wrapping to the last focusable cell of the previous row.
    Prev,
}

/// A navigation target. `pos_x` is the column the cursor wants to stay in
/// when moving vertically through spanned cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    row: usize,
    cell: usize,
    pos_x: usize,
}

impl<D: DataSource, C: Canvas> VirtualGrid<D, C> {
    pub fn active_cell(&self) -> Option<CellPos> {
        self.active
    }

    // -------------------------------------------------------------------------
    // Focusability
    // -------------------------------------------------------------------------

    /// Whether a cell may become the active cell.
    pub fn can_cell_be_active(&self, row: usize, cell: usize) -> bool {
        if !self.options.enable_cell_navigation
            || row >= self.row_count()
            || cell >= self.columns.len()
        {
            return false;
        }

        let column = &self.columns[cell];
        if let Some(metadata) = self.data.item_metadata(row) {
            if let Some(focusable) = metadata.focusable {
                return focusable;
            }
            let by_id = metadata
                .columns
                .get(&ColumnKey::Id(column.id.clone()))
                .and_then(|c| c.focusable);
            let by_index = metadata
                .columns
                .get(&ColumnKey::Index(cell))
                .and_then(|c| c.focusable);
            if let Some(focusable) = by_id.or(by_index) {
                return focusable;
            }
        }
        column.focusable
    }

    /// Whether a cell takes part in selection overlays.
    pub fn can_cell_be_selected(&self, row: usize, cell: usize) -> bool {
        if row >= self.data.len() || cell >= self.columns.len() {
            return false;
        }

        let column = &self.columns[cell];
        if let Some(metadata) = self.data.item_metadata(row) {
            if let Some(selectable) = metadata.selectable {
                return selectable;
            }
            if let Some(selectable) = metadata.column(&column.id, cell).and_then(|c| c.selectable) {
                return selectable;
            }
        }
        column.selectable
    }

    fn find_first_focusable_cell(&self, row: usize) -> Option<usize> {
        let mut cell = 0;
        while cell < self.columns.len() {
            if self.can_cell_be_active(row, cell) {
                return Some(cell);
            }
            cell += self.colspan(row, cell);
        }
        None
    }

    fn find_last_focusable_cell(&self, row: usize) -> Option<usize> {
        let mut cell = 0;
        let mut last = None;
        while cell < self.columns.len() {
            if self.can_cell_be_active(row, cell) {
                last = Some(cell);
            }
            cell += self.colspan(row, cell);
        }
        last
    }

    /// The cell covering column `pos_x` in `row`, honoring spans.
    fn cell_at_pos_x(&self, row: usize, pos_x: usize) -> usize {
        let mut prev = 0;
        let mut cell = 0;
        while cell <= pos_x {
            prev = cell;
            cell += self.colspan(row, cell);
        }
        prev
    }

    // -------------------------------------------------------------------------
    // Steps
    // -------------------------------------------------------------------------

    fn goto_right(&self, row: usize, mut cell: usize) -> Option<Step> {
        let columns = self.columns.len();
        if cell >= columns {
            return None;
        }
        loop {
            cell += self.colspan(row, cell);
            if cell >= columns || self.can_cell_be_active(row, cell) {
                break;
            }
        }
        (cell < columns).then_some(Step {
            row,
            cell,
            pos_x: cell,
        })
    }

    fn goto_left(&self, row: usize, cell: usize) -> Option<Step> {
        if cell == 0 {
            return None;
        }
        let first = self.find_first_focusable_cell(row)?;
        if first >= cell {
            return None;
        }

        let mut prev = Step {
            row,
            cell: first,
            pos_x: first,
        };
        loop {
            let pos = self.goto_right(prev.row, prev.cell)?;
            if pos.cell >= cell {
                return Some(prev);
            }
            prev = pos;
        }
    }

    fn goto_down(&self, mut row: usize, pos_x: usize) -> Option<Step> {
        let row_count = self.row_count();
        loop {
            row += 1;
            if row >= row_count {
                return None;
            }
            let cell = self.cell_at_pos_x(row, pos_x);
            if self.can_cell_be_active(row, cell) {
                return Some(Step { row, cell, pos_x });
            }
        }
    }

    fn goto_up(&self, mut row: usize, pos_x: usize) -> Option<Step> {
        loop {
            row = row.checked_sub(1)?;
            let cell = self.cell_at_pos_x(row, pos_x);
            if self.can_cell_be_active(row, cell) {
                return Some(Step { row, cell, pos_x });
            }
        }
    }

    fn goto_next(&self, mut row: usize, cell: usize) -> Option<Step> {
        if let Some(step) = self.goto_right(row, cell) {
            return Some(step);
        }
        let row_count = self.row_count();
        loop {
            row += 1;
            if row >= row_count {
                return None;
            }
            if let Some(cell) = self.find_first_focusable_cell(row) {
                return Some(Step {
                    row,
                    cell,
                    pos_x: cell,
                });
            }
        }
    }

    fn goto_prev(&self, mut row: usize, mut cell: usize) -> Option<Step> {
        loop {
            if let Some(step) = self.goto_left(row, cell) {
                return Some(step);
            }
            row = row.checked_sub(1)?;
            cell = 0;
            if let Some(last) = self.find_last_focusable_cell(row) {
                return Some(Step {
                    row,
                    cell: last,
                    pos_x: last,
                });
            }
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Moves the active cell one step. Commits the open edit first.
    ///
    /// Returns true when the active cell moved.
    pub fn navigate(&mut self, dir: NavDirection) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        if !self.options.enable_cell_navigation || !self.commit_via_lock() {
            return false;
        }

        let pos_x = self.active_pos_x;
        let step = match dir {
            NavDirection::Up => self.goto_up(active.row, pos_x),
            NavDirection::Down => self.goto_down(active.row, pos_x),
            NavDirection::Left => self.goto_left(active.row, active.cell),
            NavDirection::Right => self.goto_right(active.row, active.cell),
            NavDirection::Next => self.goto_next(active.row, active.cell),
            NavDirection::Prev => self.goto_prev(active.row, active.cell),
        };

        let data_len = self.data.len();
        match step {
            Some(step) => {
                let is_add_row = step.row == data_len;
                self.scroll_row_into_view(step.row, !is_add_row);
                self.set_active_cell_internal(
                    Some(CellPos::new(step.row, step.cell)),
                    is_add_row || self.options.auto_edit,
                );
                self.active_pos_x = step.pos_x;
                true
            }
            None => {
                let edit = active.row == data_len || self.options.auto_edit;
                self.set_active_cell_internal(Some(active), edit);
                false
            }
        }
    }

    pub fn navigate_up(&mut self) -> bool {
        self.navigate(NavDirection::Up)
    }

    pub fn navigate_down(&mut self) -> bool {
        self.navigate(NavDirection::Down)
    }

    pub fn navigate_left(&mut self) -> bool {
        self.navigate(NavDirection::Left)
    }

    pub fn navigate_right(&mut self) -> bool {
        self.navigate(NavDirection::Right)
    }

    pub fn navigate_next(&mut self) -> bool {
        self.navigate(NavDirection::Next)
    }

    pub fn navigate_prev(&mut self) -> bool {
        self.navigate(NavDirection::Prev)
    }

    /// Makes a cell active without opening an editor. Out of range cells are ignored.
    pub fn set_active_cell(&mut self, row: usize, cell: usize) {
        if row > self.data.len() || cell >= self.columns.len() {
            return;
        }
        if !self.options.enable_cell_navigation {
            return;
        }
        self.scroll_row_into_view(row, false);
        self.set_active_cell_internal(Some(CellPos::new(row, cell)), false);
    }

    /// Commits the open edit and activates a focusable cell, opening its
    /// editor when `force_edit`, on the add row, or with `auto_edit`.
    pub fn goto_cell(&mut self, row: usize, cell: usize, force_edit: bool) {
        if !self.can_cell_be_active(row, cell) || !self.commit_via_lock() {
            return;
        }
        self.scroll_row_into_view(row, false);
        let edit = force_edit || row == self.data.len() || self.options.auto_edit;
        self.set_active_cell_internal(Some(CellPos::new(row, cell)), edit);
    }

    /// Clears the active cell.
    pub fn reset_active_cell(&mut self) {
        self.set_active_cell_internal(None, false);
    }

    pub(super) fn set_active_cell_internal(&mut self, new: Option<CellPos>, edit_mode: bool) {
        if let Some(old) = self.active {
            self.make_active_cell_normal();
            self.canvas.toggle_cell_class(old.row, old.cell, "active", false);
            self.canvas.toggle_row_class(old.row, "active", false);
        }

        let changed = self.active != new;
        self.active = new;

        if let Some(pos) = new {
            self.active_pos_x = pos.cell;
            self.canvas.toggle_cell_class(pos.row, pos.cell, "active", true);
            self.canvas.toggle_row_class(pos.row, "active", true);

            if self.options.editable
                && edit_mode
                && self.is_cell_potentially_editable(pos.row, pos.cell)
            {
                if let Err(err) = self.make_active_cell_editable() {
                    log::warn!("cannot edit cell {}:{}: {}", pos.row, pos.cell, err);
                }
            }
        }

        if changed {
            if let Some(pos) = new {
                self.scroll_row_into_view(pos.row, false);
            }
            self.events.on_active_cell_changed.notify(&new);

            let column_count = self.columns.len();
            let selection_changed = self
                .selection
                .as_mut()
                .is_some_and(|model| model.handle_active_cell_change(new.map(|p| p.row), column_count));
            if selection_changed {
                self.apply_selection_ranges();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Handles a key press on the grid. Returns true when the grid consumed it.
    pub fn handle_key_down(&mut self, event: KeyEvent) -> bool {
        let dispatch = self.events.on_key_down.notify(&KeyDownArgs {
            event,
            active: self.active,
        });
        if dispatch.immediate_stopped {
            return true;
        }

        let ctx = SelectionContext {
            column_count: self.columns.len(),
            row_count: self.row_count(),
            active_row: self.active.map(|a| a.row),
        };
        let scroll_to = self
            .selection
            .as_mut()
            .and_then(|model| model.handle_key_down(&event, ctx));
        if let Some(row) = scroll_to {
            self.apply_selection_ranges();
            self.scroll_row_into_view(row, false);
            return true;
        }

        let modifiers = event.modifiers;
        if modifiers.any() {
            if event.key == Key::Tab && modifiers == Modifiers::SHIFT {
                self.navigate(NavDirection::Prev);
                return true;
            }
            return false;
        }

        match event.key {
            Key::Escape => {
                if !self.edit_lock.is_active() {
                    return false;
                }
                self.cancel_via_lock();
            }
            Key::Left => {
                self.navigate(NavDirection::Left);
            }
            Key::Right => {
                self.navigate(NavDirection::Right);
            }
            Key::Up => {
                self.navigate(NavDirection::Up);
            }
            Key::Down => {
                self.navigate(NavDirection::Down);
            }
            Key::Tab => {
                self.navigate(NavDirection::Next);
            }
            Key::PageUp => self.scroll_page(-1),
            Key::PageDown => self.scroll_page(1),
            Key::Enter => {
                if self.options.editable {
                    if self.editing.is_some() {
                        if self.active.is_some_and(|a| a.row == self.data.len()) {
                            self.navigate(NavDirection::Down);
                        } else {
                            self.commit_edit_and_advance();
                        }
                    } else if self.commit_via_lock() {
                        if let Err(err) = self.make_active_cell_editable() {
                            log::warn!("cannot edit active cell: {err}");
                        }
                    }
                }
            }
            _ => return false,
        }
        true
    }

    /// Handles a click on a cell. Returns true when the grid consumed it.
    ///
    /// Ctrl and Shift clicks go to the selection model; plain clicks move
    /// the active cell, committing the open edit first.
    pub fn handle_click(&mut self, row: usize, cell: usize, modifiers: Modifiers) -> bool {
        if row >= self.row_count() || cell >= self.columns.len() {
            return false;
        }
        let clicked = CellPos::new(row, cell);
        if self.editing.is_some() && self.active == Some(clicked) {
            return false;
        }

        let dispatch = self.events.on_click.notify(&ClickArgs {
            row,
            cell,
            modifiers,
        });
        if dispatch.immediate_stopped {
            return true;
        }

        if self.options.multi_select && self.can_cell_be_active(row, cell) {
            let column_count = self.columns.len();
            let consumed = self
                .selection
                .as_mut()
                .is_some_and(|model| model.handle_click(row, modifiers, column_count));
            if consumed {
                self.apply_selection_ranges();
                return true;
            }
        }

        if self.active != Some(clicked) && self.can_cell_be_active(row, cell) {
            if !self.edit_lock.is_active() || self.commit_via_lock() {
                self.scroll_row_into_view(row, false);
                let edit = row == self.data.len() || self.options.auto_edit;
                self.set_active_cell_internal(Some(clicked), edit);
            }
        }
        true
    }
}
