//! Cell editing.

use serde_json::Value;

use super::{AddNewRowArgs, BeforeEditArgs, CellChangeArgs, ValidationErrorArgs, VirtualGrid};
use crate::canvas::Canvas;
use crate::column::Column;
use crate::data::{DataSource, Record};
use crate::edit_lock::{ControllerId, EditController};
use crate::editor::{EditCommand, Editor, EditorArgs, EditorFactory, Validator};
use crate::error::{GridError, Result};

/// The open editor and the serialized value it was loaded with.
pub(super) struct ActiveEdit {
    pub(super) editor: Box<dyn Editor>,
    serialized_value: Value,
}

impl<D: DataSource, C: Canvas> VirtualGrid<D, C> {
    /// Whether an editor is open.
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// The open editor, for feeding it user input.
    pub fn active_editor_mut(&mut self) -> Option<&mut (dyn Editor + 'static)> {
        self.editing.as_mut().map(|edit| edit.editor.as_mut())
    }

    /// Whether `cell` of `row` could be edited at all.
    ///
    /// Unloaded rows never are. On the add row, columns flagged
    /// `cannot_trigger_insert` are not.
    pub fn is_cell_potentially_editable(&self, row: usize, cell: usize) -> bool {
        let Some(column) = self.columns.get(cell) else {
            return false;
        };
        let data_len = self.data.len();
        if row < data_len && self.data.item(row).is_none() {
            return false;
        }
        if column.cannot_trigger_insert && row >= data_len {
            return false;
        }
        self.editor_for(row, cell).is_some()
    }

    fn editor_for(&self, row: usize, cell: usize) -> Option<EditorFactory> {
        let column = self.columns.get(cell)?;
        let metadata = self.data.item_metadata(row);
        let name = metadata
            .as_ref()
            .and_then(|m| m.column(&column.id, cell))
            .and_then(|c| c.editor.clone())
            .or_else(|| column.editor.clone());

        if let Some(name) = name {
            match self.editors.get(&name) {
                Some(factory) => return Some(factory.clone()),
                None => log::warn!("unknown editor '{}' on column '{}'", name, column.id),
            }
        }
        self.editor_lookup.as_ref().and_then(|lookup| lookup(column))
    }

    fn validator_for(&self, column: &Column) -> Option<Validator> {
        let name = column.validator.as_ref()?;
        let validator = self.validators.get(name);
        if validator.is_none() {
            log::warn!("unknown validator '{}' on column '{}'", name, column.id);
        }
        validator.cloned()
    }

    /// Opens an editor on the active cell.
    ///
    /// Does nothing when there is no active cell, the cell has no editor or
    /// an `on_before_edit_cell` handler vetoes it.
    pub fn make_active_cell_editable(&mut self) -> Result<()> {
        let Some(active) = self.active else {
            return Ok(());
        };
        if !self.options.editable {
            return Err(GridError::NotEditable);
        }
        if self.editing.is_some() || !self.is_cell_potentially_editable(active.row, active.cell) {
            return Ok(());
        }
        let Some(factory) = self.editor_for(active.row, active.cell) else {
            return Ok(());
        };

        let column = self.columns[active.cell].clone();
        let item = self.data.item(active.row).cloned();
        let dispatch = self.events.on_before_edit_cell.notify(&BeforeEditArgs {
            row: active.row,
            cell: active.cell,
            column_id: column.id.clone(),
            item: item.clone(),
        });
        if dispatch.is_handled() {
            log::debug!("edit of {}:{} vetoed", active.row, active.cell);
            return Ok(());
        }

        self.edit_lock.activate(self.id)?;

        let mut editor = factory(&EditorArgs {
            row: active.row,
            cell: active.cell,
            column: &column,
            validator: self.validator_for(&column),
        });
        if let Some(item) = &item {
            editor.load_value(item);
        }
        let serialized_value = editor.serialize_value();
        editor.focus();

        self.canvas
            .toggle_cell_class(active.row, active.cell, "editable", true);
        self.canvas.update_cell(active.row, active.cell, "");
        self.editing = Some(ActiveEdit {
            editor,
            serialized_value,
        });
        Ok(())
    }

    /// Closes the editor and restores the cell's formatted content.
    pub(super) fn make_active_cell_normal(&mut self) {
        let Some(mut edit) = self.editing.take() else {
            return;
        };
        edit.editor.destroy();

        if let Some(active) = self.active {
            self.canvas
                .toggle_cell_class(active.row, active.cell, "editable", false);
            self.canvas
                .toggle_cell_class(active.row, active.cell, "invalid", false);
            if self.data.item(active.row).is_some() && active.cell < self.columns.len() {
                let html = self.format_cell(active.row, active.cell);
                self.canvas.update_cell(active.row, active.cell, &html);
            }
        }

        if let Err(err) = self.edit_lock.deactivate(self.id) {
            log::warn!("closing editor: {err}");
        }
    }

    /// Commits the open editor.
    ///
    /// Returns false when the value does not validate; the editor then stays
    /// open and the cell is flagged `invalid`. Also returns false when an
    /// event handler re-acquired the edit lock.
    pub fn commit_current_edit(&mut self) -> bool {
        let (Some(active), Some(edit)) = (self.active, self.editing.as_ref()) else {
            self.make_active_cell_normal();
            return true;
        };

        if !edit.editor.is_value_changed() {
            self.make_active_cell_normal();
            return true;
        }

        let validation = edit.editor.validate();
        if !validation.valid {
            self.canvas
                .toggle_cell_class(active.row, active.cell, "invalid", true);
            let column_id = self.columns[active.cell].id.clone();
            self.events.on_validation_error.notify(&ValidationErrorArgs {
                row: active.row,
                cell: active.cell,
                column_id,
                message: validation.message,
            });
            if let Some(edit) = self.editing.as_mut() {
                edit.editor.focus();
            }
            return false;
        }

        let serialized_value = edit.editor.serialize_value();
        let prev_serialized_value = edit.serialized_value.clone();
        let applier = edit.editor.value_applier();
        let column = self.columns[active.cell].clone();

        if active.row < self.data.len() {
            let command = EditCommand::new(
                active.row,
                active.cell,
                serialized_value,
                prev_serialized_value,
                applier,
            );
            if self.edit_command_handler.is_some() {
                self.make_active_cell_normal();
                let item = self.data.item(active.row).cloned();
                if let Some(handler) = self.edit_command_handler.as_mut() {
                    handler(item.as_ref(), &column, command);
                }
            } else {
                self.execute_edit_command(&command);
                self.make_active_cell_normal();
            }

            let item = self.data.item(active.row).cloned();
            self.events.on_cell_change.notify(&CellChangeArgs {
                row: active.row,
                cell: active.cell,
                item,
            });
        } else {
            let mut item = Record::new();
            applier(&mut item, &serialized_value);
            self.make_active_cell_normal();
            self.events.on_add_new_row.notify(&AddNewRowArgs {
                item,
                column_id: column.id,
            });
        }

        !self.edit_lock.is_active()
    }

    /// Discards the open editor.
    pub fn cancel_current_edit(&mut self) -> bool {
        self.make_active_cell_normal();
        true
    }

    /// Applies a command to its row and re-formats the row.
    ///
    /// Returns false when the row is not loaded.
    pub fn execute_edit_command(&mut self, command: &EditCommand) -> bool {
        let Some(item) = self.data.item_mut(command.row) else {
            return false;
        };
        command.execute(item);
        self.update_row(command.row);
        true
    }

    /// Reverts a command on its row and re-formats the row.
    pub fn undo_edit_command(&mut self, command: &EditCommand) -> bool {
        let Some(item) = self.data.item_mut(command.row) else {
            return false;
        };
        command.undo(item);
        self.update_row(command.row);
        true
    }

    /// Commits, and on success moves down when `auto_edit` is on.
    pub(super) fn commit_edit_and_advance(&mut self) {
        if self.commit_via_lock() && self.options.auto_edit {
            self.navigate(super::NavDirection::Down);
        }
    }

    pub(super) fn cancel_via_lock(&mut self) -> bool {
        let lock = self.edit_lock.clone();
        lock.cancel_current_edit(self)
    }
}

impl<D: DataSource, C: Canvas> EditController for VirtualGrid<D, C> {
    fn controller_id(&self) -> ControllerId {
        self.id
    }

    fn commit_current_edit(&mut self) -> bool {
        VirtualGrid::commit_current_edit(self)
    }

    fn cancel_current_edit(&mut self) -> bool {
        VirtualGrid::cancel_current_edit(self)
    }
}
