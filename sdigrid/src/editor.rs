//! Cell editors and edit commands.
//!
//! The grid has no input widgets of its own. An [`Editor`] holds the value
//! being edited; the host feeds user input into it with
//! [`Editor::set_value`] and the grid drives the rest of its lifecycle:
//!
//! 1. created by an [`EditorFactory`] when a cell enters edit mode
//! 2. `load_value` from the row
//! 3. `validate` and `serialize_value` on commit
//! 4. `destroy` when the cell returns to normal mode

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::column::Column;
use crate::data::Record;
use crate::formatter::value_text;

// =============================================================================
// Validation
// =============================================================================

/// Outcome of validating an edited value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Validates a candidate value.
pub type Validator = Rc<dyn Fn(&Value) -> Validation>;

/// Rejects null and empty values.
pub fn required(value: &Value) -> Validation {
    let empty = match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    };
    if empty {
        Validation::invalid("This is a required field")
    } else {
        Validation::ok()
    }
}

/// The validators every grid knows by name.
pub fn builtin_validators() -> HashMap<String, Validator> {
    let mut validators: HashMap<String, Validator> = HashMap::new();
    validators.insert("required".into(), Rc::new(required));
    validators
}

// =============================================================================
// Editor
// =============================================================================

/// Writes a serialized value into a row.
pub type ValueApplier = Rc<dyn Fn(&mut Record, &Value)>;

/// Everything an editor factory gets to know about the cell.
#[derive(Clone)]
pub struct EditorArgs<'a> {
    pub row: usize,
    pub cell: usize,
    pub column: &'a Column,
    pub validator: Option<Validator>,
}

/// Creates an editor for a cell.
pub type EditorFactory = Rc<dyn Fn(&EditorArgs<'_>) -> Box<dyn Editor>>;

/// Fallback editor lookup used when a column names no editor.
pub type EditorLookup = Rc<dyn Fn(&Column) -> Option<EditorFactory>>;

/// An open cell editor.
pub trait Editor {
    /// Loads the current value from the row.
    fn load_value(&mut self, item: &Record);

    /// Replaces the value being edited, as typed by the user.
    fn set_value(&mut self, value: Value);

    /// The edited value, in the form stored in edit commands.
    fn serialize_value(&self) -> Value;

    /// How serialized values are written back to a row.
    fn value_applier(&self) -> ValueApplier;

    fn apply_value(&self, item: &mut Record, value: &Value) {
        (self.value_applier())(item, value)
    }

    fn is_value_changed(&self) -> bool;

    fn validate(&self) -> Validation;

    fn focus(&mut self) {}

    fn destroy(&mut self) {}
}

fn field_applier(field: &str) -> ValueApplier {
    let field = field.to_string();
    Rc::new(move |item: &mut Record, value: &Value| item.set(field.clone(), value.clone()))
}

/// Free text editor.
pub struct TextEditor {
    field: String,
    default_value: String,
    value: String,
    validator: Option<Validator>,
}

impl TextEditor {
    pub fn new(args: &EditorArgs<'_>) -> Self {
        Self {
            field: args.column.field.clone(),
            default_value: String::new(),
            value: String::new(),
            validator: args.validator.clone(),
        }
    }
}

impl Editor for TextEditor {
    fn load_value(&mut self, item: &Record) {
        self.default_value = item.get(&self.field).map(value_text).unwrap_or_default();
        self.value = self.default_value.clone();
    }

    fn set_value(&mut self, value: Value) {
        self.value = value_text(&value);
    }

    fn serialize_value(&self) -> Value {
        Value::String(self.value.clone())
    }

    fn value_applier(&self) -> ValueApplier {
        field_applier(&self.field)
    }

    fn is_value_changed(&self) -> bool {
        !(self.value.is_empty() && self.default_value.is_empty()) && self.value != self.default_value
    }

    fn validate(&self) -> Validation {
        match &self.validator {
            Some(validator) => validator(&self.serialize_value()),
            None => Validation::ok(),
        }
    }
}

/// Boolean toggle editor.
pub struct CheckboxEditor {
    field: String,
    default_value: bool,
    value: bool,
}

impl CheckboxEditor {
    pub fn new(args: &EditorArgs<'_>) -> Self {
        Self {
            field: args.column.field.clone(),
            default_value: false,
            value: false,
        }
    }
}

impl Editor for CheckboxEditor {
    fn load_value(&mut self, item: &Record) {
        self.default_value = item.flag(&self.field);
        self.value = self.default_value;
    }

    fn set_value(&mut self, value: Value) {
        self.value = value.as_bool().unwrap_or(false);
    }

    fn serialize_value(&self) -> Value {
        Value::Bool(self.value)
    }

    fn value_applier(&self) -> ValueApplier {
        field_applier(&self.field)
    }

    fn is_value_changed(&self) -> bool {
        self.value != self.default_value
    }

    fn validate(&self) -> Validation {
        Validation::ok()
    }
}

/// The editors every grid knows by name.
pub fn builtin_editors() -> HashMap<String, EditorFactory> {
    let mut editors: HashMap<String, EditorFactory> = HashMap::new();
    editors.insert(
        "text".into(),
        Rc::new(|args: &EditorArgs<'_>| Box::new(TextEditor::new(args)) as Box<dyn Editor>),
    );
    editors.insert(
        "checkbox".into(),
        Rc::new(|args: &EditorArgs<'_>| Box::new(CheckboxEditor::new(args)) as Box<dyn Editor>),
    );
    editors
}

// =============================================================================
// EditCommand
// =============================================================================

/// A committed edit that can be applied and reverted.
#[derive(Clone)]
pub struct EditCommand {
    pub row: usize,
    pub cell: usize,
    pub serialized_value: Value,
    pub prev_serialized_value: Value,
    applier: ValueApplier,
}

impl std::fmt::Debug for EditCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditCommand")
            .field("row", &self.row)
            .field("cell", &self.cell)
            .field("serialized_value", &self.serialized_value)
            .field("prev_serialized_value", &self.prev_serialized_value)
            .finish()
    }
}

impl EditCommand {
    pub(crate) fn new(
        row: usize,
        cell: usize,
        serialized_value: Value,
        prev_serialized_value: Value,
        applier: ValueApplier,
    ) -> Self {
        Self {
            row,
            cell,
            serialized_value,
            prev_serialized_value,
            applier,
        }
    }

    /// Writes the new value into `item`.
    pub fn execute(&self, item: &mut Record) {
        (self.applier)(item, &self.serialized_value);
    }

    /// Writes the previous value back into `item`.
    pub fn undo(&self, item: &mut Record) {
        (self.applier)(item, &self.prev_serialized_value);
    }
}
