//! Grid error types.
//!
//! These are integration errors: the host called the grid in a way its
//! configuration does not allow. They are raised immediately and never
//! retried.

/// Errors raised by the grid and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Editing was requested on a grid created with `editable: false`.
    #[error("Grid is not editable")]
    NotEditable,

    /// A selection operation was called without a selection model.
    #[error("Selection model is not set")]
    NoSelectionModel,

    /// A cell CSS overlay key is already registered.
    #[error("Cell CSS overlay '{0}' already exists")]
    CssKeyExists(String),

    /// Two data items share the same id.
    #[error("Each data element must have a unique id, '{0}' is duplicated")]
    DuplicateId(String),

    /// A data item has no id.
    #[error("Data element at index {0} has no id")]
    MissingId(usize),

    /// No data element has the given id.
    #[error("Unknown data element id: {0}")]
    UnknownId(String),

    /// A column id is not known to the grid.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Column ids passed to a reorder do not match the current columns.
    #[error("Column reorder must list every column exactly once")]
    InvalidColumnOrder,

    /// The edit lock is held by another controller.
    #[error("Edit lock is held by another controller")]
    LockHeld,

    /// The caller does not hold the edit lock.
    #[error("Caller is not the active edit controller")]
    NotLockHolder,
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
