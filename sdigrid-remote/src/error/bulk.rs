//! Bulk action error types

/// Errors raised while preparing a bulk action or a reorder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BulkError {
    /// More rows are selected than a bulk action accepts.
    #[error("Maximum {limit} items can be selected, {count} are selected")]
    TooManySelected {
        count: usize,
        limit: usize,
    },

    /// Nothing is selected.
    #[error("No items are selected")]
    EmptySelection,

    /// A selected row is not loaded, so its id is unknown.
    #[error("Row {0} is not loaded")]
    NotLoaded(usize),

    /// A selected row has no stable id.
    #[error("Row {0} has no id")]
    MissingId(usize),
}
