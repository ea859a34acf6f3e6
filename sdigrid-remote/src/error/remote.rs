//! Remote model error types

use sdigrid::GridError;

use super::BulkError;

/// Integration errors of the remote model.
///
/// Like [`GridError`], these mean the host used the model in a way its
/// configuration does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// `ensure_data` was called with an empty or inverted range.
    #[error("Invalid row range {from}..{to}")]
    InvalidRange {
        from: usize,
        to: usize,
    },

    /// A loaded record has no stable id.
    #[error("Loaded row {0} has no id")]
    MissingId(usize),

    /// An inline batch contradicts its own range.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// Moved rows could not be mapped to ids.
    #[error(transparent)]
    Bulk(#[from] BulkError),

    /// The grid rejected an operation.
    #[error(transparent)]
    Grid(#[from] GridError),
}
