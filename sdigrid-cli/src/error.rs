use std::path::PathBuf;

use sdigrid_remote::{BulkError, FetchError, RemoteError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no settings file given and no config directory on this platform")]
    NoSettings,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Settings {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid row list {0:?}")]
    InvalidRows(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Bulk(#[from] BulkError),

    #[error(transparent)]
    Grid(#[from] sdigrid::GridError),
}
