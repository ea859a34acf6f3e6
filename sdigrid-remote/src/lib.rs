//! Remote paging for sdigrid
//!
//! Loads the rows of a [`VirtualGrid`](sdigrid::VirtualGrid) on demand from
//! a folder contents endpoint: a sparse row cache, a request queue with
//! supersession, selection continuity across reloads, live updates over
//! server-sent events and the glue for bulk actions and drag reordering.

pub mod bulk;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod live;
pub mod model;
pub mod query;
pub mod queue;
pub mod reorder;
pub mod response;
pub mod sparse;
pub mod status;

pub use client::{ContentsClient, RowSource};
pub use config::RemoteModelConfig;
pub use error::{BulkError, FetchError, RemoteError};
pub use model::{Direction, LoadOutcome, RemoteModel};
pub use response::RowBatch;
pub use sparse::SparseRows;
