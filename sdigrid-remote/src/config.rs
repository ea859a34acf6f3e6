//! Remote model configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Settings of a [`RemoteModel`](crate::model::RemoteModel).
///
/// Deserializes from the camelCase JSON the CMS renders next to the grid.
///
/// # Example
///
/// ```
/// use sdigrid_remote::config::RemoteModelConfig;
///
/// let config = RemoteModelConfig::new("/folder/@@contents.json")
///     .with_sort_col("name")
///     .with_minimum_load(200);
/// assert!(config.sort_dir);
/// assert!(config.manage_queue);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteModelConfig {
    /// Contents endpoint.
    pub url: String,
    /// Field the server sorts by.
    #[serde(default)]
    pub sort_col: Option<String>,
    /// `true` for ascending.
    #[serde(default = "default_true")]
    pub sort_dir: bool,
    /// Passed through to the server on every request.
    #[serde(default)]
    pub extra_query: BTreeMap<String, String>,
    /// Smallest number of rows fetched when the viewport is shorter.
    #[serde(default)]
    pub minimum_load: usize,
    /// Route requests through the single-slot queue.
    #[serde(default = "default_true")]
    pub manage_queue: bool,
    /// Cancel the running request whenever a newer one supersedes it.
    ///
    /// Clearing the data always cancels, regardless of this flag.
    #[serde(default)]
    pub really_abort: bool,
}

fn default_true() -> bool {
    true
}

impl RemoteModelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sort_col: None,
            sort_dir: true,
            extra_query: BTreeMap::new(),
            minimum_load: 0,
            manage_queue: true,
            really_abort: false,
        }
    }

    /// Sets the initial sort column.
    pub fn with_sort_col(mut self, sort_col: impl Into<String>) -> Self {
        self.sort_col = Some(sort_col.into());
        self
    }

    /// Sets the initial sort direction.
    pub fn with_sort_dir(mut self, ascending: bool) -> Self {
        self.sort_dir = ascending;
        self
    }

    /// Adds a pass-through query parameter.
    pub fn with_extra_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_query.insert(key.into(), value.into());
        self
    }

    pub fn with_minimum_load(mut self, minimum_load: usize) -> Self {
        self.minimum_load = minimum_load;
        self
    }

    /// Disables the single-slot queue. Requests then run as soon as they
    /// are submitted.
    pub fn with_manage_queue(mut self, manage_queue: bool) -> Self {
        self.manage_queue = manage_queue;
        self
    }

    pub fn with_really_abort(mut self, really_abort: bool) -> Self {
        self.really_abort = really_abort;
        self
    }
}
