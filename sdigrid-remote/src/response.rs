//! Contents endpoint responses.

use sdigrid::data::Record;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Rows `[from, to)` out of `total`, as answered by the server.
///
/// Reorder responses share the shape and add a flash message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowBatch {
    #[serde(default)]
    pub from: usize,
    #[serde(default)]
    pub to: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub records: Vec<Record>,
    /// Flash message to show after the load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    /// Flash queue the message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_queue: Option<String>,
}

impl RowBatch {
    pub fn new(from: usize, total: usize, records: Vec<Record>) -> Self {
        Self {
            from,
            to: from + records.len(),
            total,
            records,
            flash: None,
            flash_queue: None,
        }
    }

    pub fn with_flash(mut self, message: impl Into<String>, queue: impl Into<String>) -> Self {
        self.flash = Some(message.into());
        self.flash_queue = Some(queue.into());
        self
    }

    /// Flash message and queue, when both are present.
    pub fn flash_message(&self) -> Option<(&str, &str)> {
        match (&self.flash, &self.flash_queue) {
            (Some(message), Some(queue)) => Some((message.as_str(), queue.as_str())),
            _ => None,
        }
    }

    /// Row indices covered by the batch.
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.from..self.to
    }

    /// Checks that the batch can be merged as is.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.to < self.from {
            return Err(FetchError::Inconsistent(format!(
                "range {}..{} is inverted",
                self.from, self.to
            )));
        }
        if self.records.len() > self.to - self.from {
            return Err(FetchError::Inconsistent(format!(
                "{} records for range {}..{}",
                self.records.len(),
                self.from,
                self.to
            )));
        }
        Ok(())
    }
}
