//! Debounced search box.

use std::time::{Duration, Instant};

use sdigrid::debounce::Debouncer;

/// Wait after the last keystroke before filtering.
pub const FILTER_DELAY: Duration = Duration::from_millis(500);

/// Query parameter carrying the search string.
pub const FILTER_PARAM: &str = "filter";

/// Turns keystrokes into at most one filter change per pause in typing.
///
/// # Example
///
/// ```ignore
/// filter.key_up(input.value(), Instant::now());
/// // later, from the host loop
/// if let Some(args) = filter.poll(Instant::now()) {
///     model.set_filter_args(args, &mut grid)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FilterInput {
    debouncer: Debouncer<String>,
}

impl Default for FilterInput {
    fn default() -> Self {
        Self::new(FILTER_DELAY)
    }
}

impl FilterInput {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
        }
    }

    /// Records the current input value.
    pub fn key_up(&mut self, value: impl Into<String>, now: Instant) {
        self.debouncer.schedule(value.into(), now);
    }

    /// Empties the input. Goes through the same delay as typing.
    pub fn clear(&mut self, now: Instant) {
        self.key_up(String::new(), now);
    }

    /// When [`poll`](Self::poll) has something to return.
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Filter arguments for the model once typing paused.
    pub fn poll(&mut self, now: Instant) -> Option<[(&'static str, String); 1]> {
        self.debouncer
            .poll(now)
            .map(|value| [(FILTER_PARAM, value)])
    }
}
