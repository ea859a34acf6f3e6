//! Column autosize on window resize.

use std::time::{Duration, Instant};

use crate::canvas::Canvas;
use crate::data::DataSource;
use crate::debounce::Debouncer;
use crate::event::Event;
use crate::grid::VirtualGrid;

/// Default settle time after the last resize.
pub const RESIZE_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeArgs {
    pub width: u32,
}

/// Autosizes the grid's columns once the window stopped resizing.
///
/// # Example
///
/// ```ignore
/// let mut responsive = Responsiveness::new();
/// responsive.on_resize.subscribe(|args| {
///     log::debug!("window is {}px wide", args.width);
///     Propagation::Continue
/// });
/// responsive.handle_resize(1024, Instant::now());
/// // later, from the host loop
/// responsive.poll(&mut grid, Instant::now());
/// ```
#[derive(Debug)]
pub struct Responsiveness {
    pending: Debouncer<u32>,
    /// Fired with the settled width, before the columns are autosized.
    pub on_resize: Event<ResizeArgs>,
}

impl Default for Responsiveness {
    fn default() -> Self {
        Self::with_delay(RESIZE_DELAY)
    }
}

impl Responsiveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            pending: Debouncer::new(delay),
            on_resize: Event::new(),
        }
    }

    /// Records a window resize. Restarts the delay.
    pub fn handle_resize(&mut self, width: u32, now: Instant) {
        self.pending.schedule(width, now);
    }

    /// When [`poll`](Self::poll) should be called next.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.deadline()
    }

    /// Applies a settled resize. Returns true when one was applied.
    pub fn poll<D: DataSource, C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<D, C>,
        now: Instant,
    ) -> bool {
        let Some(width) = self.pending.poll(now) else {
            return false;
        };
        log::debug!("window settled at {width}px, autosizing columns");
        self.on_resize.notify(&ResizeArgs { width });
        let height = grid.pager().viewport_height();
        grid.resize_viewport(width, height);
        grid.autosize_columns();
        true
    }

    pub fn destroy(&mut self) {
        self.pending.cancel();
        self.on_resize.unsubscribe_all();
    }
}
