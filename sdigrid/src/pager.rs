//! Virtual/real scroll translation.
//!
//! Canvases taller than a platform threshold do not render, so the virtual
//! content height `th` is split into `n` pages of height `ph` inside a bounded
//! real height `h`. The pager tracks the current `page` and the pixel `offset`
//! between virtual and real scroll positions:
//!
//! ```text
//! real_scroll_top = virtual_scroll_top - offset
//! ```
//!
//! `offset` only changes together with `page`, and every change of `offset`
//! requires all rendered rows to be repositioned.

use std::time::Duration;

/// Extra rows kept rendered on the trailing side of the scroll direction.
pub const MIN_BUFFER: usize = 3;

/// Scroll distance in pixels below which a scroll never re-renders.
const RENDER_THRESHOLD: f64 = 20.0;

/// Delay for renders following a page jump.
pub const DEFERRED_RENDER: Duration = Duration::from_millis(50);

/// Default maximum height a canvas may be given.
pub const DEFAULT_MAX_HEIGHT: f64 = 1_000_000.0;

/// Direction of the last vertical scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    /// Scrolling towards lower row indices.
    Up,
    /// No scroll observed yet.
    #[default]
    Unknown,
    /// Scrolling towards higher row indices.
    Down,
}

impl ScrollDirection {
    /// Signed step (-1, 0, +1).
    pub fn step(self) -> i64 {
        match self {
            Self::Up => -1,
            Self::Unknown => 0,
            Self::Down => 1,
        }
    }
}

/// An inclusive-exclusive pair of row indices.
///
/// For viewport ranges `bottom` is the raw `ceil` of the viewport edge and
/// may point past the last row. For rendered ranges `bottom` is the last
/// rendered row (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowRange {
    pub top: usize,
    pub bottom: usize,
}

impl RowRange {
    pub fn new(top: usize, bottom: usize) -> Self {
        Self { top, bottom }
    }

    /// Clamps both ends to `[0, row_count - 1]`. `None` when there are no rows.
    pub fn clamp_to(self, row_count: usize) -> Option<Self> {
        let last = row_count.checked_sub(1)?;
        Some(Self {
            top: self.top.min(last),
            bottom: self.bottom.min(last),
        })
    }

    /// Whether `row` lies in `[top, bottom]`.
    pub fn contains(&self, row: usize) -> bool {
        row >= self.top && row <= self.bottom
    }
}

/// Result of [`ViewportPager::scroll_to`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollChange {
    /// New real scroll top.
    pub scroll_top: f64,
    /// The page offset moved; every rendered row needs repositioning.
    pub offset_changed: bool,
    /// The real scroll top moved.
    pub scroll_top_changed: bool,
}

/// When the grid should re-render after a scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSchedule {
    /// Movement too small to matter.
    Skip,
    /// Render immediately.
    Now,
    /// Render after the given delay, replacing any pending render.
    Deferred(Duration),
}

/// Result of [`ViewportPager::handle_scroll`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOutcome {
    /// A page jump changed the offset; all rows must be invalidated.
    pub invalidate_all: bool,
    /// A small move crossed a page boundary. Rendered rows must be
    /// repositioned and the substrate scrolled to the new real scroll top.
    pub offset_changed: bool,
    /// Render scheduling for this scroll.
    pub render: RenderSchedule,
}

impl ScrollOutcome {
    /// Whether the viewport moved enough to notify listeners.
    pub fn viewport_changed(&self) -> bool {
        self.render != RenderSchedule::Skip
    }
}

/// Pages a virtual content height into a bounded real height.
#[derive(Debug, Clone)]
pub struct ViewportPager {
    row_height: f64,
    row_count: usize,
    viewport_height: f64,
    max_height: f64,

    /// Virtual content height.
    th: f64,
    /// Real canvas height.
    h: f64,
    /// Page height.
    ph: f64,
    /// Page count.
    n: usize,
    /// Jump coefficient.
    cj: f64,

    page: usize,
    offset: f64,

    scroll_top: f64,
    prev_scroll_top: f64,
    /// Virtual position of the last render.
    last_rendered_y: f64,
    direction: ScrollDirection,
}

impl Default for ViewportPager {
    fn default() -> Self {
        Self {
            row_height: 25.0,
            row_count: 0,
            viewport_height: 0.0,
            max_height: DEFAULT_MAX_HEIGHT,
            th: 0.0,
            h: 0.0,
            ph: 0.0,
            n: 1,
            cj: 0.0,
            page: 0,
            offset: 0.0,
            scroll_top: 0.0,
            prev_scroll_top: 0.0,
            last_rendered_y: 0.0,
            direction: ScrollDirection::Unknown,
        }
    }
}

impl ViewportPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the paging geometry and re-anchors the current position.
    ///
    /// The virtual position is kept when it is still inside the new content
    /// height, otherwise the viewport is moved to the bottom.
    pub fn configure(
        &mut self,
        row_height: f64,
        row_count: usize,
        viewport_height: f64,
        max_renderable_height: f64,
    ) {
        self.row_height = row_height.max(1.0);
        self.row_count = row_count;
        self.viewport_height = viewport_height.max(0.0);
        self.max_height = max_renderable_height.max(1.0);

        self.th = (self.row_height * row_count as f64).max(self.viewport_height);
        if self.th < self.max_height {
            self.h = self.th;
            self.ph = self.th;
            self.n = 1;
            self.cj = 0.0;
        } else {
            self.h = self.max_height;
            self.ph = self.h / 100.0;
            self.n = (self.th / self.ph).floor() as usize;
            self.cj = (self.th - self.h) / (self.n.saturating_sub(1).max(1)) as f64;
        }

        let in_range = self.scroll_top + self.offset <= self.th - self.viewport_height;
        if self.th == 0.0 || self.scroll_top == 0.0 {
            self.page = 0;
            self.offset = 0.0;
        } else if in_range {
            self.scroll_to(self.scroll_top + self.offset);
        } else {
            self.scroll_to(self.th - self.viewport_height);
        }
    }

    /// Updates only the viewport height, keeping everything else.
    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.configure(
            self.row_height,
            self.row_count,
            viewport_height,
            self.max_height,
        );
    }

    /// Scrolls to a virtual position.
    pub fn scroll_to(&mut self, virtual_y: f64) -> ScrollChange {
        let max_y = (self.th - self.viewport_height).max(0.0);
        let y = virtual_y.clamp(0.0, max_y);
        let old_offset = self.offset;

        self.page = self.page_for(y);
        self.offset = (self.page as f64 * self.cj).round();
        let new_scroll_top = y - self.offset;
        let offset_changed = self.offset != old_offset;

        let scroll_top_changed = self.prev_scroll_top != new_scroll_top;
        if scroll_top_changed {
            self.direction = if self.prev_scroll_top + old_offset < new_scroll_top + self.offset {
                ScrollDirection::Down
            } else {
                ScrollDirection::Up
            };
            self.prev_scroll_top = new_scroll_top;
            self.scroll_top = new_scroll_top;
        }

        ScrollChange {
            scroll_top: self.scroll_top,
            offset_changed,
            scroll_top_changed,
        }
    }

    /// Reacts to the real scrollbar being moved by the rendering substrate.
    ///
    /// Small moves stay on the current page. Moves of a viewport or more are
    /// page jumps: the page is recomputed proportionally from the real
    /// scrollbar position.
    pub fn handle_scroll(&mut self, real_scroll_top: f64) -> ScrollOutcome {
        let mut invalidate_all = false;
        let mut offset_changed = false;
        let distance = (real_scroll_top - self.prev_scroll_top).abs();

        if distance > 0.0 {
            self.direction = if self.prev_scroll_top < real_scroll_top {
                ScrollDirection::Down
            } else {
                ScrollDirection::Up
            };
            self.prev_scroll_top = real_scroll_top;
            self.scroll_top = real_scroll_top;

            if distance < self.viewport_height {
                offset_changed = self.scroll_to(real_scroll_top + self.offset).offset_changed;
            } else {
                let old_offset = self.offset;
                self.page = if self.h == self.viewport_height {
                    0
                } else {
                    let ratio = (self.th - self.viewport_height) / (self.h - self.viewport_height);
                    let page = (real_scroll_top * ratio / self.ph).floor().max(0.0) as usize;
                    page.min(self.n.saturating_sub(1))
                };
                self.offset = (self.page as f64 * self.cj).round();
                invalidate_all = old_offset != self.offset;
            }
        }

        let render = if distance == 0.0 {
            RenderSchedule::Skip
        } else {
            let moved = (self.last_rendered_y - (self.scroll_top + self.offset)).abs();
            if moved <= RENDER_THRESHOLD {
                RenderSchedule::Skip
            } else if moved < self.viewport_height {
                RenderSchedule::Now
            } else {
                RenderSchedule::Deferred(DEFERRED_RENDER)
            }
        };

        ScrollOutcome {
            invalidate_all,
            offset_changed,
            render,
        }
    }

    /// Raw viewport rows for a real scroll top. `bottom` may exceed the row count.
    pub fn visible_range(&self, scroll_top: f64) -> RowRange {
        let virtual_top = (scroll_top + self.offset).max(0.0);
        RowRange {
            top: (virtual_top / self.row_height).floor() as usize,
            bottom: ((virtual_top + self.viewport_height) / self.row_height).ceil() as usize,
        }
    }

    /// Visible range padded by a direction-biased buffer, clamped to the rows.
    pub fn rendered_range(&self, scroll_top: f64, direction: ScrollDirection) -> Option<RowRange> {
        let visible = self.visible_range(scroll_top);
        let buffer = (self.viewport_height / self.row_height).round() as usize;

        let (before, after) = match direction {
            ScrollDirection::Up => (buffer, MIN_BUFFER),
            ScrollDirection::Down => (MIN_BUFFER, buffer),
            ScrollDirection::Unknown => (MIN_BUFFER, MIN_BUFFER),
        };

        RowRange {
            top: visible.top.saturating_sub(before),
            bottom: visible.bottom.saturating_add(after),
        }
        .clamp_to(self.row_count)
    }

    /// Marks the current position as rendered.
    pub fn mark_rendered(&mut self) {
        self.last_rendered_y = self.scroll_top + self.offset;
    }

    fn page_for(&self, y: f64) -> usize {
        if self.ph <= 0.0 {
            return 0;
        }
        ((y / self.ph).floor() as usize).min(self.n.saturating_sub(1))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Virtual content height.
    pub fn virtual_height(&self) -> f64 {
        self.th
    }

    /// Real canvas height.
    pub fn real_height(&self) -> f64 {
        self.h
    }

    pub fn page_height(&self) -> f64 {
        self.ph
    }

    pub fn page_count(&self) -> usize {
        self.n
    }

    pub fn jump_coefficient(&self) -> f64 {
        self.cj
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Current real scroll top.
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Vertical position of a row relative to the real canvas.
    pub fn row_top(&self, row: usize) -> f64 {
        self.row_height * row as f64 - self.offset
    }

    /// Row under a canvas-relative y coordinate.
    pub fn row_at(&self, y: f64) -> usize {
        ((y + self.offset) / self.row_height).floor().max(0.0) as usize
    }
}
