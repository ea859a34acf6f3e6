//! Remote paging model.
//!
//! `RemoteModel` keeps a [`SparseRows`] cache filled from a [`RowSource`].
//! Whenever the viewport moves it looks for missing rows, scanning from
//! the edge the user is scrolling towards, and fetches the smallest span
//! covering them, widened to `minimum_load` rows. Only the newest request
//! counts: a request superseded by a later one is discarded when its
//! outcome arrives, even if it succeeded.
//!
//! The model never holds the grid. The host owns both and passes the grid
//! in:
//!
//! ```ignore
//! let mut model = RemoteModel::new(config, Arc::new(client));
//! model.attach(&mut grid);
//! model.handle_viewport_changed(&mut grid)?;
//!
//! while let Some(completion) = model.next_completion().await {
//!     model.complete(completion, &mut grid)?;
//! }
//! ```

use std::cell::Cell;
use std::collections::HashSet;
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

use sdigrid::canvas::Canvas;
use sdigrid::data::DataSource;
use sdigrid::event::{Event, HandlerId, Propagation};
use sdigrid::grid::VirtualGrid;
use sdigrid::row_move::MoveRowsArgs;

use crate::client::RowSource;
use crate::config::RemoteModelConfig;
use crate::error::{FetchError, RemoteError};
use crate::query::RangeQuery;
use crate::queue::{Completion, RequestQueue, Ticket};
use crate::reorder::ReorderRequest;
use crate::response::RowBatch;
use crate::sparse::SparseRows;

// =============================================================================
// Events
// =============================================================================

/// A fetch for `[from, to)` is about to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLoadingArgs {
    pub from: usize,
    pub to: usize,
}

/// Rows were loaded.
///
/// `batch` is `None` when the viewport was already loaded and nothing was
/// fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataLoadedArgs {
    pub batch: Option<RowBatch>,
}

/// A fetch failed for a reason other than being superseded.
#[derive(Debug)]
pub struct AjaxErrorArgs {
    pub error: FetchError,
}

/// What [`RemoteModel::complete`] did with an outcome.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The batch was merged.
    Loaded(DataLoadedArgs),
    /// The request failed; the cache is unchanged.
    Failed(FetchError),
    /// The request was cancelled.
    Aborted,
    /// A newer request superseded this one; the outcome was dropped.
    Stale,
}

/// Direction the viewport is moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

// =============================================================================
// Fetch planning
// =============================================================================

/// Rows to fetch so that `[from, to)` is fully loaded.
///
/// Scans from the leading edge for the first and last missing row, then
/// widens the span to `minimum_load` rows in the direction of travel when
/// the requested range is shorter than that. `None` when nothing is
/// missing.
pub fn plan_fetch<D: DataSource>(
    data: &D,
    from: usize,
    to: usize,
    direction: Direction,
    minimum_load: usize,
) -> Option<Range<usize>> {
    let missing = |row: &usize| data.item(*row).is_none();
    let (first, last) = match direction {
        Direction::Forward => {
            let mut rows = (from..to).filter(missing);
            let first = rows.next()?;
            (first, rows.last().unwrap_or(first))
        }
        Direction::Backward => {
            let mut rows = (from..to).rev().filter(missing);
            let first = rows.next()?;
            (first, rows.last().unwrap_or(first))
        }
    };

    let (start, mut end) = (first, last);
    if minimum_load > 0 && to - from < minimum_load {
        end = match direction {
            Direction::Forward => start + minimum_load - 1,
            Direction::Backward => start.saturating_sub(minimum_load - 1),
        };
    }
    Some(start.min(end)..start.max(end) + 1)
}

// =============================================================================
// RemoteModel
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Rows,
    Reorder,
}

#[derive(Debug)]
struct ActiveRequest {
    ticket: Ticket,
    kind: RequestKind,
    rows: Range<usize>,
}

/// Set from grid event handlers, read by the model on its next call.
#[derive(Debug, Default)]
struct Signals {
    viewport_changed: Cell<bool>,
    selection_changed: Cell<bool>,
    /// The model itself is re-applying the selection.
    applying_selection: Cell<bool>,
}

#[derive(Debug)]
struct SelectionSync {
    preserve_hidden: bool,
    ids: HashSet<String>,
    handler: HandlerId,
}

/// Fills a grid's [`SparseRows`] from a [`RowSource`].
pub struct RemoteModel<S> {
    config: RemoteModelConfig,
    source: Arc<S>,
    queue: RequestQueue<RowBatch>,
    active: Option<ActiveRequest>,
    /// Top row of the previous viewport, `None` before the first one.
    scroll_position: Option<usize>,
    signals: Rc<Signals>,
    viewport_handler: Option<HandlerId>,
    selection: Option<SelectionSync>,

    pub on_data_loading: Event<DataLoadingArgs>,
    pub on_data_loaded: Event<DataLoadedArgs>,
    pub on_ajax_error: Event<AjaxErrorArgs>,
}

impl<S> std::fmt::Debug for RemoteModel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteModel")
            .field("config", &self.config)
            .field("active", &self.active)
            .field("scroll_position", &self.scroll_position)
            .finish_non_exhaustive()
    }
}

impl<S: RowSource + 'static> RemoteModel<S> {
    pub fn new(config: RemoteModelConfig, source: Arc<S>) -> Self {
        let queue = if config.manage_queue {
            RequestQueue::managed()
        } else {
            RequestQueue::unmanaged()
        };
        Self {
            config,
            source,
            queue,
            active: None,
            scroll_position: None,
            signals: Rc::new(Signals::default()),
            viewport_handler: None,
            selection: None,
            on_data_loading: Event::new(),
            on_data_loaded: Event::new(),
            on_ajax_error: Event::new(),
        }
    }

    pub fn config(&self) -> &RemoteModelConfig {
        &self.config
    }

    /// Whether a request is waiting for its outcome.
    pub fn has_active_request(&self) -> bool {
        self.active.is_some()
    }

    /// Rows of the active request.
    pub fn active_rows(&self) -> Option<Range<usize>> {
        self.active.as_ref().map(|a| a.rows.clone())
    }

    /// Listens to the grid's viewport changes. [`sync`](Self::sync) acts on
    /// them.
    pub fn attach<C: Canvas>(&mut self, grid: &mut VirtualGrid<SparseRows, C>) {
        if let Some(handler) = self.viewport_handler.take() {
            grid.events.on_viewport_changed.unsubscribe(handler);
        }
        let signals = Rc::clone(&self.signals);
        let handler = grid.events.on_viewport_changed.subscribe(move |_| {
            signals.viewport_changed.set(true);
            Propagation::Continue
        });
        self.viewport_handler = Some(handler);
    }

    /// Handles grid events recorded since the last call: remembers a changed
    /// selection and loads a moved viewport.
    pub fn sync<C: Canvas>(&mut self, grid: &mut VirtualGrid<SparseRows, C>) -> Result<(), RemoteError> {
        self.handle_selected_rows_changed(grid)?;
        if self.signals.viewport_changed.replace(false) {
            self.handle_viewport_changed(grid)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    fn abort_request(&mut self, force: bool) {
        if let Some(active) = self.active.take() {
            let cancel = force || self.config.really_abort;
            log::debug!(
                "superseding {:?} for rows {:?} (cancel: {cancel})",
                active.ticket,
                active.rows
            );
            self.queue.clear(cancel);
        }
    }

    /// Makes sure `[from, to)` is loaded, fetching what is missing.
    ///
    /// Always supersedes the active request first.
    pub fn ensure_data<D: DataSource>(
        &mut self,
        data: &D,
        from: usize,
        to: usize,
        direction: Direction,
    ) -> Result<(), RemoteError> {
        self.abort_request(false);
        if from >= to {
            return Err(RemoteError::InvalidRange { from, to });
        }

        let Some(rows) = plan_fetch(data, from, to, direction, self.config.minimum_load) else {
            log::trace!("rows {from}..{to} already loaded");
            self.on_data_loaded.notify(&DataLoadedArgs::default());
            return Ok(());
        };

        log::debug!("loading rows {rows:?} for viewport {from}..{to} ({direction:?})");
        self.on_data_loading.notify(&DataLoadingArgs {
            from: rows.start,
            to: rows.end,
        });

        let query = RangeQuery::new(rows.start, rows.end, &self.config);
        let source = Arc::clone(&self.source);
        let ticket = self
            .queue
            .submit(async move { source.fetch_rows(&query).await });
        self.active = Some(ActiveRequest {
            ticket,
            kind: RequestKind::Rows,
            rows,
        });
        Ok(())
    }

    /// Loads the rows under the grid's viewport.
    pub fn handle_viewport_changed<C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<(), RemoteError> {
        let viewport = grid.viewport();
        let top = viewport.top;
        let mut bottom = viewport.bottom;
        // once the total is known, rows past it are never fetched
        if grid.data_len() > 0 {
            bottom = bottom.min(grid.data_len());
        }
        if bottom <= top {
            log::trace!("viewport {top}..{bottom} is empty");
            return Ok(());
        }

        let direction = match self.scroll_position {
            Some(previous) if top < previous => Direction::Backward,
            _ => Direction::Forward,
        };
        self.ensure_data(grid.data(), top, bottom, direction)?;
        self.scroll_position = Some(top);
        Ok(())
    }

    /// Sends a reorder for the moved rows. Its answer replaces the cache.
    pub fn move_rows<C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<SparseRows, C>,
        args: &MoveRowsArgs,
    ) -> Result<ReorderRequest, RemoteError> {
        let request = ReorderRequest::from_move(grid.data(), args)?;
        self.handle_selected_rows_changed(grid)?;
        self.abort_request(true);

        let viewport = grid.viewport();
        let source = Arc::clone(&self.source);
        let body = request.clone();
        let ticket = self
            .queue
            .submit(async move { source.reorder(&body).await });
        self.active = Some(ActiveRequest {
            ticket,
            kind: RequestKind::Reorder,
            rows: viewport.top..viewport.bottom,
        });
        Ok(request)
    }

    /// Waits for the next request outcome.
    pub async fn next_completion(&mut self) -> Option<Completion<RowBatch>> {
        self.queue.next_outcome().await
    }

    /// Next request outcome if one is ready.
    pub fn try_next_completion(&mut self) -> Option<Completion<RowBatch>> {
        self.queue.try_next_outcome()
    }

    /// Applies a request outcome to the grid.
    ///
    /// Outcomes of superseded requests are dropped. Failures leave the cache
    /// alone; cancellations are silent, other errors are logged and
    /// published on `on_ajax_error`.
    pub fn complete<C: Canvas>(
        &mut self,
        completion: Completion<RowBatch>,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<LoadOutcome, RemoteError> {
        let active = match self.active.take() {
            Some(active) if active.ticket == completion.ticket => active,
            other => {
                self.active = other;
                log::debug!("dropping outcome of superseded {:?}", completion.ticket);
                return Ok(LoadOutcome::Stale);
            }
        };

        let result = completion
            .result
            .and_then(|batch| batch.validate().map(|()| batch));
        match result {
            Ok(batch) => {
                if active.kind == RequestKind::Reorder {
                    self.handle_selected_rows_changed(grid)?;
                    grid.data_mut().clear();
                    grid.invalidate_all_rows();
                }
                self.apply_batch(&batch, grid)?;
                let args = DataLoadedArgs { batch: Some(batch) };
                self.on_data_loaded.notify(&args);
                Ok(LoadOutcome::Loaded(args))
            }
            Err(error) if error.is_abort() => Ok(LoadOutcome::Aborted),
            Err(error) => {
                log::warn!("loading rows {:?} failed: {error}", active.rows);
                let args = AjaxErrorArgs { error };
                self.on_ajax_error.notify(&args);
                Ok(LoadOutcome::Failed(args.error))
            }
        }
    }

    /// Merges a batch the host already has, such as rows rendered into the
    /// page.
    pub fn load_data<C: Canvas>(
        &mut self,
        batch: &RowBatch,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<(), RemoteError> {
        batch
            .validate()
            .map_err(|err| RemoteError::InvalidBatch(err.to_string()))?;
        self.apply_batch(batch, grid)
    }

    fn apply_batch<C: Canvas>(
        &mut self,
        batch: &RowBatch,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<(), RemoteError> {
        // ids of a selection made before the merge refer to the old rows
        self.handle_selected_rows_changed(grid)?;

        log::debug!(
            "merging {} record(s) at {:?}, total {}",
            batch.records.len(),
            batch.rows(),
            batch.total
        );
        grid.data_mut().merge(batch);
        grid.update_row_count();
        let rows: Vec<usize> = batch.rows().collect();
        grid.invalidate_rows(&rows);
        grid.render();
        self.restore_selection(grid)
    }

    /// Empties the cache, cancels every request and reloads the viewport.
    pub fn clear_data<C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<(), RemoteError> {
        self.handle_selected_rows_changed(grid)?;
        grid.data_mut().clear();
        self.abort_request(true);
        grid.invalidate_all_rows();
        grid.render();
        self.handle_viewport_changed(grid)
    }

    /// Reloads everything, used when the server announces changes.
    pub fn reset_data<C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<(), RemoteError> {
        self.clear_data(grid)
    }

    /// Changes the server-side sort. Reloads only when it changed.
    pub fn set_sorting<C: Canvas>(
        &mut self,
        sort_col: impl Into<String>,
        sort_dir: bool,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<bool, RemoteError> {
        let sort_col = Some(sort_col.into());
        if self.config.sort_col == sort_col && self.config.sort_dir == sort_dir {
            return Ok(false);
        }
        self.config.sort_col = sort_col;
        self.config.sort_dir = sort_dir;
        self.clear_data(grid)?;
        Ok(true)
    }

    /// Updates pass-through query parameters. Reloads only when one changed.
    pub fn set_filter_args<C, I, K, V>(
        &mut self,
        args: I,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<bool, RemoteError>
    where
        C: Canvas,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut changed = false;
        for (key, value) in args {
            let (key, value) = (key.into(), value.into());
            if self.config.extra_query.get(&key) != Some(&value) {
                self.config.extra_query.insert(key, value);
                changed = true;
            }
        }
        if changed {
            self.clear_data(grid)?;
        }
        Ok(changed)
    }

    /// Cancels everything and detaches from the grid.
    pub fn destroy<C: Canvas>(&mut self, grid: &mut VirtualGrid<SparseRows, C>) {
        self.active = None;
        self.queue.clear(true);
        if let Some(handler) = self.viewport_handler.take() {
            grid.events.on_viewport_changed.unsubscribe(handler);
        }
        if let Some(sync) = self.selection.take() {
            grid.events.on_selected_rows_changed.unsubscribe(sync.handler);
        }
        grid.data_mut().clear();
        self.on_data_loading.unsubscribe_all();
        self.on_data_loaded.unsubscribe_all();
        self.on_ajax_error.unsubscribe_all();
    }

    // -------------------------------------------------------------------------
    // Selection continuity
    // -------------------------------------------------------------------------

    /// Keeps the selection attached to records instead of row indices, so it
    /// survives re-sorting and refetching.
    ///
    /// Without `preserve_hidden`, records that are not loaded after a merge
    /// drop out of the selection.
    pub fn sync_grid_selection<C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<SparseRows, C>,
        preserve_hidden: bool,
    ) -> Result<(), RemoteError> {
        let ids = rows_to_ids(grid.data(), grid.selected_rows()?)?;
        if let Some(previous) = self.selection.take() {
            grid.events.on_selected_rows_changed.unsubscribe(previous.handler);
        }

        let signals = Rc::clone(&self.signals);
        let handler = grid.events.on_selected_rows_changed.subscribe(move |_| {
            if !signals.applying_selection.get() {
                signals.selection_changed.set(true);
            }
            Propagation::Continue
        });
        self.selection = Some(SelectionSync {
            preserve_hidden,
            ids,
            handler,
        });
        Ok(())
    }

    /// Remembers the ids of a selection the user changed.
    pub fn handle_selected_rows_changed<C: Canvas>(
        &mut self,
        grid: &VirtualGrid<SparseRows, C>,
    ) -> Result<(), RemoteError> {
        if !self.signals.selection_changed.replace(false) {
            return Ok(());
        }
        if let Some(sync) = self.selection.as_mut() {
            sync.ids = rows_to_ids(grid.data(), grid.selected_rows()?)?;
            log::trace!("remembered {} selected id(s)", sync.ids.len());
        }
        Ok(())
    }

    /// Selected record ids, when selection sync is on.
    pub fn selected_ids(&self) -> Option<&HashSet<String>> {
        self.selection.as_ref().map(|s| &s.ids)
    }

    fn restore_selection<C: Canvas>(
        &mut self,
        grid: &mut VirtualGrid<SparseRows, C>,
    ) -> Result<(), RemoteError> {
        let Some(sync) = self.selection.as_mut() else {
            return Ok(());
        };

        let mut rows = Vec::new();
        for (row, record) in grid.data().loaded() {
            let id = record.id().ok_or(RemoteError::MissingId(row))?;
            if sync.ids.contains(&id) {
                rows.push(row);
            }
        }
        if !sync.preserve_hidden {
            sync.ids = rows_to_ids(grid.data(), &rows)?;
        }

        self.signals.applying_selection.set(true);
        let applied = grid.set_selected_rows(&rows);
        self.signals.applying_selection.set(false);
        applied?;
        Ok(())
    }
}

/// Ids of the loaded rows among `rows`. Rows that are not loaded are skipped.
fn rows_to_ids(data: &SparseRows, rows: &[usize]) -> Result<HashSet<String>, RemoteError> {
    let mut ids = HashSet::new();
    for &row in rows {
        let Some(record) = data.item(row) else {
            continue;
        };
        ids.insert(record.id().ok_or(RemoteError::MissingId(row))?);
    }
    Ok(ids)
}
