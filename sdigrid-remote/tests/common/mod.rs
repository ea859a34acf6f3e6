//! In-memory contents endpoint shared by the integration tests.

#![allow(dead_code)]

use std::result::Result;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sdigrid::prelude::*;
use sdigrid_remote::query::RangeQuery;
use sdigrid_remote::reorder::ReorderRequest;
use sdigrid_remote::{FetchError, RowBatch, RowSource, SparseRows};
use simplelog::{Config, LevelFilter, TestLogger};

/// Serves `item000`, `item001`, ... sorted by name.
pub struct MockSource {
    names: Mutex<Vec<String>>,
    queries: Mutex<Vec<RangeQuery>>,
    failure: Mutex<Option<u16>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSource {
    pub fn new(count: usize) -> Self {
        Self {
            names: Mutex::new((0..count).map(|i| format!("item{i:03}")).collect()),
            queries: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            delay: Duration::from_millis(5),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes every following fetch fail with `status`.
    pub fn fail_with(&self, status: Option<u16>) {
        *self.failure.lock().unwrap() = status;
    }

    pub fn queries(&self) -> Vec<RangeQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn window(&self, from: usize, to: usize, ascending: bool) -> RowBatch {
        let mut names = self.names.lock().unwrap().clone();
        if !ascending {
            names.reverse();
        }
        let end = to.min(names.len());
        let start = from.min(end);
        let records = names[start..end].iter().map(|name| record(name)).collect();
        RowBatch::new(start, names.len(), records)
    }
}

pub fn record(name: &str) -> Record {
    Record::new()
        .with("id", name)
        .with("name", name)
        .with("name_url", format!("http://cms.example/{name}/"))
}

#[async_trait]
impl RowSource for MockSource {
    async fn fetch_rows(&self, query: &RangeQuery) -> Result<RowBatch, FetchError> {
        self.queries.lock().unwrap().push(query.clone());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = *self.failure.lock().unwrap();
        if let Some(status) = failure {
            return Err(FetchError::http(status, "Service Unavailable"));
        }
        Ok(self.window(query.from, query.to, query.sort_dir))
    }

    async fn reorder(&self, request: &ReorderRequest) -> Result<RowBatch, FetchError> {
        tokio::time::sleep(self.delay).await;
        {
            let mut names = self.names.lock().unwrap();
            names.retain(|name| !request.item_ids.contains(name));
            let at = match &request.insert_before {
                Some(target) => names.iter().position(|n| n == target).unwrap_or(names.len()),
                None => names.len(),
            };
            for (offset, id) in request.item_ids.iter().enumerate() {
                names.insert(at + offset, id.clone());
            }
        }
        let count = request.item_ids.len();
        Ok(self
            .window(0, 50, true)
            .with_flash(format!("{count} rows moved."), "success"))
    }
}

/// A 10-row viewport with a row selection model.
pub fn grid() -> VirtualGrid<SparseRows> {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    let columns = vec![Column::new("name", "Name").with_sortable(true)];
    let mut grid = VirtualGrid::new(SparseRows::new(), columns, GridOptions::default());
    grid.set_selection_model(RowSelectionModel::new());
    grid.resize_viewport(400, 250.0);
    grid
}

pub fn name_at(grid: &VirtualGrid<SparseRows>, row: usize) -> Option<String> {
    grid.item(row)?.get("name")?.as_str().map(str::to_string)
}
