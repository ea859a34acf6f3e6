//! Live updates over server-sent events.
//!
//! The server announces content changes as named events. Any of them means
//! the loaded rows may be stale, so the model drops its cache and reloads
//! the viewport, unless a request is already running.

use std::collections::VecDeque;
use std::time::Duration;

use futures::Stream;
use sdigrid::canvas::Canvas;
use sdigrid::grid::VirtualGrid;

use crate::client::RowSource;
use crate::error::{FetchError, RemoteError};
use crate::model::RemoteModel;
use crate::sparse::SparseRows;
use crate::status::StatusBoard;

/// Wait before reconnecting a closed event stream.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Content changes the server announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveEvent {
    ContentAdded,
    ContentRemoved,
    ContentMoved,
    ContentDuplicated,
}

impl LiveEvent {
    /// Maps an event name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ContentAdded" => Some(Self::ContentAdded),
            "ContentRemoved" => Some(Self::ContentRemoved),
            "ContentMoved" => Some(Self::ContentMoved),
            "ContentDuplicated" => Some(Self::ContentDuplicated),
            _ => None,
        }
    }
}

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    pub event: String,
    pub data: String,
}

/// Incremental `text/event-stream` parser.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the events it completed.
    ///
    /// Chunks may split lines, or even characters.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        self.buffer.extend_from_slice(chunk);
        let mut messages = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(message) = self.line(line) {
                messages.push(message);
            }
        }
        messages
    }

    fn line(&mut self, line: &str) -> Option<SseMessage> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        let event = self.event.take();
        if self.data.is_empty() && event.is_none() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseMessage {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// An open event stream.
pub struct EventStream {
    response: reqwest::Response,
    parser: SseParser,
    pending: VecDeque<SseMessage>,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl EventStream {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            parser: SseParser::new(),
            pending: VecDeque::new(),
        }
    }

    /// Next raw message, `None` once the server closed the stream.
    pub async fn next_message(&mut self) -> Result<Option<SseMessage>, FetchError> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Ok(Some(message));
            }
            match self.response.chunk().await? {
                Some(chunk) => self.pending.extend(self.parser.feed(&chunk)),
                None => return Ok(None),
            }
        }
    }

    /// Next content change. Other events are skipped.
    pub async fn next_event(&mut self) -> Result<Option<LiveEvent>, FetchError> {
        while let Some(message) = self.next_message().await? {
            match LiveEvent::from_name(&message.event) {
                Some(event) => return Ok(Some(event)),
                None => log::trace!("ignoring '{}' event", message.event),
            }
        }
        Ok(None)
    }

    /// Content changes as a stream. Ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<LiveEvent, FetchError>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut stream = state?;
            match stream.next_event().await {
                Ok(Some(event)) => Some((Ok(event), Some(stream))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}

/// Reacts to a content change. Returns whether the data was reset.
pub fn apply_live_event<S, C>(
    event: LiveEvent,
    model: &mut RemoteModel<S>,
    grid: &mut VirtualGrid<SparseRows, C>,
    status: &mut StatusBoard,
) -> Result<bool, RemoteError>
where
    S: RowSource + 'static,
    C: Canvas,
{
    log::debug!("live update: {event:?}");
    status.clear_errors();
    if model.has_active_request() {
        return Ok(false);
    }
    model.reset_data(grid)?;
    Ok(true)
}

/// Reacts to the event stream coming back after an outage: stale error
/// banners go away and the viewport is reloaded.
pub fn handle_reconnected<S, C>(
    model: &mut RemoteModel<S>,
    grid: &mut VirtualGrid<SparseRows, C>,
    status: &mut StatusBoard,
) -> Result<bool, RemoteError>
where
    S: RowSource + 'static,
    C: Canvas,
{
    if status.banners().is_empty() {
        return Ok(false);
    }
    status.clear_errors();
    if !model.has_active_request() {
        model.reset_data(grid)?;
    }
    Ok(true)
}
