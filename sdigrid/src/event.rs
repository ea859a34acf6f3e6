//! Typed grid events.
//!
//! Each event name is an [`Event<A>`] carrying its own argument type.
//! Handlers run in subscription order and steer propagation through the
//! returned [`Propagation`] value instead of mutating the event.

// =============================================================================
// Propagation
// =============================================================================

/// What a handler wants to happen after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Keep going.
    #[default]
    Continue,
    /// Remaining handlers still run, but the grid skips its default action.
    StopPropagation,
    /// No further handlers run and the grid skips its default action.
    StopImmediate,
}

/// Outcome of dispatching an event to all handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    /// Some handler asked to stop propagation.
    pub propagation_stopped: bool,
    /// Some handler asked to stop immediate propagation.
    pub immediate_stopped: bool,
}

impl Dispatch {
    /// Whether the default action of the event should be skipped.
    pub fn is_handled(&self) -> bool {
        self.propagation_stopped || self.immediate_stopped
    }
}

// =============================================================================
// Event
// =============================================================================

/// Handle returned by [`Event::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

type Handler<A> = Box<dyn FnMut(&A) -> Propagation>;

/// A named event with ordered handlers.
///
/// # Example
///
/// ```ignore
/// grid.events.on_sort.subscribe(|args| {
///     log::info!("sort requested on {} column(s)", args.sort_cols.len());
///     Propagation::Continue
/// });
/// ```
pub struct Event<A> {
    handlers: Vec<(HandlerId, Handler<A>)>,
    next_id: usize,
}

impl<A> Default for Event<A> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<A> std::fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<A> Event<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn subscribe<F>(&mut self, handler: F) -> HandlerId
    where
        F: FnMut(&A) -> Propagation + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Removes a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Removes every handler.
    pub fn unsubscribe_all(&mut self) {
        self.handlers.clear();
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Runs the handlers in subscription order.
    pub fn notify(&mut self, args: &A) -> Dispatch {
        let mut dispatch = Dispatch::default();
        for (_, handler) in self.handlers.iter_mut() {
            match handler(args) {
                Propagation::Continue => {}
                Propagation::StopPropagation => dispatch.propagation_stopped = true,
                Propagation::StopImmediate => {
                    dispatch.immediate_stopped = true;
                    break;
                }
            }
        }
        dispatch
    }
}
