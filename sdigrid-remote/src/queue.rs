//! Request queue.
//!
//! Fetches run on spawned tasks. In managed mode a single-permit semaphore
//! keeps at most one of them in flight and the rest wait in submission
//! order. Outcomes come back over a channel tagged with the [`Ticket`]
//! returned by [`RequestQueue::submit`].

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;

/// Identifies one submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// The outcome of a submitted request.
#[derive(Debug)]
pub struct Completion<T> {
    pub ticket: Ticket,
    pub result: Result<T, FetchError>,
}

/// Submits requests and collects their outcomes.
pub struct RequestQueue<T> {
    limiter: Option<Arc<Semaphore>>,
    queued: CancellationToken,
    running: CancellationToken,
    sender: mpsc::UnboundedSender<Completion<T>>,
    receiver: mpsc::UnboundedReceiver<Completion<T>>,
    next_ticket: u64,
}

impl<T> std::fmt::Debug for RequestQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestQueue")
            .field("managed", &self.limiter.is_some())
            .field("next_ticket", &self.next_ticket)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> RequestQueue<T> {
    /// Queue running one request at a time.
    pub fn managed() -> Self {
        Self::with_limiter(Some(Arc::new(Semaphore::new(1))))
    }

    /// Queue starting every request immediately.
    pub fn unmanaged() -> Self {
        Self::with_limiter(None)
    }

    fn with_limiter(limiter: Option<Arc<Semaphore>>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            limiter,
            queued: CancellationToken::new(),
            running: CancellationToken::new(),
            sender,
            receiver,
            next_ticket: 0,
        }
    }

    pub fn is_managed(&self) -> bool {
        self.limiter.is_some()
    }

    /// Spawns `request` and returns its ticket.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F>(&mut self, request: F) -> Ticket
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        let limiter = self.limiter.clone();
        let queued = self.queued.clone();
        let running = self.running.clone();
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => {
                    let acquired = tokio::select! {
                        biased;
                        _ = queued.cancelled() => None,
                        permit = semaphore.acquire_owned() => permit.ok(),
                    };
                    match acquired {
                        Some(permit) => Some(permit),
                        None => {
                            log::trace!("{ticket:?} dropped from queue");
                            let _ = sender.send(Completion {
                                ticket,
                                result: Err(FetchError::Aborted),
                            });
                            return;
                        }
                    }
                }
                None => None,
            };

            let result = tokio::select! {
                biased;
                _ = running.cancelled() => Err(FetchError::Aborted),
                result = request => result,
            };
            if sender.send(Completion { ticket, result }).is_err() {
                log::trace!("{ticket:?} finished after its queue was dropped");
            }
        });

        ticket
    }

    /// Drops every request still waiting for its turn. The running request
    /// is cancelled only when `force` is set.
    pub fn clear(&mut self, force: bool) {
        self.queued.cancel();
        self.queued = CancellationToken::new();
        if force {
            self.running.cancel();
            self.running = CancellationToken::new();
        }
    }

    /// Waits for the next outcome.
    pub async fn next_outcome(&mut self) -> Option<Completion<T>> {
        self.receiver.recv().await
    }

    /// Next outcome if one is ready.
    pub fn try_next_outcome(&mut self) -> Option<Completion<T>> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;

    fn gated(value: u32) -> (oneshot::Sender<()>, impl Future<Output = Result<u32, FetchError>>) {
        let (open, gate) = oneshot::channel::<()>();
        let request = async move {
            let _ = gate.await;
            Ok(value)
        };
        (open, request)
    }

    #[tokio::test]
    async fn test_clear_drops_queued_but_keeps_running() {
        let mut queue = RequestQueue::managed();
        let (open_first, first) = gated(1);
        let first = queue.submit(first);
        tokio::task::yield_now().await;
        let (_open_second, second) = gated(2);
        let second = queue.submit(second);
        tokio::task::yield_now().await;

        queue.clear(false);
        let dropped = queue.next_outcome().await.unwrap();
        assert_eq!(dropped.ticket, second);
        assert!(dropped.result.unwrap_err().is_abort());

        open_first.send(()).unwrap();
        let done = queue.next_outcome().await.unwrap();
        assert_eq!(done.ticket, first);
        assert_eq!(done.result.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_forced_clear_aborts_running() {
        let mut queue = RequestQueue::managed();
        let (_open, request) = gated(1);
        let ticket = queue.submit(request);
        tokio::task::yield_now().await;

        queue.clear(true);
        let outcome = queue.next_outcome().await.unwrap();
        assert_eq!(outcome.ticket, ticket);
        assert!(outcome.result.unwrap_err().is_abort());

        let next = queue.submit(async { Ok(7) });
        let outcome = queue.next_outcome().await.unwrap();
        assert_eq!(outcome.ticket, next);
        assert_eq!(outcome.result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_unmanaged_runs_concurrently() {
        let mut queue = RequestQueue::unmanaged();
        let (open_first, first) = gated(1);
        queue.submit(first);
        let second = queue.submit(async { Ok(2) });
        let outcome = queue.next_outcome().await.unwrap();
        assert_eq!(outcome.ticket, second);
        open_first.send(()).unwrap();
        assert_eq!(queue.next_outcome().await.unwrap().result.unwrap(), 1);
    }
}
