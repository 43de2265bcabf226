//! Cooperative pager
//!
//! Consumers call [`Pager::request_next`] as often as they like; each call
//! returns a [`NextItem`] future. Requests that race ahead of the data are
//! queued in FIFO order and resolved as pages arrive, so items always come
//! out in sequence no matter how the fetches interleave with the
//! consumers.

use super::types::{Page, PageFetcher, PageRequest, PagerOptions, PagerPhase};
use crate::error::{Error, Result};
use crate::value::Value;
use futures::Stream;
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, warn};

type Delivery = Result<Option<Value>>;
type Waiter = oneshot::Sender<Delivery>;

/// The page slot
#[derive(Debug)]
enum Active {
    Nothing,
    InFlight,
    Resolved(VecDeque<Value>),
}

#[derive(Debug)]
struct PagerState {
    /// Items handed out so far
    mark: usize,
    active: Active,
    waiting: VecDeque<Waiter>,
    stop: bool,
    next_page: Option<String>,
}

impl PagerState {
    fn phase(&self) -> PagerPhase {
        match &self.active {
            Active::Nothing => PagerPhase::Empty,
            Active::InFlight => PagerPhase::Fetching,
            Active::Resolved(items) if !items.is_empty() => PagerPhase::HasData,
            Active::Resolved(_) if self.stop => PagerPhase::Exhausted,
            Active::Resolved(_) => PagerPhase::Empty,
        }
    }

    /// Forget consumers whose `NextItem` was dropped
    fn prune(&mut self) {
        self.waiting.retain(|waiter| !waiter.is_closed());
    }

    fn enqueue(&mut self, limit: usize) -> Result<oneshot::Receiver<Delivery>> {
        self.prune();
        if self.waiting.len() >= limit {
            return Err(Error::Overflow { limit });
        }
        let (tx, rx) = oneshot::channel();
        self.waiting.push_back(tx);
        Ok(rx)
    }

    /// Give an item to the oldest live consumer, or hand it back if none
    fn hand_off(&mut self, mut item: Value) -> Option<Value> {
        while let Some(waiter) = self.waiting.pop_front() {
            match waiter.send(Ok(Some(item))) {
                Ok(()) => {
                    self.mark += 1;
                    return None;
                }
                Err(Ok(Some(returned))) => item = returned,
                Err(_) => return None,
            }
        }
        Some(item)
    }

    fn next_request(&self, first: &PageRequest) -> PageRequest {
        match &self.next_page {
            Some(cursor) => PageRequest::cursor(cursor.clone()),
            None => first.clone(),
        }
    }
}

struct Shared {
    fetcher: PageFetcher,
    first: PageRequest,
    max_overflow: usize,
    state: Mutex<PagerState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start fetching the next page; at most one fetch runs at a time
    fn spawn_fetch(self: &Arc<Self>, state: &mut PagerState) {
        let request = state.next_request(&self.first);
        debug!(
            "Fetching page: path={:?} urn={:?}",
            request.path, request.urn
        );
        state.active = Active::InFlight;

        let fetch = (self.fetcher)(request);
        let guard = FetchGuard {
            shared: Some(Arc::clone(self)),
        };
        tokio::spawn(async move {
            let result = fetch.await;
            guard.finish(result);
        });
    }

    fn complete(self: &Arc<Self>, result: Result<Page>) {
        let mut guard = self.lock();
        let state = &mut *guard;

        let page = match result {
            Ok(page) => page,
            Err(error) => {
                warn!("Page fetch failed: {}", error);
                state.active = Active::Nothing;
                fail_waiters(state, error);
                return;
            }
        };

        debug!(
            "Page arrived: {} items, next={:?}, {} waiting",
            page.items.len(),
            page.next,
            state.waiting.len()
        );
        state.next_page = page.next;
        state.stop = state.next_page.is_none();

        let mut items = VecDeque::from(page.items);
        while let Some(item) = items.pop_front() {
            if let Some(returned) = state.hand_off(item) {
                items.push_front(returned);
                break;
            }
        }
        state.active = Active::Resolved(items);

        state.prune();
        if state.waiting.is_empty() {
            return;
        }
        if state.stop {
            for waiter in state.waiting.drain(..) {
                let _ = waiter.send(Ok(None));
            }
        } else {
            self.spawn_fetch(state);
        }
    }
}

/// Completes the fetch even when its task panics or is dropped
struct FetchGuard {
    shared: Option<Arc<Shared>>,
}

impl FetchGuard {
    fn finish(mut self, result: Result<Page>) {
        if let Some(shared) = self.shared.take() {
            shared.complete(result);
        }
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.complete(Err(Error::PageFailed {
                message: "page fetch ended without a result".to_string(),
            }));
        }
    }
}

/// The first live consumer gets the fetch error, the rest `PageFailed`
fn fail_waiters(state: &mut PagerState, error: Error) {
    let message = error.to_string();
    let mut original = Some(error);
    while let Some(waiter) = state.waiting.pop_front() {
        match original.take() {
            Some(error) => {
                if let Err(Err(error)) = waiter.send(Err(error)) {
                    original = Some(error);
                }
            }
            None => {
                let _ = waiter.send(Err(Error::PageFailed {
                    message: message.clone(),
                }));
            }
        }
    }
}

/// Lazily fetched sequence of items for the cooperative runtime
///
/// Page fetches run as spawned tasks, so the pager must be driven from
/// inside a tokio runtime.
pub struct Pager {
    shared: Arc<Shared>,
}

impl Pager {
    pub fn new(fetcher: PageFetcher, mut first: PageRequest, options: PagerOptions) -> Self {
        options.apply(&mut first);
        Self {
            shared: Arc::new(Shared {
                fetcher,
                first,
                max_overflow: options.max_overflow,
                state: Mutex::new(PagerState {
                    mark: 0,
                    active: Active::Nothing,
                    waiting: VecDeque::new(),
                    stop: false,
                    next_page: None,
                }),
            }),
        }
    }

    /// Ask for the next item
    ///
    /// Returns immediately. The future resolves to `Ok(None)` once the
    /// sequence is exhausted. Fails with `Error::Overflow` if the request
    /// would have to queue behind `max_overflow` others.
    pub fn request_next(&self) -> Result<NextItem> {
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        match &mut state.active {
            Active::Resolved(items) => {
                if let Some(item) = items.pop_front() {
                    state.mark += 1;
                    return Ok(NextItem::ready(Ok(Some(item))));
                }
                if state.stop {
                    return Ok(NextItem::ready(Ok(None)));
                }
                let rx = state.enqueue(self.shared.max_overflow)?;
                self.shared.spawn_fetch(state);
                Ok(NextItem::pending(rx))
            }
            Active::InFlight => {
                let rx = state.enqueue(self.shared.max_overflow)?;
                Ok(NextItem::pending(rx))
            }
            Active::Nothing => {
                let rx = state.enqueue(self.shared.max_overflow)?;
                self.shared.spawn_fetch(state);
                Ok(NextItem::pending(rx))
            }
        }
    }

    /// Wait for the next item
    pub async fn next(&self) -> Result<Option<Value>> {
        self.request_next()?.await
    }

    /// Consume the pager as a stream of items
    ///
    /// Fetch errors are yielded in place; polling again retries the page.
    pub fn into_stream(self) -> impl Stream<Item = Result<Value>> {
        futures::stream::unfold(self, |pager| async move {
            match pager.next().await {
                Ok(Some(item)) => Some((Ok(item), pager)),
                Ok(None) => None,
                Err(e) => Some((Err(e), pager)),
            }
        })
    }

    pub fn phase(&self) -> PagerPhase {
        self.shared.lock().phase()
    }

    /// Number of items handed out so far
    pub fn mark(&self) -> usize {
        self.shared.lock().mark
    }

    /// Number of live consumers waiting for data
    pub fn waiting(&self) -> usize {
        let mut state = self.shared.lock();
        state.prune();
        state.waiting.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase() == PagerPhase::Exhausted
    }

    /// Cursor of the page that will be fetched next
    pub fn next_page(&self) -> Option<String> {
        self.shared.lock().next_page.clone()
    }
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Pager")
            .field("phase", &state.phase())
            .field("mark", &state.mark)
            .field("waiting", &state.waiting.len())
            .field("next_page", &state.next_page)
            .finish_non_exhaustive()
    }
}

pin_project! {
    /// An item requested from a [`Pager`]
    ///
    /// Dropping it before it resolves withdraws the request.
    #[derive(Debug)]
    #[must_use = "futures do nothing unless polled"]
    pub struct NextItem {
        ready: Option<Delivery>,
        #[pin]
        receiver: Option<oneshot::Receiver<Delivery>>,
    }
}

impl NextItem {
    fn ready(delivery: Delivery) -> Self {
        Self {
            ready: Some(delivery),
            receiver: None,
        }
    }

    fn pending(receiver: oneshot::Receiver<Delivery>) -> Self {
        Self {
            ready: None,
            receiver: Some(receiver),
        }
    }

    /// Whether the item was available without waiting for a fetch
    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }
}

impl Future for NextItem {
    type Output = Delivery;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Delivery> {
        let this = self.project();
        if let Some(delivery) = this.ready.take() {
            return Poll::Ready(delivery);
        }
        match this.receiver.as_pin_mut() {
            Some(receiver) => receiver
                .poll(cx)
                .map(|delivery| delivery.unwrap_or(Err(Error::PagerClosed))),
            None => Poll::Ready(Err(Error::PagerClosed)),
        }
    }
}
