#![forbid(unsafe_code)]

//! The table data source: fetch coordination and windowed publishing.
//!
//! [`TableSource`] subscribes to the viewport's rendered-range signal,
//! resolves each range into the pages still missing from the cache, fetches
//! them through the external [`PageFetcher`], splices results into the
//! [`PageStore`], and republishes the slice of the backing array matching
//! the latest range.
//!
//! # Batch semantics
//!
//! One range event resolves into one *batch* of pages, fetched strictly in
//! ascending order, at most one batch outstanding at a time. A range event
//! arriving mid-batch does not queue work: it overwrites a single
//! `pending_range` slot that is consulted only once the in-flight batch
//! settles. Responsiveness to the latest scroll position wins over
//! exhaustive completion of an outdated window.
//!
//! There is no cancellation: a fetch that completes after its range became
//! stale is still applied (the page is cached either way; only the fetch
//! cost was wasted).
//!
//! # Total changes
//!
//! The viewport's scrollable extent derives from the last range it was
//! issued, not from the total directly. So whenever a response reports a
//! different total — growth or regression — the source commands the
//! viewport to re-issue a range ending at the total's last page, and the
//! resulting range event flows back through the normal pipeline.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::TableConfig;
use crate::error::{AttachError, FetchError};
use crate::fetch::{PageFailure, PageRequest, PageResponse, SharedFetcher};
use crate::range::RenderRange;
use crate::reactive::{EventChannel, Signal, Subscription};
use crate::resolver::{page_for_index, pages_to_fetch};
use crate::store::PageStore;
use crate::viewport::VirtualViewport;

/// Mutable coordinator state, guarded by a single `RefCell`.
///
/// Never borrowed across a call into the viewport, the fetcher, or a
/// signal — those may re-enter the source synchronously.
struct SourceState<T> {
    store: PageStore<T>,
    /// Latest rendered range seen; `None` until the viewport attaches.
    range: Option<RenderRange>,
    viewport: Option<Rc<dyn VirtualViewport>>,
    /// Pages of the in-flight batch not yet dispatched.
    batch: VecDeque<usize>,
    batch_in_flight: bool,
    /// Latest range that arrived while a batch was in flight. Overwritten
    /// on every event; consulted once when the batch settles.
    pending_range: Option<RenderRange>,
    subscriptions: Vec<Subscription>,
}

struct SourceShared<T> {
    fetcher: SharedFetcher<T>,
    /// The published window: `backing[start..end]` for the latest range, or
    /// the full backing array before a viewport attaches.
    rendered: Signal<Vec<Option<T>>>,
    failures: EventChannel<PageFailure>,
    state: RefCell<SourceState<T>>,
}

/// A windowed, externally-paginated table data source.
///
/// Cloning a `TableSource` creates a new handle to the same source.
/// Dropping the last handle detaches it; an in-flight fetch completing
/// after that is discarded.
pub struct TableSource<T> {
    shared: Rc<SourceShared<T>>,
}

impl<T> Clone for TableSource<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for TableSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("TableSource")
            .field("total", &state.store.total())
            .field("range", &state.range)
            .field("fetched_pages", &state.store.fetched().len())
            .field("batch_in_flight", &state.batch_in_flight)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> TableSource<T> {
    /// Create a source over the given fetcher.
    #[must_use]
    pub fn new(fetcher: SharedFetcher<T>, config: TableConfig) -> Self {
        Self {
            shared: Rc::new(SourceShared {
                fetcher,
                rendered: Signal::new(Vec::new()),
                failures: EventChannel::new(),
                state: RefCell::new(SourceState {
                    store: PageStore::new(config.page_size()),
                    range: None,
                    viewport: None,
                    batch: VecDeque::new(),
                    batch_in_flight: false,
                    pending_range: None,
                    subscriptions: Vec::new(),
                }),
            }),
        }
    }

    /// Attach to a viewport: subscribe to its rendered-range signal, then
    /// kick an initial `{0, 1}` range so the first page loads.
    ///
    /// # Errors
    ///
    /// [`AttachError::AlreadyAttached`] if a viewport is already attached;
    /// no new subscription is established in that case.
    pub fn attach(&self, viewport: Rc<dyn VirtualViewport>) -> Result<(), AttachError> {
        let range_signal = {
            let mut state = self.shared.state.borrow_mut();
            if state.viewport.is_some() {
                return Err(AttachError::AlreadyAttached);
            }
            state.viewport = Some(Rc::clone(&viewport));
            viewport.rendered_range()
        };

        let weak = Rc::downgrade(&self.shared);
        let sub = range_signal.subscribe(move |range| {
            if let (Some(shared), Some(range)) = (weak.upgrade(), *range) {
                SourceShared::on_range(&shared, range);
            }
        });
        self.shared.state.borrow_mut().subscriptions.push(sub);

        viewport.set_rendered_range(RenderRange::new(0, 1));
        Ok(())
    }

    /// Drop all viewport subscriptions. Idempotent; an in-flight fetch is
    /// not torn down, its result is still applied when it completes.
    pub fn detach(&self) {
        let mut state = self.shared.state.borrow_mut();
        state.subscriptions.clear();
        state.viewport = None;
    }

    /// Handle to the rendered-data signal for the rendering surface.
    ///
    /// Subscribe with [`Signal::subscribe_now`] to receive the current
    /// window immediately. Before a viewport attaches the signal carries
    /// the full backing array unsliced (degraded mode for non-virtualized
    /// consumers).
    #[must_use]
    pub fn connect(&self) -> Signal<Vec<Option<T>>> {
        self.shared.rendered.clone()
    }

    /// Tear down viewport subscriptions; the rendering-surface counterpart
    /// of [`TableSource::detach`].
    pub fn disconnect(&self) {
        self.detach();
    }

    /// Handle to the per-page fetch-failure channel.
    #[must_use]
    pub fn fetch_failures(&self) -> EventChannel<PageFailure> {
        self.shared.failures.clone()
    }

    /// Best-known total item count.
    #[must_use]
    pub fn total(&self) -> usize {
        self.shared.state.borrow().store.total()
    }

    /// Whether a viewport is currently attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.shared.state.borrow().viewport.is_some()
    }

    /// Ascending list of pages already applied (test and debug aid).
    #[must_use]
    pub fn fetched_pages(&self) -> Vec<usize> {
        self.shared
            .state
            .borrow()
            .store
            .fetched()
            .iter()
            .copied()
            .collect()
    }
}

impl<T: Clone + PartialEq + 'static> SourceShared<T> {
    /// A rendered-range event from the viewport.
    fn on_range(shared: &Rc<Self>, range: RenderRange) {
        let in_flight = {
            let mut state = shared.state.borrow_mut();
            state.range = Some(range);
            if state.batch_in_flight {
                state.pending_range = Some(range);
            }
            state.batch_in_flight
        };
        shared.publish();
        if !in_flight {
            Self::start_batch(shared, range);
        }
    }

    /// Resolve a range into a batch and start dispatching it.
    fn start_batch(shared: &Rc<Self>, range: RenderRange) {
        {
            let mut state = shared.state.borrow_mut();
            let pages = pages_to_fetch(
                range,
                state.store.total(),
                state.store.page_size(),
                state.store.fetched(),
            );
            if pages.is_empty() {
                return;
            }
            debug!(?range, ?pages, "starting fetch batch");
            state.batch = pages.into();
            state.batch_in_flight = true;
        }
        Self::dispatch_next(shared);
    }

    /// Dispatch the next page of the current batch, or settle the batch.
    fn dispatch_next(shared: &Rc<Self>) {
        let request = {
            let mut state = shared.state.borrow_mut();
            loop {
                match state.batch.pop_front() {
                    // Landed while queued (e.g. re-applied range): skip.
                    Some(page) if state.store.has(page) => continue,
                    Some(page) => {
                        break Some(PageRequest {
                            page,
                            page_size: state.store.page_size().get(),
                        });
                    }
                    None => break None,
                }
            }
        };

        match request {
            Some(request) => {
                let page = request.page;
                let weak = Rc::downgrade(shared);
                shared.fetcher.fetch(
                    request,
                    Box::new(move |result| {
                        if let Some(shared) = weak.upgrade() {
                            SourceShared::on_fetch_complete(&shared, page, result);
                        }
                    }),
                );
            }
            None => {
                let pending = {
                    let mut state = shared.state.borrow_mut();
                    state.batch_in_flight = false;
                    state.pending_range.take()
                };
                if let Some(range) = pending {
                    Self::start_batch(shared, range);
                }
            }
        }
    }

    /// One page of the current batch completed (either way), synchronously
    /// or on a later turn.
    fn on_fetch_complete(
        shared: &Rc<Self>,
        page: usize,
        result: Result<PageResponse<T>, FetchError>,
    ) {
        let page_size = shared.state.borrow().store.page_size();
        let result = match result {
            Ok(response) if response.data.len() > page_size.get() => Err(FetchError::Oversized {
                page,
                len: response.data.len(),
                page_size: page_size.get(),
            }),
            other => other,
        };

        match result {
            Ok(PageResponse { data, total }) => {
                let viewport_to_nudge = {
                    let mut state = shared.state.borrow_mut();
                    if state.store.set_total(total) {
                        state.viewport.clone()
                    } else {
                        None
                    }
                };
                if let Some(viewport) = viewport_to_nudge {
                    let end = page_for_index(total, page_size);
                    debug!(total, end, "total changed, re-issuing rendered range");
                    viewport.set_rendered_range(RenderRange::new(0, end));
                }
                shared.state.borrow_mut().store.apply(page, data);
                debug!(page, "page applied");
                shared.publish();
            }
            Err(error) => {
                warn!(page, %error, "page fetch failed");
                shared.failures.emit(&PageFailure { page, error });
            }
        }

        Self::dispatch_next(shared);
    }

    /// Recompute the published window from the latest store contents and
    /// the latest range.
    fn publish(&self) {
        let window = {
            let state = self.state.borrow();
            match state.range {
                Some(range) => state.store.window(range),
                None => state.store.snapshot(),
            }
        };
        self.rendered.set(window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchDone;
    use std::cell::Cell;
    use std::num::{NonZeroU32, NonZeroUsize};

    fn config(page_size: usize) -> TableConfig {
        TableConfig::new(NonZeroU32::new(20).unwrap())
            .with_page_size(NonZeroUsize::new(page_size).unwrap())
    }

    /// Minimal in-test viewport; the full scripted one lives in the
    /// harness crate.
    struct TinyViewport {
        range: Signal<Option<RenderRange>>,
        index: Signal<usize>,
    }

    impl TinyViewport {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                range: Signal::new(None),
                index: Signal::new(0),
            })
        }
    }

    impl VirtualViewport for TinyViewport {
        fn rendered_range(&self) -> Signal<Option<RenderRange>> {
            self.range.clone()
        }
        fn scrolled_index(&self) -> Signal<usize> {
            self.index.clone()
        }
        fn offset_to_rendered_content_start(&self) -> i64 {
            0
        }
        fn set_rendered_range(&self, range: RenderRange) {
            self.range.set(Some(range));
        }
    }

    fn letters(total: usize) -> Vec<String> {
        (0..total).map(|i| format!("row{i}")).collect()
    }

    fn immediate_fetcher(rows: Vec<String>) -> SharedFetcher<String> {
        Rc::new(move |request: PageRequest, done: FetchDone<String>| {
            let start = request.page * request.page_size;
            let end = (start + request.page_size).min(rows.len());
            let data = if start < rows.len() {
                rows[start..end].to_vec()
            } else {
                Vec::new()
            };
            done(Ok(PageResponse {
                data,
                total: rows.len(),
            }));
        })
    }

    #[test]
    fn attach_kicks_first_page_and_expands_to_total() {
        let source = TableSource::new(immediate_fetcher(letters(10)), config(3));
        let viewport = TinyViewport::new();
        source.attach(viewport.clone()).unwrap();

        // First response reports total 10 -> range re-issued to {0, 3},
        // which pulls in pages 1 and 2 as well.
        assert_eq!(source.total(), 10);
        assert_eq!(source.fetched_pages(), [0, 1, 2]);
        assert_eq!(viewport.range.get(), Some(RenderRange::new(0, 3)));

        let window = source.connect().get();
        assert_eq!(
            window,
            vec![
                Some("row0".to_string()),
                Some("row1".to_string()),
                Some("row2".to_string())
            ]
        );
    }

    #[test]
    fn double_attach_is_rejected_without_new_subscription() {
        let source = TableSource::new(immediate_fetcher(letters(4)), config(3));
        let viewport = TinyViewport::new();
        source.attach(viewport.clone()).unwrap();
        let subscribers = viewport.range.subscriber_count();

        let other = TinyViewport::new();
        assert_eq!(
            source.attach(other.clone()),
            Err(AttachError::AlreadyAttached)
        );
        assert_eq!(other.range.subscriber_count(), 0);
        assert_eq!(viewport.range.subscriber_count(), subscribers);
    }

    #[test]
    fn detach_is_idempotent_and_stops_range_handling() {
        let source = TableSource::new(immediate_fetcher(letters(10)), config(3));
        let viewport = TinyViewport::new();
        source.attach(viewport.clone()).unwrap();

        source.detach();
        source.detach();
        assert!(!source.is_attached());

        let fetched_before = source.fetched_pages();
        viewport.set_rendered_range(RenderRange::new(7, 9));
        assert_eq!(source.fetched_pages(), fetched_before);
    }

    #[test]
    fn degraded_mode_publishes_full_backing_before_attach() {
        let source = TableSource::new(immediate_fetcher(letters(4)), config(3));
        let seen = Rc::new(Cell::new(0usize));
        let seen_clone = Rc::clone(&seen);
        let _sub = source
            .connect()
            .subscribe_now(move |window| seen_clone.set(window.len()));
        // Nothing fetched yet, full (empty) backing array republished.
        assert_eq!(seen.get(), 0);
    }
}
