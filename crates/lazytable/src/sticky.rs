#![forbid(unsafe_code)]

//! Sticky-header offset synchronization.
//!
//! A virtualized viewport translates its rendered content as the user
//! scrolls, so a header row that should stay pinned needs a compensating
//! pixel offset. Two independently-timed signals both describe that offset:
//!
//! - **range-derived**: `-(range.start * item_size)`, fresh on every
//!   rendered-range change;
//! - **scroll-derived**: `-offset_to_rendered_content_start()`, fresh on
//!   every scroll-index change, with adjacent duplicates suppressed.
//!
//! Both feed one synchronous apply path with first-arrival-wins semantics:
//! whichever signal fires, its sample overwrites the header position
//! immediately. No smoothing, no interpolation, no timer state.
//!
//! Construction is the validation: a [`StickyHeaderSync`] cannot exist
//! without an item size (it lives in [`TableConfig`]), and
//! [`StickyHeaderSync::attach`] takes the data source and the viewport, so
//! a half-configured synchronizer is unrepresentable.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::config::TableConfig;
use crate::error::AttachError;
use crate::range::RenderRange;
use crate::reactive::Subscription;
use crate::source::TableSource;
use crate::viewport::VirtualViewport;

/// A header cell's repaint hook: receives the pixel offset to apply.
type HeaderSink = Rc<dyn Fn(i64)>;

struct StickyState {
    sinks: Vec<HeaderSink>,
    /// Last scroll-derived sample; used for adjacent-duplicate suppression
    /// on that path only (the range path repositions on every range event).
    last_scroll_offset: Option<i64>,
    /// Last offset applied to the sinks, whichever path produced it.
    current_offset: Option<i64>,
    subscriptions: Vec<Subscription>,
    attached: bool,
}

/// Keeps registered header cells pinned by merging the two offset signals
/// into one deduplicated repaint stream.
pub struct StickyHeaderSync {
    item_size: i64,
    state: Rc<RefCell<StickyState>>,
}

impl std::fmt::Debug for StickyHeaderSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("StickyHeaderSync")
            .field("item_size", &self.item_size)
            .field("current_offset", &state.current_offset)
            .field("sinks", &state.sinks.len())
            .field("attached", &state.attached)
            .finish()
    }
}

impl StickyHeaderSync {
    /// Create a synchronizer from a validated configuration.
    #[must_use]
    pub fn new(config: TableConfig) -> Self {
        Self {
            item_size: i64::from(config.item_size().get()),
            state: Rc::new(RefCell::new(StickyState {
                sinks: Vec::new(),
                last_scroll_offset: None,
                current_offset: None,
                subscriptions: Vec::new(),
                attached: false,
            })),
        }
    }

    /// Register a header cell. The sink is invoked synchronously with every
    /// applied offset sample, including samples that arrive before other
    /// cells register.
    pub fn register_header(&self, sink: impl Fn(i64) + 'static) {
        self.state.borrow_mut().sinks.push(Rc::new(sink));
    }

    /// Attach the data source to the viewport and wire both offset signals.
    ///
    /// # Errors
    ///
    /// [`AttachError::AlreadyAttached`] if either the source or this
    /// synchronizer is already attached; no subscription is established in
    /// that case.
    pub fn attach<T: Clone + PartialEq + 'static>(
        &self,
        source: &TableSource<T>,
        viewport: Rc<dyn VirtualViewport>,
    ) -> Result<(), AttachError> {
        if self.state.borrow().attached {
            return Err(AttachError::AlreadyAttached);
        }
        source.attach(Rc::clone(&viewport))?;

        let item_size = self.item_size;
        let weak = Rc::downgrade(&self.state);
        let range_sub = viewport.rendered_range().subscribe(move |range| {
            if let (Some(state), Some(range)) = (weak.upgrade(), *range) {
                Self::apply_range_sample(&state, range, item_size);
            }
        });

        let weak = Rc::downgrade(&self.state);
        let viewport_for_query = Rc::clone(&viewport);
        let scroll_sub = viewport.scrolled_index().subscribe(move |_index| {
            if let Some(state) = weak.upgrade() {
                let offset = -viewport_for_query.offset_to_rendered_content_start();
                Self::apply_scroll_sample(&state, offset);
            }
        });

        let mut state = self.state.borrow_mut();
        state.subscriptions.push(range_sub);
        state.subscriptions.push(scroll_sub);
        state.attached = true;
        Ok(())
    }

    /// Drop both signal subscriptions. Idempotent. Registered sinks and the
    /// last applied offset survive a detach.
    pub fn detach(&self) {
        let mut state = self.state.borrow_mut();
        state.subscriptions.clear();
        state.attached = false;
    }

    /// The last offset applied to the headers, if any sample arrived yet.
    #[must_use]
    pub fn current_offset(&self) -> Option<i64> {
        self.state.borrow().current_offset
    }

    fn apply_range_sample(state: &Rc<RefCell<StickyState>>, range: RenderRange, item_size: i64) {
        // Range starts are viewport-bounded; i64 cannot realistically
        // overflow here, but saturate rather than wrap if it ever does.
        let offset = i64::try_from(range.start)
            .unwrap_or(i64::MAX)
            .saturating_mul(item_size)
            .saturating_neg();
        Self::apply(state, offset);
    }

    fn apply_scroll_sample(state: &Rc<RefCell<StickyState>>, offset: i64) {
        {
            let mut state = state.borrow_mut();
            if state.last_scroll_offset == Some(offset) {
                return;
            }
            state.last_scroll_offset = Some(offset);
        }
        Self::apply(state, offset);
    }

    /// Reposition every registered header, synchronously.
    fn apply(state: &Rc<RefCell<StickyState>>, offset: i64) {
        let sinks: Vec<HeaderSink> = {
            let mut state = state.borrow_mut();
            state.current_offset = Some(offset);
            state.sinks.clone()
        };
        trace!(offset, "applying sticky header offset");
        for sink in &sinks {
            sink(offset);
        }
    }
}
