#![forbid(unsafe_code)]

//! Flat page cache: backing array, fetched-page set, best-known total.
//!
//! # Invariants
//!
//! 1. The fetched set only ever grows; pages are never evicted. The whole
//!    dataset is assumed to fit in memory as a flat array.
//! 2. A page is in the fetched set only after its rows landed in the
//!    backing array — [`PageStore::apply`] does both in one synchronous
//!    step, so the two are never observable independently.
//! 3. `total` is replaced wholesale, never merged; a regression to a
//!    smaller total is accepted as the new truth and the stale tail past it
//!    simply stays in the backing array, unreachable.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use crate::range::RenderRange;

/// Flat backing store for fetched pages.
///
/// Entries are `Option<T>`: `None` marks a hole — an index whose page has
/// not been fetched (or the padded tail of a short final page).
#[derive(Debug, Clone)]
pub struct PageStore<T> {
    backing: Vec<Option<T>>,
    fetched: BTreeSet<usize>,
    total: usize,
    page_size: NonZeroUsize,
}

impl<T: Clone> PageStore<T> {
    /// Create an empty store. `total` starts at 0 and stays there until the
    /// first fetch response reports the real count.
    #[must_use]
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            backing: Vec::new(),
            fetched: BTreeSet::new(),
            total: 0,
            page_size,
        }
    }

    /// Rows per page.
    #[must_use]
    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Best-known total item count.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether `page` has already been applied.
    #[must_use]
    pub fn has(&self, page: usize) -> bool {
        self.fetched.contains(&page)
    }

    /// The set of applied pages, ascending.
    #[must_use]
    pub fn fetched(&self) -> &BTreeSet<usize> {
        &self.fetched
    }

    /// Length of the backing array (grows as pages land; unrelated to
    /// `total`).
    #[must_use]
    pub fn backing_len(&self) -> usize {
        self.backing.len()
    }

    /// Replace the total. Returns whether the value changed.
    pub fn set_total(&mut self, total: usize) -> bool {
        if self.total == total {
            return false;
        }
        self.total = total;
        true
    }

    /// Splice one page of rows into the backing array at
    /// `page * page_size`, overwriting exactly `page_size` slots, and mark
    /// the page fetched.
    ///
    /// A short final page pads the remainder of its slots with holes; those
    /// indices exceed `total` and are never rendered. Rows beyond the page
    /// size are a fetch-contract violation the coordinator rejects before
    /// calling this.
    pub fn apply(&mut self, page: usize, data: Vec<T>) {
        let page_size = self.page_size.get();
        debug_assert!(data.len() <= page_size, "oversized page reached apply");
        let start = page * page_size;
        let end = start + page_size;
        if self.backing.len() < end {
            self.backing.resize(end, None);
        }
        let mut rows = data.into_iter();
        for slot in &mut self.backing[start..end] {
            *slot = rows.next();
        }
        self.fetched.insert(page);
    }

    /// Clone of `backing[start..end]`, clamped to the backing length.
    /// Indices past the backing are simply absent (slice semantics), which
    /// matches a consumer that has scrolled ahead of every applied page.
    #[must_use]
    pub fn window(&self, range: RenderRange) -> Vec<Option<T>> {
        let len = self.backing.len();
        let start = range.start.min(len);
        let end = range.end.min(len);
        self.backing[start..end].to_vec()
    }

    /// Clone of the whole backing array; the degraded-mode publish used
    /// when no viewport has attached.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Option<T>> {
        self.backing.clone()
    }
}
