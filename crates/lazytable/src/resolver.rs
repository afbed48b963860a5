#![forbid(unsafe_code)]

//! Range-to-pages resolution.
//!
//! Pure math: given the rendered range, the best-known total, the page
//! size, and the set of already-fetched pages, produce the ascending list
//! of pages the coordinator still needs to fetch.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use crate::range::RenderRange;

/// The page holding `index`.
#[must_use]
pub fn page_for_index(index: usize, page_size: NonZeroUsize) -> usize {
    index / page_size.get()
}

/// Pages that must be fetched to cover `range`, ascending, excluding pages
/// already in `fetched`.
///
/// The upper bound deliberately overscans by one full page past the visible
/// end, so the fetch for the *next* page is already in flight before the
/// user scrolls into it. The bound is also capped at the last page implied
/// by `total` — with one bootstrap exception: before the first fetch,
/// `total` is 0 and the cap is page 0, which is exactly the page that must
/// be requested to learn the real total.
#[must_use]
pub fn pages_to_fetch(
    range: RenderRange,
    total: usize,
    page_size: NonZeroUsize,
    fetched: &BTreeSet<usize>,
) -> Vec<usize> {
    let first = page_for_index(range.start, page_size);
    let last = page_for_index(range.end.saturating_add(page_size.get()), page_size);
    let max = page_for_index(total, page_size);
    (first..=last.min(max))
        .filter(|page| !fetched.contains(page))
        .collect()
}
