#![forbid(unsafe_code)]

//! Strongly-typed configuration for the pagination pipeline.
//!
//! Both knobs are non-zero by construction, so there is no runtime
//! "was it configured?" check anywhere in the crate: a [`TableConfig`]
//! cannot exist in an incomplete state.

use std::num::{NonZeroU32, NonZeroUsize};

/// Default page size when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Validated configuration shared by the data source and the sticky-header
/// synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    page_size: NonZeroUsize,
    item_size: NonZeroU32,
}

impl TableConfig {
    /// Create a configuration with the given row height in pixels and the
    /// default page size of [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub fn new(item_size: NonZeroU32) -> Self {
        Self {
            // DEFAULT_PAGE_SIZE is a non-zero constant.
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE)
                .unwrap_or(NonZeroUsize::MIN),
            item_size,
        }
    }

    /// Set the page size (unit of fetch and cache granularity).
    ///
    /// The page size must exceed the viewport's overscan window; if it does
    /// not, the rendered range never leaves page 0's prefetch reach and only
    /// the first page is ever loaded. That is a misconfiguration hazard this
    /// crate documents rather than silently fixes.
    #[must_use]
    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Rows per page.
    #[must_use]
    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Pixel height of one row; drives the sticky-header offset math.
    #[must_use]
    pub fn item_size(&self) -> NonZeroU32 {
        self.item_size
    }
}
