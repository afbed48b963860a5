#![forbid(unsafe_code)]

//! The external page-fetch contract.
//!
//! A fetch is an opaque asynchronous operation: the coordinator hands the
//! fetcher a request and a completion callback, and the fetcher invokes the
//! callback whenever the result is ready — synchronously for in-memory
//! sources, or on some later turn of the event loop for remote ones. The
//! coordinator makes no cross-call ordering assumption beyond its own
//! single-flight batch sequencing.

use std::rc::Rc;

use crate::error::FetchError;

/// One page request: which page, and how many rows per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: usize,
    /// Rows per page; the implicit row range is
    /// `[page * page_size, page * page_size + page_size)`.
    pub page_size: usize,
}

/// A successful fetch: one page of rows plus the source's current total.
///
/// `data.len()` must not exceed the requested page size; the final page of
/// a finite dataset may hold fewer rows (or none) without that being an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse<T> {
    /// The rows of this page, in index order.
    pub data: Vec<T>,
    /// Best-known total item count as of this response.
    pub total: usize,
}

/// Completion callback handed to a [`PageFetcher`].
pub type FetchDone<T> = Box<dyn FnOnce(Result<PageResponse<T>, FetchError>)>;

/// An external source of pages.
///
/// Implemented over HTTP, a database, or (in tests) a scripted in-memory
/// table. Completion may be synchronous or deferred; the coordinator
/// tolerates both.
pub trait PageFetcher<T> {
    /// Fetch one page and deliver the result through `done`.
    fn fetch(&self, request: PageRequest, done: FetchDone<T>);
}

/// Closures are fetchers. This is the ergonomic entry point for simple
/// sources:
///
/// ```ignore
/// let fetcher = Rc::new(|req: PageRequest, done: FetchDone<Row>| {
///     done(Ok(PageResponse { data: rows_for(req), total: TOTAL }));
/// });
/// let source = TableSource::new(fetcher, config);
/// ```
impl<T, F> PageFetcher<T> for F
where
    F: Fn(PageRequest, FetchDone<T>),
{
    fn fetch(&self, request: PageRequest, done: FetchDone<T>) {
        self(request, done);
    }
}

/// A failure event published on the data source's failure channel: which
/// page failed, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// Page that stays unfetched.
    pub page: usize,
    /// The underlying error.
    pub error: FetchError,
}

/// Shared fetcher handle as stored by the data source.
pub type SharedFetcher<T> = Rc<dyn PageFetcher<T>>;
