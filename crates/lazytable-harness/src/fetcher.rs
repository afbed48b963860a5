#![forbid(unsafe_code)]

//! Scripted in-memory page fetcher.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use lazytable::{FetchDone, FetchError, PageFetcher, PageRequest, PageResponse};

/// How the fetcher delivers results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Invoke the completion callback synchronously inside `fetch`.
    Immediate,
    /// Park the completion; the test releases it with
    /// [`ScriptedFetcher::complete_next`].
    Deferred,
}

/// An in-memory [`PageFetcher`] backed by a row vector.
///
/// The reported total is always the current row count, so swapping the
/// rows with [`ScriptedFetcher::set_rows`] mid-test simulates a dataset
/// that grew or shrank behind the caller's back. Individual pages can be
/// scripted to fail ([`ScriptedFetcher::fail_page`]) or to violate the
/// page-size contract ([`ScriptedFetcher::oversize_page`]).
pub struct ScriptedFetcher<T> {
    rows: RefCell<Vec<T>>,
    mode: Mode,
    fail_pages: RefCell<BTreeSet<usize>>,
    oversize_pages: RefCell<BTreeSet<usize>>,
    /// Parked requests, FIFO, deferred mode only.
    pending: RefCell<VecDeque<(PageRequest, FetchDone<T>)>>,
    /// Every page index requested, in dispatch order.
    calls: RefCell<Vec<usize>>,
}

impl<T: Clone + 'static> ScriptedFetcher<T> {
    /// Immediate-completion fetcher over `rows`.
    #[must_use]
    pub fn immediate(rows: Vec<T>) -> Rc<Self> {
        Rc::new(Self::with_mode(rows, Mode::Immediate))
    }

    /// Deferred-completion fetcher over `rows`; nothing completes until
    /// the test calls [`ScriptedFetcher::complete_next`].
    #[must_use]
    pub fn deferred(rows: Vec<T>) -> Rc<Self> {
        Rc::new(Self::with_mode(rows, Mode::Deferred))
    }

    fn with_mode(rows: Vec<T>, mode: Mode) -> Self {
        Self {
            rows: RefCell::new(rows),
            mode,
            fail_pages: RefCell::new(BTreeSet::new()),
            oversize_pages: RefCell::new(BTreeSet::new()),
            pending: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Replace the backing rows (and thereby the reported total).
    pub fn set_rows(&self, rows: Vec<T>) {
        *self.rows.borrow_mut() = rows;
    }

    /// Script `page` to fail with [`FetchError::Rejected`] until cleared.
    pub fn fail_page(&self, page: usize) {
        self.fail_pages.borrow_mut().insert(page);
    }

    /// Stop failing `page`.
    pub fn clear_failure(&self, page: usize) {
        self.fail_pages.borrow_mut().remove(&page);
    }

    /// Script `page` to return one row more than the page size allows.
    pub fn oversize_page(&self, page: usize) {
        self.oversize_pages.borrow_mut().insert(page);
    }

    /// Page indices requested so far, in dispatch order.
    #[must_use]
    pub fn calls(&self) -> Vec<usize> {
        self.calls.borrow().clone()
    }

    /// Number of parked requests (deferred mode).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Release the oldest parked request, resolving it against the
    /// *current* script (rows and failure set are read at completion
    /// time, not at dispatch time).
    ///
    /// # Panics
    ///
    /// Panics if nothing is parked; a test calling this blind has already
    /// lost track of the pipeline.
    pub fn complete_next(&self) {
        let (request, done) = self
            .pending
            .borrow_mut()
            .pop_front()
            .expect("complete_next called with no parked request");
        done(self.response_for(request));
    }

    fn response_for(&self, request: PageRequest) -> Result<PageResponse<T>, FetchError> {
        if self.fail_pages.borrow().contains(&request.page) {
            return Err(FetchError::Rejected(format!(
                "scripted failure for page {}",
                request.page
            )));
        }
        let rows = self.rows.borrow();
        let start = request.page * request.page_size;
        let mut data = if start < rows.len() {
            let end = (start + request.page_size).min(rows.len());
            rows[start..end].to_vec()
        } else {
            Vec::new()
        };
        if self.oversize_pages.borrow().contains(&request.page) {
            // One row too many; first row repeated as filler.
            while data.len() <= request.page_size {
                match rows.first() {
                    Some(row) => data.push(row.clone()),
                    None => break,
                }
            }
        }
        Ok(PageResponse {
            data,
            total: rows.len(),
        })
    }
}

impl<T: Clone + 'static> PageFetcher<T> for ScriptedFetcher<T> {
    fn fetch(&self, request: PageRequest, done: FetchDone<T>) {
        self.calls.borrow_mut().push(request.page);
        match self.mode {
            Mode::Immediate => done(self.response_for(request)),
            Mode::Deferred => self.pending.borrow_mut().push_back((request, done)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn request(page: usize) -> PageRequest {
        PageRequest { page, page_size: 3 }
    }

    #[test]
    fn immediate_mode_slices_rows() {
        let fetcher = ScriptedFetcher::immediate(vec![1, 2, 3, 4]);
        let got = Rc::new(Cell::new(None));
        let got_clone = Rc::clone(&got);
        fetcher.fetch(
            request(1),
            Box::new(move |result| got_clone.set(Some(result))),
        );
        assert_eq!(
            got.take().unwrap(),
            Ok(PageResponse {
                data: vec![4],
                total: 4
            })
        );
        assert_eq!(fetcher.calls(), [1]);
    }

    #[test]
    fn past_the_end_page_is_empty_not_an_error() {
        let fetcher = ScriptedFetcher::immediate(vec![1, 2]);
        let got = Rc::new(Cell::new(None));
        let got_clone = Rc::clone(&got);
        fetcher.fetch(
            request(5),
            Box::new(move |result| got_clone.set(Some(result))),
        );
        assert_eq!(
            got.take().unwrap(),
            Ok(PageResponse {
                data: vec![],
                total: 2
            })
        );
    }

    #[test]
    fn deferred_mode_parks_until_released() {
        let fetcher = ScriptedFetcher::deferred(vec![1, 2, 3]);
        let got = Rc::new(Cell::new(None));
        let got_clone = Rc::clone(&got);
        fetcher.fetch(
            request(0),
            Box::new(move |result| got_clone.set(Some(result))),
        );
        assert_eq!(fetcher.pending_count(), 1);

        // The script is consulted at completion time.
        fetcher.fail_page(0);
        fetcher.complete_next();
        assert!(matches!(got.take(), Some(Err(FetchError::Rejected(_)))));
        assert_eq!(fetcher.pending_count(), 0);
    }

    #[test]
    fn oversize_script_violates_page_size() {
        let fetcher = ScriptedFetcher::immediate(vec![1, 2, 3, 4]);
        fetcher.oversize_page(0);
        let got = Rc::new(Cell::new(None));
        let got_clone = Rc::clone(&got);
        fetcher.fetch(
            request(0),
            Box::new(move |result| got_clone.set(Some(result))),
        );
        let response = got.take().unwrap().unwrap();
        assert!(response.data.len() > 3);
    }
}
