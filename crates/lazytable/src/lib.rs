#![forbid(unsafe_code)]

//! lazytable — windowed pagination cache for virtual-scrolling tables.
//!
//! A virtual-scrolling viewport renders only a window of a large,
//! externally-paginated dataset. This crate keeps three moving quantities
//! consistent under asynchronous, possibly-overlapping scroll events:
//!
//! - which contiguous index range the viewport currently needs rendered,
//! - which backing pages have already been fetched and cached,
//! - the true total item count, unknown until the first fetch returns and
//!   free to retroactively shrink or grow the scrollable range.
//!
//! # Pipeline
//!
//! ```text
//! viewport range events -> resolver -> fetch coordinator -> page store
//!                                                             |
//!                rendering surface  <-  windowed publisher  <-+
//!
//! viewport range/scroll events -> sticky offset sync -> header cells
//! ```
//!
//! [`TableSource`] is the coordinator and publisher; [`StickyHeaderSync`]
//! keeps pinned header rows aligned with the rendered window. Both consume
//! a [`VirtualViewport`] and are driven entirely by its signals — the crate
//! is single-threaded, cooperative, and lock-free.
//!
//! # Example
//!
//! ```ignore
//! use std::num::NonZeroU32;
//! use std::rc::Rc;
//! use lazytable::{PageRequest, PageResponse, TableConfig, TableSource};
//!
//! let fetcher = Rc::new(|req: PageRequest, done: lazytable::FetchDone<Row>| {
//!     spawn_request(req, done); // resolve {data, total} whenever ready
//! });
//! let config = TableConfig::new(NonZeroU32::new(48).unwrap());
//! let source = TableSource::new(fetcher, config);
//! source.attach(viewport)?;
//! let _sub = source.connect().subscribe_now(|rows| render(rows));
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod range;
pub mod reactive;
pub mod resolver;
pub mod source;
pub mod sticky;
pub mod store;
pub mod viewport;

pub use config::{DEFAULT_PAGE_SIZE, TableConfig};
pub use error::{AttachError, FetchError};
pub use fetch::{FetchDone, PageFailure, PageFetcher, PageRequest, PageResponse, SharedFetcher};
pub use range::RenderRange;
pub use reactive::{EventChannel, Signal, Subscription};
pub use source::TableSource;
pub use sticky::StickyHeaderSync;
pub use store::PageStore;
pub use viewport::VirtualViewport;
