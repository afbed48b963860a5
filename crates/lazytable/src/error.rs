#![forbid(unsafe_code)]

//! Error types for attach preconditions and page fetches.
//!
//! | Error | Scope | Recovery |
//! |-------|-------|----------|
//! | [`AttachError`] | attach-time precondition | none; caller must not proceed |
//! | [`FetchError`] | one page of one batch | page re-resolves on a later range event |

/// Attach-time precondition violations. Fatal and synchronous: the caller
/// must not proceed to render when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    /// The data source is already attached to a viewport.
    AlreadyAttached,
}

impl std::fmt::Display for AttachError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyAttached => {
                write!(f, "data source is already attached to a viewport")
            }
        }
    }
}

impl std::error::Error for AttachError {}

/// A page-level fetch failure.
///
/// Localized by design: the affected page stays unfetched and is eligible
/// for re-resolution when a later range event covers it again. The rest of
/// the batch continues. No automatic retry or backoff is built in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The external fetch function reported a failure.
    Rejected(String),
    /// The fetch function returned more rows than one page holds,
    /// violating the fetch contract (`data.len() <= page_size`).
    Oversized {
        /// Page the response was for.
        page: usize,
        /// Number of rows returned.
        len: usize,
        /// Configured rows per page.
        page_size: usize,
    },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "fetch rejected: {reason}"),
            Self::Oversized {
                page,
                len,
                page_size,
            } => write!(
                f,
                "fetch for page {page} returned {len} rows, more than the page size {page_size}"
            ),
        }
    }
}

impl std::error::Error for FetchError {}
