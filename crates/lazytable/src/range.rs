#![forbid(unsafe_code)]

//! Rendered-range type shared by the viewport and the pagination pipeline.

/// Half-open index interval `[start, end)` the viewport currently wants
/// rendered.
///
/// The "unset" state before the first layout pass is modeled as
/// `Option<RenderRange>::None`, not as a sentinel inside the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderRange {
    /// First index in the range.
    pub start: usize,
    /// One past the last index in the range.
    pub end: usize,
}

impl RenderRange {
    /// Create a range.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "RenderRange start must not exceed end");
        Self { start, end }
    }

    /// Number of indices covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range covers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<std::ops::Range<usize>> for RenderRange {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_and_empty() {
        assert_eq!(RenderRange::new(2, 5).len(), 3);
        assert!(RenderRange::new(4, 4).is_empty());
        assert!(!RenderRange::new(4, 5).is_empty());
    }

    #[test]
    #[should_panic(expected = "start must not exceed end")]
    fn inverted_range_panics() {
        let _ = RenderRange::new(5, 2);
    }

    #[test]
    fn from_std_range() {
        let r: RenderRange = (3..7).into();
        assert_eq!(r, RenderRange::new(3, 7));
    }
}
