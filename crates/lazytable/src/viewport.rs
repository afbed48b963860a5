#![forbid(unsafe_code)]

//! The viewport contract consumed by the pagination pipeline.
//!
//! The viewport itself — scroll physics, DOM or terminal geometry, spacer
//! sizing — is an external collaborator. This crate only needs four things
//! from it: the two hot signals, one pixel query, and one command.

use crate::range::RenderRange;
use crate::reactive::Signal;

/// A virtual-scrolling viewport as seen by the data source and the
/// sticky-header synchronizer.
///
/// Implementations hand out cheap signal handles; both signals are hot and
/// multicast (every subscriber sees every change).
pub trait VirtualViewport {
    /// The index range the viewport currently wants rendered. `None` until
    /// the first layout pass.
    fn rendered_range(&self) -> Signal<Option<RenderRange>>;

    /// Index of the first visible item; changes as the user scrolls.
    fn scrolled_index(&self) -> Signal<usize>;

    /// Pixel offset from the top of the scrollable content to the start of
    /// the currently rendered window.
    fn offset_to_rendered_content_start(&self) -> i64;

    /// Command the viewport to re-issue its rendered range. The data source
    /// uses this after a total change so the scrollable extent recalculates;
    /// the viewport answers by emitting on `rendered_range`.
    fn set_rendered_range(&self, range: RenderRange);
}
