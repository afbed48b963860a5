#![forbid(unsafe_code)]

//! A hand-cranked viewport for driving the pipeline from tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lazytable::reactive::Signal;
use lazytable::{RenderRange, VirtualViewport};

/// Scripted [`VirtualViewport`].
///
/// Tests crank it directly: [`MockViewport::scroll_to_index`] emits a
/// scroll event, [`MockViewport::set_content_offset`] adjusts what the
/// pixel query answers, and every `set_rendered_range` command — whether
/// issued by the test or by the data source after a total change — is
/// recorded in [`MockViewport::range_commands`].
pub struct MockViewport {
    rendered_range: Signal<Option<RenderRange>>,
    scrolled_index: Signal<usize>,
    content_offset: Cell<i64>,
    range_commands: RefCell<Vec<RenderRange>>,
}

impl Default for MockViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockViewport {
    /// Fresh viewport: no range yet, scroll index 0, zero content offset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rendered_range: Signal::new(None),
            scrolled_index: Signal::new(0),
            content_offset: Cell::new(0),
            range_commands: RefCell::new(Vec::new()),
        }
    }

    /// Shared handle, ready to attach.
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Emit a rendered-range change, as the viewport would after a user
    /// scroll or a layout pass. Not recorded as a command.
    pub fn emit_range(&self, range: RenderRange) {
        self.rendered_range.set(Some(range));
    }

    /// Emit a scroll-index change.
    pub fn scroll_to_index(&self, index: usize) {
        self.scrolled_index.set(index);
    }

    /// Set the value returned by `offset_to_rendered_content_start`.
    pub fn set_content_offset(&self, px: i64) {
        self.content_offset.set(px);
    }

    /// Every `set_rendered_range` command received, in order.
    #[must_use]
    pub fn range_commands(&self) -> Vec<RenderRange> {
        self.range_commands.borrow().clone()
    }

    /// The current rendered range, if any was issued yet.
    #[must_use]
    pub fn current_range(&self) -> Option<RenderRange> {
        self.rendered_range.get()
    }
}

impl VirtualViewport for MockViewport {
    fn rendered_range(&self) -> Signal<Option<RenderRange>> {
        self.rendered_range.clone()
    }

    fn scrolled_index(&self) -> Signal<usize> {
        self.scrolled_index.clone()
    }

    fn offset_to_rendered_content_start(&self) -> i64 {
        self.content_offset.get()
    }

    fn set_rendered_range(&self, range: RenderRange) {
        self.range_commands.borrow_mut().push(range);
        self.rendered_range.set(Some(range));
    }
}
