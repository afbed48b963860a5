//! Integration tests for sticky-header offset synchronization: the merge
//! of range-derived and scroll-derived samples into one repaint stream.

use std::cell::RefCell;
use std::num::{NonZeroU32, NonZeroUsize};
use std::rc::Rc;

use lazytable::{AttachError, RenderRange, StickyHeaderSync, TableConfig, TableSource, VirtualViewport};
use lazytable_harness::fixtures::rows;
use lazytable_harness::{MockViewport, ScriptedFetcher};

const ITEM_SIZE: u32 = 48;

fn config() -> TableConfig {
    TableConfig::new(NonZeroU32::new(ITEM_SIZE).unwrap())
        .with_page_size(NonZeroUsize::new(3).unwrap())
}

struct Rig {
    sync: StickyHeaderSync,
    source: TableSource<String>,
    viewport: Rc<MockViewport>,
    offsets: Rc<RefCell<Vec<i64>>>,
}

/// Synchronizer over an attached source, one header registered.
fn rig() -> Rig {
    let source = TableSource::new(ScriptedFetcher::immediate(rows(10)), config());
    let viewport = MockViewport::shared();
    let sync = StickyHeaderSync::new(config());
    let offsets: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let offsets_clone = Rc::clone(&offsets);
    sync.register_header(move |offset| offsets_clone.borrow_mut().push(offset));
    sync.attach(&source, viewport.clone()).expect("fresh attach");
    Rig {
        sync,
        source,
        viewport,
        offsets,
    }
}

#[test]
fn range_events_reposition_headers_by_item_size() {
    let rig = rig();
    // The initial load happens during attach, before the offset wiring;
    // no sample has been applied yet.
    assert_eq!(rig.sync.current_offset(), None);

    rig.viewport.emit_range(RenderRange::new(2, 5));
    assert_eq!(*rig.offsets.borrow(), vec![-2 * i64::from(ITEM_SIZE)]);
    assert_eq!(rig.sync.current_offset(), Some(-96));
}

#[test]
fn duplicate_scroll_samples_reposition_once() {
    let rig = rig();
    rig.viewport.set_content_offset(120);
    rig.viewport.scroll_to_index(3);
    // A second scroll event with an unchanged pixel offset must not
    // repaint the headers again.
    rig.viewport.scroll_to_index(4);
    assert_eq!(*rig.offsets.borrow(), vec![-120]);

    rig.viewport.set_content_offset(150);
    rig.viewport.scroll_to_index(5);
    assert_eq!(*rig.offsets.borrow(), vec![-120, -150]);
}

#[test]
fn merge_is_first_arrival_wins_across_paths() {
    let rig = rig();
    // A range sample equal to the previous scroll sample still repaints:
    // deduplication only applies within the scroll path.
    rig.viewport.set_content_offset(i64::from(ITEM_SIZE));
    rig.viewport.scroll_to_index(1);
    rig.viewport.emit_range(RenderRange::new(1, 4));
    assert_eq!(
        *rig.offsets.borrow(),
        vec![-i64::from(ITEM_SIZE), -i64::from(ITEM_SIZE)]
    );
}

#[test]
fn every_registered_header_is_repositioned() {
    let source = TableSource::new(ScriptedFetcher::immediate(rows(10)), config());
    let viewport = MockViewport::shared();
    let sync = StickyHeaderSync::new(config());
    let first: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let second: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let first_clone = Rc::clone(&first);
    let second_clone = Rc::clone(&second);
    sync.register_header(move |offset| first_clone.borrow_mut().push(offset));
    sync.register_header(move |offset| second_clone.borrow_mut().push(offset));
    sync.attach(&source, viewport.clone()).expect("fresh attach");

    viewport.emit_range(RenderRange::new(1, 4));
    assert_eq!(*first.borrow(), vec![-48]);
    assert_eq!(*second.borrow(), vec![-48]);
}

#[test]
fn attach_is_all_or_nothing() {
    let rig = rig();

    // The synchronizer itself refuses a second attach...
    let other_viewport = MockViewport::shared();
    let other_source = TableSource::new(ScriptedFetcher::immediate(rows(4)), config());
    assert_eq!(
        rig.sync.attach(&other_source, other_viewport.clone()),
        Err(AttachError::AlreadyAttached)
    );
    assert_eq!(other_viewport.rendered_range().subscriber_count(), 0);

    // ...and a fresh synchronizer over an already-attached source fails
    // at the source precondition, wiring nothing.
    let fresh = StickyHeaderSync::new(config());
    assert_eq!(
        fresh.attach(&rig.source, other_viewport.clone()),
        Err(AttachError::AlreadyAttached)
    );
    assert_eq!(other_viewport.rendered_range().subscriber_count(), 0);
    assert_eq!(other_viewport.scrolled_index().subscriber_count(), 0);
}

#[test]
fn detach_is_idempotent_and_silences_headers() {
    let rig = rig();
    rig.viewport.emit_range(RenderRange::new(1, 4));
    assert_eq!(rig.offsets.borrow().len(), 1);

    rig.sync.detach();
    rig.sync.detach();
    rig.viewport.emit_range(RenderRange::new(5, 8));
    rig.viewport.set_content_offset(999);
    rig.viewport.scroll_to_index(7);
    assert_eq!(rig.offsets.borrow().len(), 1);
    // The last applied offset survives the detach.
    assert_eq!(rig.sync.current_offset(), Some(-48));
}
