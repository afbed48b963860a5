#![forbid(unsafe_code)]

//! Deduplicating value signal with change notification.
//!
//! # Design
//!
//! [`Signal<T>`] wraps a value in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). When the value changes (determined by `PartialEq`),
//! all live subscribers are notified in registration order. Setting a value
//! equal to the current one does nothing: no version bump, no notification.
//! That suppression is load-bearing — the sticky-header path relies on it to
//! avoid repainting headers for repeated identical offset samples.
//!
//! # Failure Modes
//!
//! - **Notification during notification**: a subscriber may call `set()` on
//!   the same signal; the nested notification runs to completion first, and
//!   any subscribers not yet visited by the outer cycle still receive the
//!   older value. Latest-value consumers must tolerate this (all consumers
//!   in this crate do).
//! - **Subscriber leak**: holding a [`Subscription`] guard forever keeps its
//!   callback alive. Dead weak references are pruned lazily on notify.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct SignalInner<T> {
    value: T,
    version: u64,
    /// Subscribers stored as weak references; dead entries pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning a `Signal` creates a new handle to the **same** inner state;
/// both handles see the same value and share subscribers.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing `set`.
/// 2. `set(v)` where `v == current` is a no-op.
/// 3. Subscribers are notified in registration order, outside any interior
///    borrow (subscribers may freely read the signal).
pub struct Signal<T> {
    inner: Rc<RefCell<SignalInner<T>>>,
}

// Manual Clone: shares the same Rc.
impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Signal")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Create a new signal with the given initial value (version 0, no
    /// subscribers).
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Set a new value. If it differs from the current value (by
    /// `PartialEq`), the version is incremented and all live subscribers
    /// are notified; otherwise this is a no-op.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Subscribe to value changes. The callback is invoked with a reference
    /// to the new value each time it changes.
    ///
    /// Returns a [`Subscription`] guard; dropping the guard unsubscribes.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        Subscription::hold(strong)
    }

    /// Subscribe, invoking the callback immediately with the current value
    /// before any change notification (behavior-subject semantics). This is
    /// what the rendered-data consumer contract uses: a late subscriber
    /// sees the latest published window right away.
    #[must_use]
    pub fn subscribe_now(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        callback(&self.inner.borrow().value);
        self.subscribe(callback)
    }

    /// Current version number. Increments by 1 on each value-changing
    /// mutation. Useful for dirty-checking in tests.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of currently registered subscribers (including dead ones not
    /// yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Notify live subscribers and prune dead ones.
    fn notify(&self) {
        // Collect live callbacks first so no borrow is held during calls.
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };

        let value = self.inner.borrow().value.clone();
        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` drops the strong `Rc` keeping the callback
/// alive, so the `Weak` in the subscriber list fails to upgrade on the next
/// notification cycle.
pub struct Subscription {
    /// Type-erased strong reference to the callback `Rc`.
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Wrap a strong callback handle in a guard.
    pub(crate) fn hold(guard: impl std::any::Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
