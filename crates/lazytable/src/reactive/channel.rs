#![forbid(unsafe_code)]

//! Value-less multicast event channel.
//!
//! Unlike [`Signal`](super::Signal), an [`EventChannel`] retains nothing and
//! notifies on **every** emit, duplicates included. The fetch-failure path
//! needs this: the same page can fail twice in a row and both failures must
//! reach the caller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::signal::Subscription;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ChannelInner<T> {
    subscribers: Vec<CallbackWeak<T>>,
}

/// Multicast channel with no retained value and no deduplication.
///
/// Cloning an `EventChannel` creates a new handle to the same subscriber
/// list. Subscribers are notified in registration order, outside any
/// interior borrow.
pub struct EventChannel<T> {
    inner: Rc<RefCell<ChannelInner<T>>>,
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscriber_count", &self.inner.borrow().subscribers.len())
            .finish()
    }
}

impl<T: 'static> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> EventChannel<T> {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                subscribers: Vec::new(),
            })),
        }
    }

    /// Emit an event to every live subscriber.
    pub fn emit(&self, event: &T) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };
        for cb in &callbacks {
            cb(event);
        }
    }

    /// Subscribe to events. Returns a [`Subscription`] guard; dropping the
    /// guard unsubscribes.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        Subscription::hold(strong)
    }

    /// Number of currently registered subscribers (including dead ones not
    /// yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}
