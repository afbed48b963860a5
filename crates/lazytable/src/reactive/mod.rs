#![forbid(unsafe_code)]

//! Reactive primitives for the pagination pipeline.
//!
//! Everything in this crate is single-threaded, cooperative, and
//! event-driven. Two primitives cover all of it:
//!
//! - [`Signal`]: a shared, version-tracked value with change notification.
//!   Setting a value equal to the current one is a no-op, so downstream
//!   consumers never see redundant publishes of an unchanged window.
//! - [`EventChannel`]: a value-less multicast channel that notifies on
//!   every emit. Used where duplicates must *not* be suppressed, such as
//!   repeated fetch failures for the same page.
//!
//! # Architecture
//!
//! Both primitives use `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` function pointers and are
//! pruned lazily during notification; dropping a [`Subscription`] guard
//! unsubscribes before the next notification cycle.

pub mod channel;
pub mod signal;

pub use channel::EventChannel;
pub use signal::{Signal, Subscription};
