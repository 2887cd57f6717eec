#![forbid(unsafe_code)]

//! Structural change notifications for keyed sequences.
//!
//! This module provides the plumbing a [`KeyedSequence`] uses to tell
//! observers (typically a rendering layer) which index range a mutation
//! touched:
//!
//! - [`ListChange`]: `(kind, start, count)` description of one mutation.
//! - [`ObserverList`]: ordered registry of subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//!
//! # Architecture
//!
//! Callbacks are owned by their [`Subscription`] guard and held weakly by
//! the registry. Dead entries are cleaned up lazily during notification.
//! Everything is single-threaded (`Rc`), matching UI-style containers.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Delivery is synchronous: every live subscriber has run before the
//!    mutating call returns.
//! 3. Dropping a [`Subscription`] stops its callback immediately, including
//!    later in a cycle that is already delivering.
//! 4. One notification per successful mutating call, with one exception:
//!    `retain` emits one [`ChangeKind::Removed`] per contiguous run of
//!    removed elements, back to front, so each range is exact for the
//!    contents at the time it is delivered.
//!
//! [`KeyedSequence`]: crate::KeyedSequence

pub mod change;
pub mod observers;

pub use change::{ChangeKind, ListChange};
pub use observers::{ObserverList, Subscription};
