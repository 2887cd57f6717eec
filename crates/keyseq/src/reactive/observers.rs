#![forbid(unsafe_code)]

//! Ordered subscriber registry with RAII unsubscription.
//!
//! # Design
//!
//! [`ObserverList<E>`] keeps callbacks as `Weak` references in registration
//! order. The strong `Rc` lives inside the [`Subscription`] handed back to
//! the caller, so dropping the guard is all it takes to unsubscribe.
//!
//! # Performance
//!
//! | Operation     | Complexity                 |
//! |---------------|----------------------------|
//! | `subscribe()` | O(1) amortized             |
//! | `notify()`    | O(S) where S = subscribers |
//! | `len()`       | O(1)                       |
//!
//! # Failure Modes
//!
//! - **Re-entrant mutation**: a callback receives `&[E]` borrowed from the
//!   sequence being mutated. Mutating that sequence from inside the callback
//!   is rejected by the borrow checker; if the sequence is shared through
//!   `Rc<RefCell<..>>`, the attempt panics on the `RefCell` borrow. Both are
//!   intentional: re-entrant mutations indicate a design bug in the
//!   observer graph.
//! - **Subscriber leak**: guards stored indefinitely keep their callbacks
//!   alive. Dead weak references are cleaned lazily during `notify()`.
//! - **Guard dropped mid-cycle**: a callback that drops another
//!   subscriber's guard stops that subscriber immediately, even if it comes
//!   later in the current cycle.

use std::rc::{Rc, Weak};

use super::change::ListChange;

/// Strong callback handle, owned by the [`Subscription`].
type CallbackRc<E> = Rc<dyn Fn(ListChange, &[E])>;
type CallbackWeak<E> = Weak<dyn Fn(ListChange, &[E])>;

/// Registration-ordered list of change callbacks.
///
/// Callbacks receive the change and the full contents after the mutation.
pub struct ObserverList<E> {
    /// Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak<E>>,
}

impl<E> Default for ObserverList<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for ObserverList<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("subscriber_count", &self.subscribers.len())
            .finish()
    }
}

impl<E> ObserverList<E> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It is invoked after every change until the
    /// returned [`Subscription`] is dropped.
    pub fn subscribe(&mut self, callback: impl Fn(ListChange, &[E]) + 'static) -> Subscription
    where
        E: 'static,
    {
        let strong: CallbackRc<E> = Rc::new(callback);
        self.subscribers.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of registered callbacks, including dead ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver `change` to every live callback in registration order and
    /// prune dead ones. Returns the number of callbacks invoked.
    ///
    /// Each entry is upgraded right before its call, so a guard dropped by
    /// an earlier callback in the same cycle is already skipped.
    pub fn notify(&mut self, change: ListChange, items: &[E]) -> usize {
        self.subscribers.retain(|w| w.strong_count() > 0);
        let mut delivered = 0;
        for weak in &self.subscribers {
            if let Some(cb) = weak.upgrade() {
                cb(change, items);
                delivered += 1;
            }
        }
        delivered
    }
}

/// RAII guard for a change callback.
///
/// Dropping the `Subscription` drops the strong `Rc`, so the `Weak` kept by
/// the registry fails to upgrade from then on.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    /// Type-erased strong reference keeping the callback alive.
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
