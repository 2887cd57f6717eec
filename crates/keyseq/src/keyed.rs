#![forbid(unsafe_code)]

//! The key capability shared by every element of a [`KeyedSequence`].
//!
//! An element exposes its key by reference. Keys only need `PartialEq`:
//! no ordering, no hashing, and no uniqueness across a sequence.
//!
//! Shared elements (`Rc<T>`, `Arc<T>`) and boxed elements delegate to the
//! pointee, so a sequence can hold handles that other collaborators also
//! own without cloning the element itself.
//!
//! [`KeyedSequence`]: crate::KeyedSequence

use std::rc::Rc;
use std::sync::Arc;

/// Types that carry a retrievable key.
///
/// The key must stay the same for as long as the element is stored in a
/// sequence. Mutating it in place (through interior mutability) is not
/// tracked and leaves lookups unspecified.
pub trait Keyed {
    /// Key type. `?Sized` so that `String`-backed elements can expose `str`.
    type Key: ?Sized + PartialEq;

    /// Borrow this element's key.
    fn key(&self) -> &Self::Key;
}

impl<T: Keyed + ?Sized> Keyed for &T {
    type Key = T::Key;

    fn key(&self) -> &Self::Key {
        (**self).key()
    }
}

impl<T: Keyed + ?Sized> Keyed for Box<T> {
    type Key = T::Key;

    fn key(&self) -> &Self::Key {
        (**self).key()
    }
}

impl<T: Keyed + ?Sized> Keyed for Rc<T> {
    type Key = T::Key;

    fn key(&self) -> &Self::Key {
        (**self).key()
    }
}

impl<T: Keyed + ?Sized> Keyed for Arc<T> {
    type Key = T::Key;

    fn key(&self) -> &Self::Key {
        (**self).key()
    }
}
