#![forbid(unsafe_code)]

//! Ordered, observable list with key-based lookup.
//!
//! # Design
//!
//! [`KeyedSequence<E>`] stores its elements in a single `Vec<E>` and
//! serves two access models from it:
//!
//! - **Positional**: insert, replace, and remove by 0-based index.
//! - **Associative**: look elements up by [`Keyed::key`], scanning forward
//!   (first match) or backward (last match).
//!
//! Keys need not be unique. With duplicates, [`get`](KeyedSequence::get)
//! and [`index_of_key`](KeyedSequence::index_of_key) return the lowest
//! index while [`get_last`](KeyedSequence::get_last) and
//! [`last_index_of_key`](KeyedSequence::last_index_of_key) return the
//! highest, so callers can pick "first wins" or "most recent wins".
//!
//! There is no secondary index: it would need invalidation whenever an
//! element's key changed in place, which is not tracked.
//!
//! # Performance
//!
//! | Operation                    | Complexity               |
//! |------------------------------|--------------------------|
//! | `append()`                   | O(1) amortized + O(S)    |
//! | `insert_at()` / `remove_at()`| O(n) + O(S)              |
//! | `set_at()`                   | O(1) + O(S)              |
//! | key lookups                  | O(n)                     |
//! | `contains_all_keys()`        | O(n * k)                 |
//!
//! S = subscribers notified per mutation.
//!
//! # Invariants
//!
//! 1. No absent element is ever stored: element-accepting operations take
//!    `Into<Option<E>>` and reject `None` before touching storage.
//! 2. A failed call leaves contents, version, and subscribers unchanged and
//!    emits nothing.
//! 3. Every successful mutation emits exactly one [`ListChange`] describing
//!    the affected range ([`retain`](KeyedSequence::retain) emits one per
//!    removed run), delivered before the call returns.
//! 4. `version` increments by exactly 1 per emitted notification.

use std::borrow::Borrow;
use std::ops::{Index, Range};

use tracing::{debug, trace};

use crate::config::SequenceConfig;
use crate::error::{Result, SequenceError};
use crate::keyed::Keyed;
use crate::reactive::{ListChange, ObserverList, Subscription};

/// An ordered, mutable, observable list of keyed elements.
pub struct KeyedSequence<E> {
    items: Vec<E>,
    observers: ObserverList<E>,
    version: u64,
    config: SequenceConfig,
}

impl<E> Default for KeyedSequence<E> {
    fn default() -> Self {
        Self::with_config(SequenceConfig::default())
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for KeyedSequence<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedSequence")
            .field("label", &self.config.label)
            .field("items", &self.items)
            .field("version", &self.version)
            .field("subscriber_count", &self.observers.len())
            .finish()
    }
}

/// Collect a batch, failing on the first absent element.
fn collect_present<E, I>(elements: I) -> Result<Vec<E>>
where
    I: IntoIterator,
    I::Item: Into<Option<E>>,
{
    let iter = elements.into_iter();
    let mut present = Vec::with_capacity(iter.size_hint().0);
    for (position, element) in iter.enumerate() {
        match element.into() {
            Some(element) => present.push(element),
            None => return Err(SequenceError::InvalidElement { position }),
        }
    }
    Ok(present)
}

fn key_matches<E, Q>(element: &E, key: &Q) -> bool
where
    E: Keyed,
    E::Key: Borrow<Q>,
    Q: ?Sized + PartialEq,
{
    <E::Key as Borrow<Q>>::borrow(element.key()) == key
}

impl<E> KeyedSequence<E> {
    /// Create an empty sequence with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sequence with the given configuration.
    #[must_use]
    pub fn with_config(config: SequenceConfig) -> Self {
        Self {
            items: Vec::with_capacity(config.capacity),
            observers: ObserverList::new(),
            version: 0,
            config,
        }
    }

    /// Build a sequence from an ordered collection, re-validating that no
    /// element is absent.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidElement`] if any item is `None`.
    pub fn from_elements<I>(elements: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Option<E>>,
    {
        let items = collect_present(elements)?;
        Ok(Self {
            items,
            ..Self::default()
        })
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`, or `None` if out of range.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&E> {
        self.items.get(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&E> {
        self.items.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&E> {
        self.items.last()
    }

    /// Iterate in order. The iterator is double-ended; use `.rev()` for
    /// backward iteration.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    /// Plain ordered snapshot of the contents.
    #[must_use]
    pub fn to_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.items.clone()
    }

    /// Consume the sequence, returning its storage. Subscribers are dropped
    /// without a notification.
    #[must_use]
    pub fn into_vec(self) -> Vec<E> {
        self.items
    }

    /// Current version. Increments by 1 on each emitted notification.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Subscribe to structural changes.
    ///
    /// The callback receives the change and the contents after the
    /// mutation. Dropping the returned [`Subscription`] unsubscribes.
    pub fn subscribe(&mut self, callback: impl Fn(ListChange, &[E]) + 'static) -> Subscription
    where
        E: 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Number of registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    /// Append `element` at the end.
    ///
    /// Returns whether the storage changed, which is always `true` on
    /// success.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidElement`] if `element` is `None`.
    pub fn append(&mut self, element: impl Into<Option<E>>) -> Result<bool> {
        let Some(element) = element.into() else {
            return Err(self.reject("append", SequenceError::InvalidElement { position: 0 }));
        };
        self.items.push(element);
        self.emit(ListChange::inserted(self.items.len() - 1, 1));
        Ok(true)
    }

    /// Insert `element` at `index`, shifting later elements back by one.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidElement`] if `element` is `None`;
    /// [`SequenceError::IndexOutOfRange`] unless `index <= len`.
    pub fn insert_at(&mut self, index: usize, element: impl Into<Option<E>>) -> Result<()> {
        let Some(element) = element.into() else {
            return Err(self.reject("insert_at", SequenceError::InvalidElement { position: 0 }));
        };
        self.check_insert_index("insert_at", index)?;
        self.items.insert(index, element);
        self.emit(ListChange::inserted(index, 1));
        Ok(())
    }

    /// Append a batch at the end, in input order.
    ///
    /// All items are checked before anything is stored. Returns `false`
    /// (and emits nothing) for an empty batch.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidElement`] if any item is `None`.
    pub fn append_all<I>(&mut self, elements: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<Option<E>>,
    {
        let batch = collect_present(elements).map_err(|err| self.reject("append_all", err))?;
        if batch.is_empty() {
            return Ok(false);
        }
        let start = self.items.len();
        let count = batch.len();
        self.items.extend(batch);
        self.emit(ListChange::inserted(start, count));
        Ok(true)
    }

    /// Insert a batch starting at `index`, preserving input order.
    ///
    /// All items and the index are checked before anything is stored.
    /// Returns `false` (and emits nothing) for an empty batch.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidElement`] if any item is `None`;
    /// [`SequenceError::IndexOutOfRange`] unless `index <= len`.
    pub fn insert_all_at<I>(&mut self, index: usize, elements: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<Option<E>>,
    {
        let batch = collect_present(elements).map_err(|err| self.reject("insert_all_at", err))?;
        self.check_insert_index("insert_all_at", index)?;
        if batch.is_empty() {
            return Ok(false);
        }
        let count = batch.len();
        self.items.splice(index..index, batch);
        self.emit(ListChange::inserted(index, count));
        Ok(true)
    }

    /// Replace the element at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidElement`] if `element` is `None`;
    /// [`SequenceError::IndexOutOfRange`] unless `index < len`.
    pub fn set_at(&mut self, index: usize, element: impl Into<Option<E>>) -> Result<E> {
        let Some(element) = element.into() else {
            return Err(self.reject("set_at", SequenceError::InvalidElement { position: 0 }));
        };
        self.check_index("set_at", index)?;
        let previous = std::mem::replace(&mut self.items[index], element);
        self.emit(ListChange::replaced(index, 1));
        Ok(previous)
    }

    /// Remove and return the element at `index`.
    ///
    /// # Errors
    ///
    /// [`SequenceError::IndexOutOfRange`] unless `index < len`.
    pub fn remove_at(&mut self, index: usize) -> Result<E> {
        self.check_index("remove_at", index)?;
        let removed = self.items.remove(index);
        self.emit(ListChange::removed(index, 1));
        Ok(removed)
    }

    /// Remove the elements in `range`, returning them in order.
    ///
    /// An empty range is a no-op and emits nothing.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidRange`] unless `start <= end <= len`.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<Vec<E>> {
        let len = self.items.len();
        if range.start > range.end || range.end > len {
            return Err(self.reject(
                "remove_range",
                SequenceError::InvalidRange {
                    start: range.start,
                    end: range.end,
                    len,
                },
            ));
        }
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let start = range.start;
        let removed: Vec<E> = self.items.drain(range).collect();
        self.emit(ListChange::removed(start, removed.len()));
        Ok(removed)
    }

    /// Remove every element. Emits one removal covering the old contents,
    /// or nothing if already empty.
    pub fn clear(&mut self) {
        let count = self.items.len();
        if count == 0 {
            return;
        }
        self.items.clear();
        self.emit(ListChange::removed(0, count));
    }

    /// Keep only the elements for which `keep` returns `true`.
    ///
    /// Each maximal run of removed elements produces one notification.
    /// Runs are removed back to front, so every notification's indices are
    /// exact for the contents at the time it is delivered. Returns the
    /// number of elements removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&E) -> bool) -> usize {
        let mask: Vec<bool> = self.items.iter().map(|e| keep(e)).collect();
        let mut removed = 0;
        let mut end = mask.len();
        while end > 0 {
            if mask[end - 1] {
                end -= 1;
                continue;
            }
            let mut start = end - 1;
            while start > 0 && !mask[start - 1] {
                start -= 1;
            }
            self.items.drain(start..end);
            self.emit(ListChange::removed(start, end - start));
            removed += end - start;
            end = start;
        }
        removed
    }

    fn check_insert_index(&self, op: &'static str, index: usize) -> Result<()> {
        if index > self.items.len() {
            return Err(self.reject(
                op,
                SequenceError::IndexOutOfRange {
                    index,
                    len: self.items.len(),
                },
            ));
        }
        Ok(())
    }

    fn check_index(&self, op: &'static str, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(self.reject(
                op,
                SequenceError::IndexOutOfRange {
                    index,
                    len: self.items.len(),
                },
            ));
        }
        Ok(())
    }

    fn reject(&self, op: &'static str, err: SequenceError) -> SequenceError {
        debug!(
            label = self.config.label_or_default(),
            op,
            error = %err,
            "rejected mutation"
        );
        err
    }

    fn emit(&mut self, change: ListChange) {
        self.version += 1;
        let observers = self.observers.notify(change, &self.items);
        trace!(
            label = self.config.label_or_default(),
            kind = %change.kind,
            start = change.start,
            count = change.count,
            observers,
            version = self.version,
            "list change"
        );
    }
}

impl<E: Keyed> KeyedSequence<E> {
    /// Whether any element's key equals `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + PartialEq,
    {
        self.index_of_key(key).is_some()
    }

    /// First (lowest-index) element whose key equals `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&E>
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + PartialEq,
    {
        self.items.iter().find(|e| key_matches(*e, key))
    }

    /// Last (highest-index) element whose key equals `key`.
    #[must_use]
    pub fn get_last<Q>(&self, key: &Q) -> Option<&E>
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + PartialEq,
    {
        self.items.iter().rev().find(|e| key_matches(*e, key))
    }

    /// Index of the first match, scanning forward.
    #[must_use]
    pub fn index_of_key<Q>(&self, key: &Q) -> Option<usize>
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + PartialEq,
    {
        self.items.iter().position(|e| key_matches(e, key))
    }

    /// Index of the last match, scanning backward.
    #[must_use]
    pub fn last_index_of_key<Q>(&self, key: &Q) -> Option<usize>
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + PartialEq,
    {
        self.items.iter().rposition(|e| key_matches(e, key))
    }

    /// Whether every key in `keys` is present. Stops at the first missing
    /// key; duplicates in `keys` are checked individually.
    pub fn contains_all_keys<'q, Q, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'q Q>,
        E::Key: Borrow<Q>,
        Q: ?Sized + PartialEq + 'q,
    {
        keys.into_iter().all(|key| self.contains_key(key))
    }

    /// Remove the first element whose key equals `key`.
    ///
    /// Returns `None` and emits nothing when no element matches.
    pub fn remove_key<Q>(&mut self, key: &Q) -> Option<E>
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + PartialEq,
    {
        let index = self.index_of_key(key)?;
        let removed = self.items.remove(index);
        self.emit(ListChange::removed(index, 1));
        Some(removed)
    }
}

impl<E> Index<usize> for KeyedSequence<E> {
    type Output = E;

    /// # Panics
    ///
    /// Panics if `index >= len`, like slice indexing.
    fn index(&self, index: usize) -> &E {
        &self.items[index]
    }
}

impl<'a, E> IntoIterator for &'a KeyedSequence<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<E> IntoIterator for KeyedSequence<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<E> FromIterator<E> for KeyedSequence<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<E>>())
    }
}

impl<E> From<Vec<E>> for KeyedSequence<E> {
    fn from(items: Vec<E>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::KeyedSequence;
    use crate::config::SequenceConfig;
    use crate::error::SequenceError;
    use crate::keyed::Keyed;
    use crate::reactive::{ChangeKind, ListChange, Subscription};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq)]
    struct Peer {
        name: &'static str,
        port: u16,
    }

    impl Keyed for Peer {
        type Key = str;

        fn key(&self) -> &str {
            self.name
        }
    }

    fn peer(name: &'static str, port: u16) -> Peer {
        Peer { name, port }
    }

    fn recorder(seq: &mut KeyedSequence<Peer>) -> (Rc<RefCell<Vec<ListChange>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let sub = seq.subscribe(move |change, _| log_clone.borrow_mut().push(change));
        (log, sub)
    }

    fn ports(seq: &KeyedSequence<Peer>) -> Vec<u16> {
        seq.iter().map(|p| p.port).collect()
    }

    #[test]
    fn append_places_at_end() {
        let mut seq = KeyedSequence::new();
        let (log, _sub) = recorder(&mut seq);

        assert_eq!(seq.append(peer("a", 1)), Ok(true));
        assert_eq!(seq.append(peer("b", 2)), Ok(true));

        assert_eq!(ports(&seq), vec![1, 2]);
        assert_eq!(
            *log.borrow(),
            vec![ListChange::inserted(0, 1), ListChange::inserted(1, 1)]
        );
        assert_eq!(seq.version(), 2);
    }

    #[test]
    fn append_absent_is_rejected() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        let (log, _sub) = recorder(&mut seq);

        assert_eq!(
            seq.append(None::<Peer>),
            Err(SequenceError::InvalidElement { position: 0 })
        );
        assert_eq!(ports(&seq), vec![1]);
        assert!(log.borrow().is_empty());
        assert_eq!(seq.version(), 0);
    }

    #[test]
    fn insert_at_shifts_later_elements() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1), peer("c", 3)]);
        let (log, _sub) = recorder(&mut seq);

        seq.insert_at(1, peer("b", 2)).unwrap();
        seq.insert_at(3, peer("d", 4)).unwrap();
        seq.insert_at(0, peer("z", 0)).unwrap();

        assert_eq!(ports(&seq), vec![0, 1, 2, 3, 4]);
        assert_eq!(
            *log.borrow(),
            vec![
                ListChange::inserted(1, 1),
                ListChange::inserted(3, 1),
                ListChange::inserted(0, 1),
            ]
        );
    }

    #[test]
    fn insert_at_bounds() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        assert_eq!(
            seq.insert_at(2, peer("b", 2)),
            Err(SequenceError::IndexOutOfRange { index: 2, len: 1 })
        );
        assert_eq!(
            seq.insert_at(0, None::<Peer>),
            Err(SequenceError::InvalidElement { position: 0 })
        );
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.version(), 0);
    }

    #[test]
    fn append_all_single_notification() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        let (log, _sub) = recorder(&mut seq);

        assert_eq!(seq.append_all(vec![peer("b", 2), peer("c", 3)]), Ok(true));
        assert_eq!(ports(&seq), vec![1, 2, 3]);
        assert_eq!(*log.borrow(), vec![ListChange::inserted(1, 2)]);
    }

    #[test]
    fn append_all_is_all_or_nothing() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        let (log, _sub) = recorder(&mut seq);

        let result = seq.append_all(vec![Some(peer("b", 2)), Some(peer("c", 3)), None]);
        assert_eq!(result, Err(SequenceError::InvalidElement { position: 2 }));
        assert_eq!(ports(&seq), vec![1]);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn empty_batch_is_unchanged() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        let (log, _sub) = recorder(&mut seq);

        assert_eq!(seq.append_all(Vec::<Peer>::new()), Ok(false));
        assert_eq!(seq.insert_all_at(0, Vec::<Peer>::new()), Ok(false));
        assert!(log.borrow().is_empty());
        assert_eq!(seq.version(), 0);
    }

    #[test]
    fn empty_batch_still_checks_index() {
        let mut seq: KeyedSequence<Peer> = KeyedSequence::new();
        assert_eq!(
            seq.insert_all_at(1, Vec::<Peer>::new()),
            Err(SequenceError::IndexOutOfRange { index: 1, len: 0 })
        );
    }

    #[test]
    fn insert_all_at_preserves_order() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1), peer("d", 4)]);
        let (log, _sub) = recorder(&mut seq);

        assert_eq!(seq.insert_all_at(1, [peer("b", 2), peer("c", 3)]), Ok(true));
        assert_eq!(ports(&seq), vec![1, 2, 3, 4]);
        assert_eq!(*log.borrow(), vec![ListChange::inserted(1, 2)]);
    }

    #[test]
    fn insert_all_at_rejects_bad_index_without_mutation() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        assert_eq!(
            seq.insert_all_at(5, [peer("b", 2)]),
            Err(SequenceError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert_eq!(ports(&seq), vec![1]);
    }

    #[test]
    fn set_at_returns_previous() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1), peer("b", 2)]);
        let (log, _sub) = recorder(&mut seq);

        let previous = seq.set_at(1, peer("b", 20)).unwrap();
        assert_eq!(previous, peer("b", 2));
        assert_eq!(ports(&seq), vec![1, 20]);
        assert_eq!(*log.borrow(), vec![ListChange::replaced(1, 1)]);
    }

    #[test]
    fn set_at_failures_leave_contents() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        assert_eq!(
            seq.set_at(1, peer("b", 2)),
            Err(SequenceError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(
            seq.set_at(0, None::<Peer>),
            Err(SequenceError::InvalidElement { position: 0 })
        );
        assert_eq!(ports(&seq), vec![1]);
    }

    #[test]
    fn remove_at_and_bounds() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1), peer("b", 2), peer("c", 3)]);
        let (log, _sub) = recorder(&mut seq);

        assert_eq!(seq.remove_at(1), Ok(peer("b", 2)));
        assert_eq!(
            seq.remove_at(2),
            Err(SequenceError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(ports(&seq), vec![1, 3]);
        assert_eq!(*log.borrow(), vec![ListChange::removed(1, 1)]);
    }

    #[test]
    fn remove_range_behaviour() {
        let mut seq: KeyedSequence<Peer> = (1..=5).map(|p| peer("x", p)).collect();
        let (log, _sub) = recorder(&mut seq);

        let removed = seq.remove_range(1..3).unwrap();
        assert_eq!(removed.iter().map(|p| p.port).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(ports(&seq), vec![1, 4, 5]);

        assert_eq!(seq.remove_range(2..2), Ok(Vec::new()));
        #[allow(clippy::reversed_empty_ranges)]
        let backwards = seq.remove_range(2..1);
        assert_eq!(
            backwards,
            Err(SequenceError::InvalidRange {
                start: 2,
                end: 1,
                len: 3
            })
        );
        assert_eq!(
            seq.remove_range(0..4),
            Err(SequenceError::InvalidRange {
                start: 0,
                end: 4,
                len: 3
            })
        );
        assert_eq!(*log.borrow(), vec![ListChange::removed(1, 2)]);
    }

    #[test]
    fn clear_notifies_once_when_non_empty() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1), peer("b", 2)]);
        let (log, _sub) = recorder(&mut seq);

        seq.clear();
        seq.clear();
        assert!(seq.is_empty());
        assert_eq!(*log.borrow(), vec![ListChange::removed(0, 2)]);
    }

    #[test]
    fn retain_reports_runs_back_to_front() {
        // ports: 1 2 3 4 5 6 7, drop evens and 3
        let mut seq: KeyedSequence<Peer> = (1..=7).map(|p| peer("x", p)).collect();
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let snapshots_clone = Rc::clone(&snapshots);
        let _sub = seq.subscribe(move |change, items: &[Peer]| {
            snapshots_clone
                .borrow_mut()
                .push((change, items.iter().map(|p| p.port).collect::<Vec<_>>()));
        });

        let removed = seq.retain(|p| p.port % 2 == 1 && p.port != 3);
        assert_eq!(removed, 4);
        assert_eq!(ports(&seq), vec![1, 5, 7]);
        assert_eq!(
            *snapshots.borrow(),
            vec![
                (ListChange::removed(5, 1), vec![1, 2, 3, 4, 5, 7]),
                (ListChange::removed(1, 3), vec![1, 5, 7]),
            ]
        );
        assert_eq!(seq.version(), 2);
    }

    #[test]
    fn retain_keep_all_is_silent() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        let (log, _sub) = recorder(&mut seq);
        assert_eq!(seq.retain(|_| true), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn first_and_last_match_with_duplicates() {
        let seq = KeyedSequence::from(vec![
            peer("a", 1),
            peer("b", 2),
            peer("a", 3),
            peer("c", 4),
        ]);

        assert_eq!(seq.get("a").map(|p| p.port), Some(1));
        assert_eq!(seq.get_last("a").map(|p| p.port), Some(3));
        assert_eq!(seq.index_of_key("a"), Some(0));
        assert_eq!(seq.last_index_of_key("a"), Some(2));

        assert_eq!(seq.index_of_key("c"), Some(3));
        assert_eq!(seq.last_index_of_key("c"), Some(3));
    }

    #[test]
    fn missing_key_is_not_found() {
        let seq = KeyedSequence::from(vec![peer("a", 1)]);
        assert!(!seq.contains_key("zz"));
        assert_eq!(seq.get("zz"), None);
        assert_eq!(seq.get_last("zz"), None);
        assert_eq!(seq.index_of_key("zz"), None);
        assert_eq!(seq.last_index_of_key("zz"), None);
    }

    #[test]
    fn contains_all_keys_checks_each() {
        let seq = KeyedSequence::from(vec![peer("A", 1), peer("B", 2), peer("A", 3)]);
        assert!(seq.contains_all_keys(["A", "B"]));
        assert!(seq.contains_all_keys(["A", "A", "A"]));
        assert!(!seq.contains_all_keys(["A", "C"]));
        assert!(seq.contains_all_keys(std::iter::empty::<&str>()));
    }

    #[test]
    fn string_keys_borrow_as_str() {
        struct Named(String);
        impl Keyed for Named {
            type Key = String;
            fn key(&self) -> &String {
                &self.0
            }
        }

        let seq = KeyedSequence::from(vec![Named("wg0".into()), Named("wg1".into())]);
        assert_eq!(seq.index_of_key("wg1"), Some(1));
        assert_eq!(seq.index_of_key(&"wg0".to_string()), Some(0));
    }

    #[test]
    fn remove_key_takes_first_match() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1), peer("b", 2), peer("a", 3)]);
        let (log, _sub) = recorder(&mut seq);

        assert_eq!(seq.remove_key("a"), Some(peer("a", 1)));
        assert_eq!(seq.remove_key("zz"), None);
        assert_eq!(ports(&seq), vec![2, 3]);
        assert_eq!(*log.borrow(), vec![ListChange::removed(0, 1)]);
    }

    #[test]
    fn shared_elements_are_not_cloned() {
        let shared = Rc::new(peer("a", 1));
        let mut seq: KeyedSequence<Rc<Peer>> = KeyedSequence::new();
        seq.append(Rc::clone(&shared)).unwrap();

        assert!(Rc::ptr_eq(seq.get("a").unwrap(), &shared));
        assert_eq!(Rc::strong_count(&shared), 2);
    }

    #[test]
    fn from_elements_validates() {
        let ok = KeyedSequence::<Peer>::from_elements([Some(peer("a", 1)), Some(peer("b", 2))]).unwrap();
        assert_eq!(ports(&ok), vec![1, 2]);

        let err = KeyedSequence::<Peer>::from_elements([Some(peer("a", 1)), None]).unwrap_err();
        assert_eq!(err, SequenceError::InvalidElement { position: 1 });
    }

    #[test]
    fn snapshot_round_trip() {
        let seq = KeyedSequence::from(vec![peer("a", 1), peer("b", 2), peer("a", 3)]);
        let copy = KeyedSequence::<Peer>::from_elements(seq.to_vec()).unwrap();
        assert_eq!(copy.as_slice(), seq.as_slice());
    }

    #[test]
    fn positional_reads_and_iteration() {
        let seq = KeyedSequence::from(vec![peer("a", 1), peer("b", 2), peer("c", 3)]);
        assert_eq!(seq[1].port, 2);
        assert_eq!(seq.get_at(3), None);
        assert_eq!(seq.first().map(|p| p.port), Some(1));
        assert_eq!(seq.last().map(|p| p.port), Some(3));
        assert_eq!(seq.iter().rev().map(|p| p.port).collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!((&seq).into_iter().count(), 3);
        assert_eq!(seq.into_vec().len(), 3);
    }

    #[test]
    fn subscriber_sees_post_mutation_contents() {
        let mut seq = KeyedSequence::from(vec![peer("a", 1)]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = seq.subscribe(move |change, items: &[Peer]| {
            assert_eq!(change.kind, ChangeKind::Inserted);
            seen_clone.borrow_mut().extend(items.iter().map(|p| p.port));
        });

        seq.append(peer("b", 2)).unwrap();
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let mut seq = KeyedSequence::new();
        let (log, sub) = recorder(&mut seq);
        seq.append(peer("a", 1)).unwrap();
        drop(sub);
        seq.append(peer("b", 2)).unwrap();

        assert_eq!(*log.borrow(), vec![ListChange::inserted(0, 1)]);
        assert_eq!(seq.subscriber_count(), 0);
    }

    #[test]
    fn config_label_and_capacity() {
        let seq: KeyedSequence<Peer> =
            KeyedSequence::with_config(SequenceConfig::new().with_capacity(8).with_label("tunnels"));
        assert_eq!(seq.config().label_or_default(), "tunnels");
        assert!(seq.as_slice().is_empty());
        assert!(format!("{seq:?}").contains("tunnels"));
    }

    #[traced_test]
    #[test]
    fn mutations_are_logged() {
        let mut seq =
            KeyedSequence::with_config(SequenceConfig::new().with_label("peers"));
        seq.append(peer("a", 1)).unwrap();
        let _ = seq.remove_at(7);

        assert!(logs_contain("list change"));
        assert!(logs_contain("rejected mutation"));
        assert!(logs_contain("peers"));
    }
}
