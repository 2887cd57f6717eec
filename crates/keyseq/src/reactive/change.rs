#![forbid(unsafe_code)]

//! Description of a single structural change.

use std::fmt;
use std::ops::Range;

/// What a mutation did to the affected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// `count` elements now occupy `start..start + count`; later elements
    /// shifted back by `count`.
    Inserted,
    /// `count` elements that occupied `start..start + count` are gone; later
    /// elements shifted forward by `count`.
    Removed,
    /// The elements at `start..start + count` were replaced in place.
    Replaced,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inserted => "inserted",
            Self::Removed => "removed",
            Self::Replaced => "replaced",
        })
    }
}

/// A `(kind, start, count)` notification payload.
///
/// Indices refer to the sequence as it is when the notification is
/// delivered, i.e. right after the mutation. For [`ChangeKind::Removed`]
/// they refer to the positions the removed elements held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListChange {
    pub kind: ChangeKind,
    pub start: usize,
    pub count: usize,
}

impl ListChange {
    #[must_use]
    pub const fn inserted(start: usize, count: usize) -> Self {
        Self {
            kind: ChangeKind::Inserted,
            start,
            count,
        }
    }

    #[must_use]
    pub const fn removed(start: usize, count: usize) -> Self {
        Self {
            kind: ChangeKind::Removed,
            start,
            count,
        }
    }

    #[must_use]
    pub const fn replaced(start: usize, count: usize) -> Self {
        Self {
            kind: ChangeKind::Replaced,
            start,
            count,
        }
    }

    /// Affected index range, `start..start + count`.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }
}

impl fmt::Display for ListChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}..{}", self.kind, self.start, self.start + self.count)
    }
}
