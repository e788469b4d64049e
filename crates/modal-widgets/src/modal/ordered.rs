#![forbid(unsafe_code)]

//! Insertion-ordered stack of open dialogs.
//!
//! `OrderedStack` keeps dialogs in the order they were opened, compares them
//! by handle identity, and tracks how many of them want a backdrop so the
//! controller can decide in O(1) whether the shared backdrop should exist.
//!
//! # Invariants
//!
//! - Stacking order is strictly increasing: later entries are always on top.
//! - `backdrop_count()` equals the number of entries whose
//!   [`StackEntry::wants_backdrop`] is true.
//! - `remove` scans from the top, so the most recently added copy of a
//!   duplicated handle is the one removed.
//!
//! # Failure Modes
//!
//! - `remove_top()` on an empty stack returns `None` (no panic).
//! - `remove()` of an absent entry returns `None` and changes nothing.

use std::rc::Rc;

/// Something that can sit on an [`OrderedStack`].
pub trait StackEntry {
    /// Whether this entry contributes to the shared backdrop.
    fn wants_backdrop(&self) -> bool;
}

/// Ordered collection of shared entries keyed by identity.
#[derive(Debug)]
pub struct OrderedStack<T> {
    entries: Vec<Rc<T>>,
    backdrops: usize,
}

impl<T> Default for OrderedStack<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            backdrops: 0,
        }
    }
}

impl<T: StackEntry> OrderedStack<T> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `entry` on top.
    pub fn add(&mut self, entry: Rc<T>) {
        if entry.wants_backdrop() {
            self.backdrops += 1;
        }
        self.entries.push(entry);
    }

    /// Find `entry` by identity.
    pub fn get(&self, entry: &Rc<T>) -> Option<&Rc<T>> {
        self.entries.iter().rev().find(|e| Rc::ptr_eq(e, entry))
    }

    pub fn contains(&self, entry: &Rc<T>) -> bool {
        self.get(entry).is_some()
    }

    /// Most recently added entry.
    pub fn top(&self) -> Option<&Rc<T>> {
        self.entries.last()
    }

    /// Remove `entry` from wherever it sits, scanning from the top.
    pub fn remove(&mut self, entry: &Rc<T>) -> Option<Rc<T>> {
        let idx = self.entries.iter().rposition(|e| Rc::ptr_eq(e, entry))?;
        Some(self.take_at(idx))
    }

    /// Remove and return the top entry.
    pub fn remove_top(&mut self) -> Option<Rc<T>> {
        let idx = self.entries.len().checked_sub(1)?;
        Some(self.take_at(idx))
    }

    fn take_at(&mut self, idx: usize) -> Rc<T> {
        let removed = self.entries.remove(idx);
        if removed.wants_backdrop() {
            self.backdrops -= 1;
        }
        removed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that want a backdrop.
    #[inline]
    pub fn backdrop_count(&self) -> usize {
        self.backdrops
    }

    /// Entries from bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Rc<T>> {
        self.entries.iter()
    }
}
