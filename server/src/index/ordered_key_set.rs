//! Ordered set of usernames backed by the AVL tree.
//!
//! Used for per-user friend lists. Listing is always ascending
//! lexicographic, which also makes two sets cheap to intersect: both
//! `in_order()` sequences are sorted, so a single merge pass suffices.

use std::cmp::Ordering;

use crate::index::avl::AvlTree;

/// A set of strings kept in ascending order.
///
/// Redundant operations (inserting a present key, removing an absent one)
/// are silent no-ops. Nothing here can fail.
#[derive(Debug, Clone, Default)]
pub struct OrderedKeySet {
    tree: AvlTree<String, ()>,
}

impl OrderedKeySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.tree.contains_key(key) {
            return false;
        }
        self.tree.insert(key.to_string(), ());
        true
    }

    /// Remove `key`. Returns `false` if it was absent.
    pub fn remove(&mut self, key: &str) -> bool {
        self.tree.remove(key).is_some()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.tree.contains_key(key)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Borrowing ascending iterator.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.tree.iter().map(|(key, ())| key.as_str())
    }

    /// Every key, ascending. Materialized, so it can be called repeatedly.
    #[must_use]
    pub fn in_order(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    /// Every key in breadth-first tree order.
    #[must_use]
    pub fn level_order(&self) -> Vec<String> {
        self.tree.level_order().into_iter().cloned().collect()
    }

    /// Keys present in both sets, ascending. O(n + m).
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Vec<String> {
        let mut common = Vec::new();
        merge_common(self.iter(), other.iter(), |key| common.push(key.to_string()));
        common
    }

    /// Number of keys present in both sets. O(n + m), no allocation.
    #[must_use]
    pub fn common_count(&self, other: &Self) -> usize {
        let mut count = 0;
        merge_common(self.iter(), other.iter(), |_| count += 1);
        count
    }

    #[cfg(test)]
    pub(crate) fn validate(&self) -> Result<(), String> {
        self.tree.validate()
    }
}

impl<S: AsRef<str>> FromIterator<S> for OrderedKeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key.as_ref());
        }
        set
    }
}

/// Walk two ascending sequences in lockstep, calling `on_common` for every
/// key that appears in both.
fn merge_common<'a>(
    a: impl Iterator<Item = &'a str>,
    b: impl Iterator<Item = &'a str>,
    mut on_common: impl FnMut(&'a str),
) {
    let mut a = a.peekable();
    let mut b = b.peekable();
    while let (Some(&x), Some(&y)) = (a.peek(), b.peek()) {
        match x.cmp(y) {
            Ordering::Less => {
                a.next();
            }
            Ordering::Greater => {
                b.next();
            }
            Ordering::Equal => {
                on_common(x);
                a.next();
                b.next();
            }
        }
    }
}
