//! Self-balancing binary search tree (AVL) parameterized by a key order.
//!
//! This is the single rotation/rebalance implementation behind both the
//! friend-list set and the post ranking index. Each instantiation picks its
//! ordering through a zero-sized [`KeyOrder`] type.
//!
//! # Structure
//!
//! - Every node exclusively owns its children (`Option<Box<Node>>`), there
//!   are no parent pointers.
//! - Keys are unique under the tree's order. Inserting an equal key replaces
//!   the stored value and leaves the shape untouched.
//!
//! # Invariants
//!
//! - `node.height == 1 + max(height(left), height(right))`, with an empty
//!   subtree at height 0.
//! - `|height(left) - height(right)| <= 1` at every node.
//! - An in-order walk visits keys in strictly ascending order.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::marker::PhantomData;

/// A total order over keys of type `K`.
///
/// Implementors are usually zero-sized marker types so the order is fixed
/// at the type level and costs nothing at runtime.
pub trait KeyOrder<K: ?Sized> {
    fn compare(a: &K, b: &K) -> Ordering;
}

/// The key type's own `Ord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> KeyOrder<K> for NaturalOrder {
    fn compare(a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    height: i32,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    const fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

fn height<K, V>(link: &Link<K, V>) -> i32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

/// Restore the height field and the balance invariant at `node`, assuming
/// both subtrees already satisfy them.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update_height();
    let bf = node.balance_factor();

    if bf > 1 {
        // Left-right: straighten the left child first
        if node.left.as_ref().is_some_and(|l| l.balance_factor() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if bf < -1 {
        // Right-left: straighten the right child first
        if node.right.as_ref().is_some_and(|r| r.balance_factor() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

fn insert_node<K, V, O: KeyOrder<K>>(
    link: Link<K, V>,
    key: K,
    value: V,
) -> (Box<Node<K, V>>, Option<V>) {
    let Some(mut node) = link else {
        return (Box::new(Node::new(key, value)), None);
    };

    let replaced = match O::compare(&key, &node.key) {
        Ordering::Less => {
            let (child, replaced) = insert_node::<K, V, O>(node.left.take(), key, value);
            node.left = Some(child);
            replaced
        }
        Ordering::Greater => {
            let (child, replaced) = insert_node::<K, V, O>(node.right.take(), key, value);
            node.right = Some(child);
            replaced
        }
        Ordering::Equal => {
            let old = std::mem::replace(&mut node.value, value);
            return (node, Some(old));
        }
    };

    (rebalance(node), replaced)
}

/// Detach the minimum node of a non-empty subtree.
///
/// Returns the rebalanced remainder and the detached node (with both links
/// cleared).
fn take_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (rest, node)
        }
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn remove_node<K, V, O, Q>(link: Link<K, V>, key: &Q) -> (Link<K, V>, Option<(K, V)>)
where
    K: Borrow<Q>,
    O: KeyOrder<Q>,
    Q: ?Sized,
{
    let Some(mut node) = link else {
        return (None, None);
    };

    let removed = match O::compare(key, node.key.borrow()) {
        Ordering::Less => {
            let (child, removed) = remove_node::<K, V, O, Q>(node.left.take(), key);
            node.left = child;
            removed
        }
        Ordering::Greater => {
            let (child, removed) = remove_node::<K, V, O, Q>(node.right.take(), key);
            node.right = child;
            removed
        }
        Ordering::Equal => {
            let Node {
                key: removed_key,
                value: removed_value,
                left,
                right,
                ..
            } = *node;
            let replacement = match (left, right) {
                (None, None) => None,
                (Some(child), None) | (None, Some(child)) => Some(child),
                (Some(left), Some(right)) => {
                    // Two children: the in-order successor takes this slot
                    let (rest, mut successor) = take_min(right);
                    successor.left = Some(left);
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
            return (replacement, Some((removed_key, removed_value)));
        }
    };

    (Some(rebalance(node)), removed)
}

/// An AVL tree mapping `K` to `V`, ordered by `O`.
#[derive(Debug, Clone)]
pub struct AvlTree<K, V, O = NaturalOrder> {
    root: Link<K, V>,
    len: usize,
    order: PhantomData<fn() -> O>,
}

impl<K, V, O> Default for AvlTree<K, V, O> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
            order: PhantomData,
        }
    }
}

impl<K, V, O> AvlTree<K, V, O> {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; 0 when empty.
    #[must_use]
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Ascending iterator over `(key, value)` pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Descending iterator over `(key, value)` pairs.
    ///
    /// Lazy: taking the first `n` items touches `O(n + log len)` nodes.
    #[must_use]
    pub fn iter_rev(&self) -> RevIter<'_, K, V> {
        RevIter::new(self.root.as_deref(), self.len)
    }

    /// Keys in breadth-first order, root first.
    pub fn level_order(&self) -> Vec<&K> {
        let mut result = Vec::with_capacity(self.len);
        let mut queue: VecDeque<&Node<K, V>> = VecDeque::new();
        if let Some(root) = self.root.as_deref() {
            queue.push_back(root);
        }
        while let Some(node) = queue.pop_front() {
            result.push(&node.key);
            if let Some(left) = node.left.as_deref() {
                queue.push_back(left);
            }
            if let Some(right) = node.right.as_deref() {
                queue.push_back(right);
            }
        }
        result
    }
}

impl<K, V, O: KeyOrder<K>> AvlTree<K, V, O> {
    /// Insert `key` with `value`.
    ///
    /// If an equal key is already present its value is replaced and the old
    /// value returned; the key and the tree shape are left as they were.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, replaced) = insert_node::<K, V, O>(self.root.take(), key, value);
        self.root = Some(root);
        if replaced.is_none() {
            self.len += 1;
        }
        replaced
    }
}

impl<K, V, O> AvlTree<K, V, O> {
    /// Look up the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        O: KeyOrder<Q>,
        Q: ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match O::compare(key, node.key.borrow()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        O: KeyOrder<Q>,
        Q: ?Sized,
    {
        self.get(key).is_some()
    }

    /// Remove `key`, returning the stored entry. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        O: KeyOrder<Q>,
        Q: ?Sized,
    {
        let (root, removed) = remove_node::<K, V, O, Q>(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }
}

#[cfg(test)]
impl<K: std::fmt::Debug, V, O: KeyOrder<K>> AvlTree<K, V, O> {
    /// Check every structural invariant, describing the first violation.
    pub(crate) fn validate(&self) -> Result<(), String> {
        fn walk<K: std::fmt::Debug, V>(link: &Link<K, V>) -> Result<(i32, usize), String> {
            let Some(node) = link else {
                return Ok((0, 0));
            };
            let (lh, lc) = walk(&node.left)?;
            let (rh, rc) = walk(&node.right)?;
            let expected = 1 + lh.max(rh);
            if node.height != expected {
                return Err(format!(
                    "node {:?} has height {} but children imply {expected}",
                    node.key, node.height
                ));
            }
            if (lh - rh).abs() > 1 {
                return Err(format!(
                    "node {:?} is unbalanced: left {lh}, right {rh}",
                    node.key
                ));
            }
            Ok((expected, lc + rc + 1))
        }

        let (_, count) = walk(&self.root)?;
        if count != self.len {
            return Err(format!("len is {} but tree holds {count} nodes", self.len));
        }

        let mut previous: Option<&K> = None;
        for (key, _) in self.iter() {
            if let Some(prev) = previous {
                if O::compare(prev, key) != Ordering::Less {
                    return Err(format!("keys out of order: {prev:?} then {key:?}"));
                }
            }
            previous = Some(key);
        }
        Ok(())
    }
}

/// Ascending in-order iterator, driven by an explicit stack.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Descending (reverse in-order) iterator, driven by an explicit stack.
pub struct RevIter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> RevIter<'a, K, V> {
    fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_right_spine(root);
        iter
    }

    fn push_right_spine(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.right.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for RevIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_right_spine(node.left.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
