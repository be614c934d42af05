//! Case-insensitive username index for prefix search.
//!
//! A plain binary search tree keyed by the lowercased username. It is NOT
//! self-balancing: inserting users in sorted order produces a linked list,
//! and every operation degrades to O(n). That is acceptable for the sizes
//! it is used at, but it means traversals must be iterative so a
//! degenerate tree cannot overflow the stack.
//!
//! The index is only ever refreshed wholesale through [`PrefixIndex::rebuild`].
//! Between rebuilds it is a snapshot and may be stale.

use std::cmp::Ordering;

use crate::types::UserProfile;

#[derive(Debug)]
struct Node {
    /// Lowercased username, the ordering key.
    folded: String,
    user: UserProfile,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn new(folded: String, user: UserProfile) -> Self {
        Self {
            folded,
            user,
            left: None,
            right: None,
        }
    }
}

fn fold(username: &str) -> String {
    username.to_lowercase()
}

/// Unbalanced BST of users ordered by case-folded username.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    root: Option<Box<Node>>,
    len: usize,
}

impl PrefixIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `user`. Returns `false` if a user whose username folds to the
    /// same key is already indexed; the first one wins.
    pub fn insert(&mut self, user: UserProfile) -> bool {
        let folded = fold(&user.username);
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match folded.cmp(&node.folded) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return false,
            };
        }
        *slot = Some(Box::new(Node::new(folded, user)));
        self.len += 1;
        true
    }

    /// Replace the whole index with `users`.
    pub fn rebuild(&mut self, users: impl IntoIterator<Item = UserProfile>) {
        self.clear();
        for user in users {
            self.insert(user);
        }
    }

    /// Users whose username starts with `prefix`, ignoring case, ascending
    /// by folded username. An empty prefix returns every user.
    #[must_use]
    pub fn search_by_prefix(&self, prefix: &str) -> Vec<UserProfile> {
        if prefix.is_empty() {
            return self.get_all_users();
        }
        let prefix = fold(prefix);
        let mut found = Vec::new();
        self.walk_in_order(
            |node| may_match_left(&prefix, &node.folded),
            |node| may_match_right(&prefix, &node.folded),
            |node| {
                if node.folded.starts_with(prefix.as_str()) {
                    found.push(node.user.clone());
                }
            },
        );
        found
    }

    /// Every user, ascending by folded username.
    #[must_use]
    pub fn get_all_users(&self) -> Vec<UserProfile> {
        let mut all = Vec::with_capacity(self.len);
        self.walk_in_order(|_| true, |_| true, |node| all.push(node.user.clone()));
        all
    }

    pub fn clear(&mut self) {
        // Unlink iteratively; the default recursive drop could overflow on a
        // degenerate tree.
        let mut pending: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
        self.len = 0;
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree. Equals `len()` when users were inserted in sorted
    /// order.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<&Node> = self.root.as_deref().into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|node| [node.left.as_deref(), node.right.as_deref()])
                .flatten()
                .collect();
        }
        height
    }

    /// Iterative in-order walk. `go_left` / `go_right` decide per node
    /// whether its subtrees are worth descending into.
    fn walk_in_order<'a>(
        &'a self,
        go_left: impl Fn(&Node) -> bool,
        go_right: impl Fn(&Node) -> bool,
        mut visit: impl FnMut(&'a Node),
    ) {
        let mut stack: Vec<&'a Node> = Vec::new();
        let mut current = self.root.as_deref();
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = if go_left(node) { node.left.as_deref() } else { None };
            }
            let Some(node) = stack.pop() else {
                break;
            };
            visit(node);
            current = if go_right(node) { node.right.as_deref() } else { None };
        }
    }
}

impl Drop for PrefixIndex {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Keys left of `folded` are smaller. The smallest string carrying `prefix`
/// is `prefix` itself, so the left side can only match if `prefix <= folded`.
fn may_match_left(prefix: &str, folded: &str) -> bool {
    prefix <= folded
}

/// Keys right of `folded` are larger. Some string carrying `prefix` is larger
/// than `folded` unless `folded` already sorts after every such string, which
/// happens exactly when its first `prefix.len()` bytes exceed `prefix`.
fn may_match_right(prefix: &str, folded: &str) -> bool {
    let folded = folded.as_bytes();
    let head = &folded[..folded.len().min(prefix.len())];
    prefix.as_bytes() >= head
}
