//! Recency-ranked index of posts.
//!
//! Posts are keyed by the composite `(created_at, id)`: newer posts rank
//! higher, and posts created in the same second are ranked by id, larger
//! first. The tree stores the key ascending, so "newest first" is a reverse
//! in-order walk.
//!
//! Identity is the post id alone. A side table maps each id to its current
//! composite key so that `remove`/`search` by id can locate the exact tree
//! key, including when several posts share a timestamp.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::index::avl::{AvlTree, KeyOrder};
use crate::types::{PostId, PostRecord};

/// Composite ranking key of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostKey {
    pub created_at: i64,
    pub id: PostId,
}

impl PostKey {
    #[must_use]
    pub const fn of(post: &PostRecord) -> Self {
        Self {
            created_at: post.created_at,
            id: post.id,
        }
    }
}

/// Timestamp first; the id only breaks ties between equal timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecencyOrder;

impl KeyOrder<PostKey> for RecencyOrder {
    fn compare(a: &PostKey, b: &PostKey) -> Ordering {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Posts ranked by `(created_at desc, id desc)`.
#[derive(Debug, Clone, Default)]
pub struct RankedPostIndex {
    tree: AvlTree<PostKey, PostRecord, RecencyOrder>,
    keys: HashMap<PostId, PostKey>,
}

impl RankedPostIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `post`, or update the stored copy if its id is already indexed.
    ///
    /// An update with an unchanged timestamp replaces the payload in place.
    /// If the timestamp changed, the post is moved to its new rank. Returns
    /// the previous copy on update.
    pub fn insert(&mut self, post: PostRecord) -> Option<PostRecord> {
        let key = PostKey::of(&post);
        match self.keys.insert(post.id, key) {
            Some(previous) if previous == key => self.tree.insert(key, post),
            Some(previous) => {
                let old = self.tree.remove(&previous).map(|(_, old)| old);
                self.tree.insert(key, post);
                old
            }
            None => self.tree.insert(key, post),
        }
    }

    /// Remove the post with `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: PostId) -> Option<PostRecord> {
        let key = self.keys.remove(&id)?;
        self.tree.remove(&key).map(|(_, post)| post)
    }

    /// Whether a post with `id` is indexed.
    #[must_use]
    pub fn search(&self, id: PostId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: PostId) -> Option<&PostRecord> {
        let key = self.keys.get(&id)?;
        self.tree.get(key)
    }

    /// Up to `limit` posts, newest first.
    ///
    /// Walks the tree right to left and stops as soon as `limit` posts have
    /// been collected.
    #[must_use]
    pub fn top_n(&self, limit: usize) -> Vec<PostRecord> {
        self.newest_first().take(limit).cloned().collect()
    }

    /// Up to `limit` posts written by `author`, newest first.
    ///
    /// Collects every matching post in ascending order first, then sorts the
    /// collection by timestamp descending and truncates. Posts sharing a
    /// timestamp keep their ascending id order (the sort is stable).
    #[must_use]
    pub fn posts_by_user(&self, author: &str, limit: usize) -> Vec<PostRecord> {
        let mut posts: Vec<PostRecord> = self
            .tree
            .iter()
            .filter(|(_, post)| post.author == author)
            .map(|(_, post)| post.clone())
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        posts
    }

    /// Borrowing iterator, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &PostRecord> + '_ {
        self.tree.iter_rev().map(|(_, post)| post)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.keys.clear();
    }

    /// Number of distinct posts indexed.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn validate(&self) -> Result<(), String> {
        self.tree.validate()?;
        if self.keys.len() != self.tree.len() {
            return Err(format!(
                "{} ids tracked but {} posts indexed",
                self.keys.len(),
                self.tree.len()
            ));
        }
        for (id, key) in &self.keys {
            match self.tree.get(key) {
                Some(post) if post.id == *id => {}
                _ => return Err(format!("id {id} does not resolve to its post")),
            }
        }
        Ok(())
    }
}
