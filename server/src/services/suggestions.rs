//! Mutual friends and friend suggestions.
//!
//! Friend sets here are rebuilt from the store on every call and never read
//! from the friend-graph cache.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::index::OrderedKeySet;
use crate::services::GraphError;
use crate::services::friend_graph::load_friend_set;
use crate::store::RowStore;

/// A suggested user and how many friends they share with the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub username: String,
    pub mutual_friends: usize,
}

pub struct FriendSuggestionService<S> {
    store: Arc<S>,
}

impl<S: RowStore> FriendSuggestionService<S> {
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Friends `a` and `b` have in common, ascending.
    pub fn mutual_friends(&self, a: &str, b: &str) -> Result<Vec<String>, GraphError> {
        let first = load_friend_set(&*self.store, a)?;
        let second = load_friend_set(&*self.store, b)?;
        Ok(first.intersection(&second))
    }

    /// Up to `max` users `username` is not yet friends with, ranked by the
    /// number of mutual friends (most first), then by username.
    ///
    /// Every other user is a candidate, including ones sharing no friends.
    pub fn suggest(&self, username: &str, max: usize) -> Result<Vec<Suggestion>, GraphError> {
        let own = load_friend_set(&*self.store, username)?;
        let excluded: HashSet<&str> = own.iter().chain([username]).collect();

        let mut suggestions = Vec::new();
        for candidate in self.store.fetch_all_usernames()? {
            if excluded.contains(candidate.as_str()) {
                continue;
            }
            let theirs: OrderedKeySet = load_friend_set(&*self.store, &candidate)?;
            suggestions.push(Suggestion {
                mutual_friends: own.common_count(&theirs),
                username: candidate,
            });
        }

        suggestions.sort_by(|a, b| {
            b.mutual_friends
                .cmp(&a.mutual_friends)
                .then_with(|| a.username.cmp(&b.username))
        });
        suggestions.truncate(max);
        tracing::debug!("{} suggestions for {username}", suggestions.len());
        Ok(suggestions)
    }
}
