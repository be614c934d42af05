//! Friend-request lifecycle and cached friend lists.
//!
//! # Consistency
//!
//! The row store owns every edge. The per-user [`OrderedKeySet`]s kept here
//! are a cache of each user's accepted friends and follow two rules:
//!
//! 1. Every mutation writes the store first. The cache is touched only after
//!    the store write succeeded, and never when it failed. The cache can lag
//!    behind the store but is never ahead of it.
//! 2. Every mutation holds the cache write lock from before the store write
//!    until after the cache update, so two mutations (or a mutation and a
//!    lazy load) can never interleave between those two steps.
//!
//! Sets are loaded lazily on first read and kept for the service's lifetime.
//! Accepting a request creates both users' sets if they are missing: they
//! are loaded from the store before the edge is written and cached only once
//! the write succeeds. Removing a friend updates only sets that are already
//! cached, since an uncached set loaded later never contains the edge.
//!
//! Pending edges are never cached. Only accepted edges are friendships.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::index::OrderedKeySet;
use crate::services::NotificationService;
use crate::store::{RowStore, StoreError};
use crate::types::{EdgeStatus, NewNotification};

type FriendCache = HashMap<String, OrderedKeySet>;

/// Error returned by friend-graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The row store failed; no cached set was changed.
    Store(StoreError),
    /// The friend-set cache lock was poisoned.
    LockPoisoned,
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::LockPoisoned => write!(f, "friend cache lock poisoned"),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::LockPoisoned => None,
        }
    }
}

impl From<StoreError> for GraphError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Build a friend set for `username` straight from the store.
pub(crate) fn load_friend_set<S: RowStore + ?Sized>(
    store: &S,
    username: &str,
) -> Result<OrderedKeySet, StoreError> {
    Ok(store
        .fetch_accepted_friend_usernames(username)?
        .into_iter()
        .collect())
}

/// Friend-request lifecycle over a row store, with cached friend lists.
///
/// Validation failures (self-requests, duplicates, missing edges) return
/// `Ok(false)`. Store failures return `Err` and leave the cache untouched.
pub struct FriendGraphService<S> {
    store: Arc<S>,
    cache: RwLock<FriendCache>,
    notifications: NotificationService<S>,
}

impl<S: RowStore> FriendGraphService<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            notifications: NotificationService::new(Arc::clone(&store)),
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Store a pending request `from -> to`.
    ///
    /// Refused when `from == to`, when the two are already friends, or when
    /// a pending request exists in either direction. On success the
    /// addressee is notified.
    pub fn send_request(&self, from: &str, to: &str) -> Result<bool, GraphError> {
        if from == to {
            tracing::debug!("refused self friend request from {from}");
            return Ok(false);
        }

        let sent = {
            let _cache = self.lock_cache()?;
            if self.store.fetch_is_friend(from, to)?
                || self.store.fetch_pending_request(from, to)?
                || self.store.fetch_pending_request(to, from)?
            {
                tracing::debug!("refused friend request {from} -> {to}: already related");
                return Ok(false);
            }
            self.store.insert_pending_edge(from, to)?
        };

        if sent {
            tracing::info!("friend request sent {from} -> {to}");
            self.notifications
                .notify_best_effort(NewNotification::friend_request(to, from));
        }
        Ok(sent)
    }

    /// Accept the pending request `from -> to`, where `from` sent it.
    ///
    /// On success both users' sets are cached and gain the other, and the
    /// requester is notified.
    pub fn accept_request(&self, from: &str, to: &str) -> Result<bool, GraphError> {
        let accepted = {
            let mut cache = self.lock_cache()?;
            let mut loaded: Vec<(&str, OrderedKeySet)> = Vec::new();
            for user in [from, to] {
                if !cache.contains_key(user) && loaded.iter().all(|(u, _)| *u != user) {
                    loaded.push((user, load_friend_set(&*self.store, user)?));
                }
            }
            let accepted = self
                .store
                .update_edge_status(from, to, EdgeStatus::Accepted)?;
            if accepted {
                for (user, set) in loaded {
                    cache.insert(user.to_string(), set);
                }
                for (user, friend) in [(from, to), (to, from)] {
                    if let Some(set) = cache.get_mut(user) {
                        set.insert(friend);
                    }
                }
            }
            accepted
        };

        if accepted {
            tracing::info!("friend request accepted {from} -> {to}");
            self.notifications
                .notify_best_effort(NewNotification::friend_accepted(from, to));
        } else {
            tracing::debug!("no pending request {from} -> {to} to accept");
        }
        Ok(accepted)
    }

    /// Delete the pending request `from -> to`, where `from` sent it.
    pub fn reject_request(&self, from: &str, to: &str) -> Result<bool, GraphError> {
        let _cache = self.lock_cache()?;
        let removed = self.store.delete_edge(from, to, EdgeStatus::Pending)?;
        if removed {
            tracing::info!("friend request removed {from} -> {to}");
        }
        Ok(removed)
    }

    /// Withdraw the pending request `from -> to`. Same effect as
    /// [`Self::reject_request`], seen from the requester's side.
    pub fn cancel_request(&self, from: &str, to: &str) -> Result<bool, GraphError> {
        self.reject_request(from, to)
    }

    /// End the friendship between `user` and `friend`.
    pub fn remove_friend(&self, user: &str, friend: &str) -> Result<bool, GraphError> {
        let mut cache = self.lock_cache()?;
        let removed = self.store.delete_edge(user, friend, EdgeStatus::Accepted)?;
        if removed {
            for (a, b) in [(user, friend), (friend, user)] {
                if let Some(set) = cache.get_mut(a) {
                    set.remove(b);
                }
            }
            tracing::info!("friendship removed {user} <-> {friend}");
        }
        Ok(removed)
    }

    /// Friends of `username`, ascending. Loads the set on first access.
    pub fn get_friends(&self, username: &str) -> Result<Vec<String>, GraphError> {
        self.with_friend_set(username, OrderedKeySet::in_order)
    }

    pub fn are_friends(&self, a: &str, b: &str) -> Result<bool, GraphError> {
        self.with_friend_set(a, |set| set.contains(b))
    }

    /// Requesters of pending requests addressed to `username`, newest first.
    /// Read from the store on every call.
    pub fn pending_requests(&self, username: &str) -> Result<Vec<String>, GraphError> {
        Ok(self.store.fetch_incoming_requests(username)?)
    }

    /// Reload `username`'s set from the store, replacing any cached copy.
    pub fn preload(&self, username: &str) -> Result<(), GraphError> {
        let mut cache = self.lock_cache()?;
        let set = load_friend_set(&*self.store, username)?;
        tracing::debug!("preloaded {} friends for {username}", set.len());
        cache.insert(username.to_string(), set);
        Ok(())
    }

    /// Drop `username`'s cached set. Returns `false` if it was not cached.
    pub fn evict(&self, username: &str) -> Result<bool, GraphError> {
        Ok(self.lock_cache()?.remove(username).is_some())
    }

    pub fn clear_cache(&self) -> Result<(), GraphError> {
        self.lock_cache()?.clear();
        Ok(())
    }

    /// The cached set of `username`, ascending, without loading it.
    pub fn cached_friends(&self, username: &str) -> Result<Option<Vec<String>>, GraphError> {
        let cache = self.cache.read().map_err(|_| GraphError::LockPoisoned)?;
        Ok(cache.get(username).map(OrderedKeySet::in_order))
    }

    /// Usernames that currently have a cached set.
    pub fn cached_users(&self) -> Result<Vec<String>, GraphError> {
        let cache = self.cache.read().map_err(|_| GraphError::LockPoisoned)?;
        let mut users: Vec<String> = cache.keys().cloned().collect();
        users.sort();
        Ok(users)
    }

    /// Run `f` against `username`'s set, loading it first if needed.
    fn with_friend_set<R>(
        &self,
        username: &str,
        f: impl FnOnce(&OrderedKeySet) -> R,
    ) -> Result<R, GraphError> {
        {
            let cache = self.cache.read().map_err(|_| GraphError::LockPoisoned)?;
            if let Some(set) = cache.get(username) {
                return Ok(f(set));
            }
        }

        // Load under the write lock so no mutation can commit between the
        // store read and the cache insert.
        let mut cache = self.lock_cache()?;
        if let Some(set) = cache.get(username) {
            return Ok(f(set));
        }
        let set = load_friend_set(&*self.store, username)?;
        tracing::debug!("loaded {} friends for {username}", set.len());
        let result = f(&set);
        cache.insert(username.to_string(), set);
        Ok(result)
    }

    fn lock_cache(&self) -> Result<RwLockWriteGuard<'_, FriendCache>, GraphError> {
        self.cache.write().map_err(|_| GraphError::LockPoisoned)
    }
}
