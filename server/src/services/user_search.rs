//! Username search.
//!
//! The [`PrefixIndex`] is filled from the store when the service is built and
//! again on every [`UserSearchService::refresh`]. Accounts created with
//! [`UserSearchService::register`] in between are not searchable until the
//! next refresh. The per-viewer flags on each
//! result are always read fresh from the store.

use std::sync::{Arc, RwLock};

use crate::index::PrefixIndex;
use crate::services::GraphError;
use crate::store::RowStore;
use crate::types::{SearchUser, UserId, UserProfile};

pub struct UserSearchService<S> {
    store: Arc<S>,
    index: RwLock<PrefixIndex>,
}

impl<S: RowStore> UserSearchService<S> {
    /// Build the service, loading every user into the index.
    pub fn new(store: Arc<S>) -> Result<Self, GraphError> {
        let service = Self {
            store,
            index: RwLock::new(PrefixIndex::new()),
        };
        service.refresh()?;
        Ok(service)
    }

    /// Rebuild the index from the store. Returns the number of users indexed.
    ///
    /// On a store failure the previous index is kept.
    pub fn refresh(&self) -> Result<usize, GraphError> {
        let users = self.store.fetch_all_users()?;
        let mut index = self.index.write().map_err(|_| GraphError::LockPoisoned)?;
        index.rebuild(users);
        tracing::info!("user search index rebuilt with {} users", index.len());
        Ok(index.len())
    }

    /// Create an account. Returns `None` for a blank or taken username.
    ///
    /// The index is left alone; the account shows up in search after the
    /// next [`Self::refresh`].
    pub fn register(&self, username: &str, email: &str) -> Result<Option<UserId>, GraphError> {
        if username.trim().is_empty() {
            return Ok(None);
        }
        let id = self.store.insert_user(username, email)?;
        match id {
            Some(id) => tracing::info!("registered user {username} as {id}"),
            None => tracing::debug!("username {username} is taken"),
        }
        Ok(id)
    }

    /// Users whose name starts with `prefix` (ignoring case), ascending,
    /// excluding `viewer`, annotated relative to `viewer`.
    pub fn search(
        &self,
        prefix: &str,
        viewer: &str,
        limit: usize,
    ) -> Result<Vec<SearchUser>, GraphError> {
        let matches: Vec<UserProfile> = {
            let index = self.index.read().map_err(|_| GraphError::LockPoisoned)?;
            index
                .search_by_prefix(prefix)
                .into_iter()
                .filter(|user| user.username != viewer)
                .take(limit)
                .collect()
        };

        let mut results = Vec::with_capacity(matches.len());
        for profile in matches {
            let other = profile.username.as_str();
            let is_friend = self.store.fetch_is_friend(viewer, other)?;
            let has_pending_request = self.store.fetch_pending_request(viewer, other)?
                || self.store.fetch_pending_request(other, viewer)?;
            results.push(SearchUser {
                profile,
                is_friend,
                has_pending_request,
            });
        }
        tracing::debug!("search {prefix:?} by {viewer}: {} results", results.len());
        Ok(results)
    }

    /// Every user except `viewer`, ascending, annotated relative to `viewer`.
    pub fn all_users(&self, viewer: &str, limit: usize) -> Result<Vec<SearchUser>, GraphError> {
        self.search("", viewer, limit)
    }
}
