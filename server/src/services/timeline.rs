//! Timeline (feed) assembly.
//!
//! A timeline is rebuilt from scratch on every call: the user's recent posts
//! and each friend's recent posts are fetched from the store, ranked in a
//! fresh [`RankedPostIndex`], and the newest `limit` are returned. Nothing
//! is maintained incrementally, so a timeline always reflects the store as
//! of the call, at a cost of O(authors * cap * log(total)) per request.

use std::sync::Arc;

use crate::index::RankedPostIndex;
use crate::services::{FriendGraphService, GraphError};
use crate::store::{RowStore, StoreError};
use crate::types::PostRecord;

/// How many posts to pull per author when assembling a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Most recent posts fetched for the timeline's owner.
    pub self_cap: usize,
    /// Most recent posts fetched for each friend.
    pub friend_cap: usize,
}

impl TimelineConfig {
    pub const DEFAULT_SELF_CAP: usize = 50;
    pub const DEFAULT_FRIEND_CAP: usize = 20;
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            self_cap: Self::DEFAULT_SELF_CAP,
            friend_cap: Self::DEFAULT_FRIEND_CAP,
        }
    }
}

/// Error returned when a timeline cannot be assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// Resolving the user's friends failed.
    Graph(GraphError),
    /// Fetching posts failed.
    Store(StoreError),
}

impl std::fmt::Display for TimelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graph(e) => write!(f, "friend graph error: {e}"),
            Self::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for TimelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Graph(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<GraphError> for TimelineError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

impl From<StoreError> for TimelineError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Merges a user's posts with their friends' posts, newest first.
pub struct TimelineAssembler<S> {
    graph: Arc<FriendGraphService<S>>,
    config: TimelineConfig,
}

impl<S: RowStore> TimelineAssembler<S> {
    #[must_use]
    pub const fn new(graph: Arc<FriendGraphService<S>>, config: TimelineConfig) -> Self {
        Self { graph, config }
    }

    #[must_use]
    pub const fn config(&self) -> TimelineConfig {
        self.config
    }

    /// Up to `limit` posts by `username` and their friends, newest first.
    ///
    /// An unknown username yields an empty timeline.
    pub fn generate(&self, username: &str, limit: usize) -> Result<Vec<PostRecord>, TimelineError> {
        let store = self.graph.store();
        if !store.user_exists(username)? {
            tracing::debug!("timeline requested for unknown user {username}");
            return Ok(Vec::new());
        }

        let friends = self.graph.get_friends(username)?;

        let mut index = RankedPostIndex::new();
        for post in store.fetch_recent_posts(username, self.config.self_cap)? {
            index.insert(post);
        }
        for friend in &friends {
            for post in store.fetch_recent_posts(friend, self.config.friend_cap)? {
                index.insert(post);
            }
        }

        let timeline = index.top_n(limit);
        tracing::info!(
            "timeline for {username}: {} friends, {} candidate posts, {} returned",
            friends.len(),
            index.len(),
            timeline.len()
        );
        Ok(timeline)
    }
}
