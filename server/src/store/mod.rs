//! Row-store collaborator.
//!
//! The relational store is external to this crate. Services reach it only
//! through [`RowStore`], a small set of row-level accessors. Every call is
//! synchronous and may fail; failures are reported as [`StoreError`] and
//! never retried here.
//!
//! [`MemoryStore`] is the in-process implementation used by tests, the
//! simulation harness and the demo binary.

mod memory;

pub use memory::{FaultConfig, MemoryStore, MemoryStoreStats};

use crate::types::{
    Comment, CommentId, EdgeStatus, LikeToggle, NewNotification, Notification, NotificationId,
    PostId, PostRecord, UserId, UserProfile,
};

/// Error returned by row-store calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the call.
    Unavailable(String),
    /// Injected fault for simulation.
    InjectedFault(String),
    /// A lock guarding store state was poisoned by a panicking writer.
    LockPoisoned,
    /// A referenced row does not exist.
    NotFound(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            Self::InjectedFault(msg) => write!(f, "injected fault: {msg}"),
            Self::LockPoisoned => write!(f, "store lock poisoned"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Row-level access to users, friend edges, posts, likes, comments and
/// notifications.
///
/// Usernames are the identity used across the friend graph. Implementations
/// must be safe to share between request handlers.
pub trait RowStore: Send + Sync {
    /// Register a new account. Returns `None` if the username is taken.
    fn insert_user(&self, username: &str, email: &str) -> Result<Option<UserId>, StoreError>;

    fn user_exists(&self, username: &str) -> Result<bool, StoreError>;

    /// Every account, in no particular order.
    fn fetch_all_users(&self) -> Result<Vec<UserProfile>, StoreError>;

    fn fetch_all_usernames(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .fetch_all_users()?
            .into_iter()
            .map(|user| user.username)
            .collect())
    }

    /// Usernames sharing an accepted edge with `username`, either direction.
    fn fetch_accepted_friend_usernames(&self, username: &str) -> Result<Vec<String>, StoreError>;

    /// Whether a pending edge `from -> to` exists. Direction matters.
    fn fetch_pending_request(&self, from: &str, to: &str) -> Result<bool, StoreError>;

    /// Requesters of pending edges addressed to `username`, newest first.
    fn fetch_incoming_requests(&self, username: &str) -> Result<Vec<String>, StoreError>;

    /// Whether an accepted edge joins `a` and `b`, either direction.
    fn fetch_is_friend(&self, a: &str, b: &str) -> Result<bool, StoreError>;

    /// Store a new pending edge `from -> to`. Returns `false` if nothing was
    /// written.
    fn insert_pending_edge(&self, from: &str, to: &str) -> Result<bool, StoreError>;

    /// Move the pending edge `from -> to` to `status`. Returns `false` if no
    /// such pending edge exists.
    fn update_edge_status(&self, from: &str, to: &str, status: EdgeStatus)
    -> Result<bool, StoreError>;

    /// Delete the edge between `from` and `to` with the given status.
    ///
    /// Pending edges match only in the `from -> to` direction; accepted and
    /// declined edges match either way. Returns `false` if nothing matched.
    fn delete_edge(&self, from: &str, to: &str, status: EdgeStatus) -> Result<bool, StoreError>;

    /// Store a post by `author`. Returns `None` if `author` is not
    /// registered.
    fn insert_post(
        &self,
        author: &str,
        content: &str,
        created_at: i64,
    ) -> Result<Option<PostId>, StoreError>;

    fn fetch_post(&self, id: PostId) -> Result<Option<PostRecord>, StoreError>;

    /// Up to `limit` posts by `author`, newest first, with their current
    /// like and comment counts.
    fn fetch_recent_posts(&self, author: &str, limit: usize)
    -> Result<Vec<PostRecord>, StoreError>;

    /// Like `post` as `username`, or take the like back if it exists. The
    /// post's like count follows. Returns `None` if the post or the user
    /// does not exist.
    fn toggle_like(&self, post: PostId, username: &str) -> Result<Option<LikeToggle>, StoreError>;

    fn fetch_is_liked(&self, post: PostId, username: &str) -> Result<bool, StoreError>;

    /// Store a comment and bump the post's comment count. Returns `None` if
    /// the post or the author does not exist.
    fn insert_comment(
        &self,
        post: PostId,
        author: &str,
        content: &str,
        created_at: i64,
    ) -> Result<Option<CommentId>, StoreError>;

    /// Comments on `post`, oldest first.
    fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>, StoreError>;

    fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationId, StoreError>;

    /// Up to `limit` notifications for `recipient`, newest first.
    fn fetch_notifications(
        &self,
        recipient: &str,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Returns `false` if the notification does not exist.
    fn mark_notification_read(&self, id: NotificationId) -> Result<bool, StoreError>;

    /// Returns how many notifications changed state.
    fn mark_all_notifications_read(&self, recipient: &str) -> Result<usize, StoreError>;

    fn unread_notification_count(&self, recipient: &str) -> Result<usize, StoreError>;

    /// Returns `false` if the notification does not exist.
    fn delete_notification(&self, id: NotificationId) -> Result<bool, StoreError>;
}
