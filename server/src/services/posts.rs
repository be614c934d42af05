//! Posts, likes and comments.
//!
//! Every call goes straight to the store. The like and comment counts on a
//! post are kept by the store, so the next timeline built after a like or a
//! comment carries the new counts without any index being updated here.
//!
//! Likes and comments notify the post's author on a best-effort basis, the
//! same way friend requests do. Acting on your own post notifies nobody.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::services::NotificationService;
use crate::store::{RowStore, StoreError};
use crate::types::{Comment, CommentId, LikeToggle, NewNotification, PostId, PostRecord};

/// Seconds since the Unix epoch.
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

pub struct PostService<S> {
    store: Arc<S>,
    notifications: NotificationService<S>,
    clock: fn() -> i64,
}

impl<S: RowStore> PostService<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, unix_now)
    }

    /// Stamp new posts and comments with `clock` instead of wall time.
    #[must_use]
    pub fn with_clock(store: Arc<S>, clock: fn() -> i64) -> Self {
        Self {
            notifications: NotificationService::new(Arc::clone(&store)),
            store,
            clock,
        }
    }

    /// Publish a post. Returns `None` for blank content or an unknown
    /// author.
    pub fn create_post(&self, author: &str, content: &str) -> Result<Option<PostId>, StoreError> {
        if content.trim().is_empty() {
            tracing::debug!("refused blank post from {author}");
            return Ok(None);
        }
        let id = self.store.insert_post(author, content, (self.clock)())?;
        if let Some(id) = id {
            tracing::info!("post {id} created by {author}");
        }
        Ok(id)
    }

    pub fn post(&self, id: PostId) -> Result<Option<PostRecord>, StoreError> {
        self.store.fetch_post(id)
    }

    /// Like `post` as `username`, or take an earlier like back. Returns
    /// `None` if the post or the user does not exist.
    pub fn toggle_like(
        &self,
        post: PostId,
        username: &str,
    ) -> Result<Option<LikeToggle>, StoreError> {
        let Some(toggle) = self.store.toggle_like(post, username)? else {
            return Ok(None);
        };
        tracing::debug!("post {post} {toggle:?} by {username}");
        if toggle.is_liked() {
            self.notify_author(post, username, NewNotification::like);
        }
        Ok(Some(toggle))
    }

    pub fn is_liked(&self, post: PostId, username: &str) -> Result<bool, StoreError> {
        self.store.fetch_is_liked(post, username)
    }

    /// Comment on `post`. Returns `None` for blank content, an unknown post
    /// or an unknown author.
    pub fn add_comment(
        &self,
        post: PostId,
        author: &str,
        content: &str,
    ) -> Result<Option<CommentId>, StoreError> {
        if content.trim().is_empty() {
            return Ok(None);
        }
        let id = self
            .store
            .insert_comment(post, author, content, (self.clock)())?;
        if id.is_some() {
            tracing::info!("comment on post {post} by {author}");
            self.notify_author(post, author, NewNotification::comment);
        }
        Ok(id)
    }

    /// Comments on `post`, oldest first.
    pub fn comments(&self, post: PostId) -> Result<Vec<Comment>, StoreError> {
        self.store.fetch_comments(post)
    }

    /// Tell the author of `post` that `actor` acted on it.
    ///
    /// The like or comment is already committed, so a failed lookup is
    /// logged and dropped like a failed notification.
    fn notify_author(
        &self,
        post: PostId,
        actor: &str,
        build: fn(&str, &str, PostId) -> NewNotification,
    ) {
        match self.store.fetch_post(post) {
            Ok(Some(record)) if record.author != actor => {
                self.notifications
                    .notify_best_effort(build(&record.author, actor, post));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("no notification for post {post}: {e}"),
        }
    }
}
