//! Posts, comments and likes.

use serde::{Deserialize, Serialize};

use crate::types::{CommentId, PostId};

/// A post, copied out of the row store.
///
/// The store holds the authoritative record; indexes hold value copies.
/// For indexing purposes two records are the same post when their `id`
/// matches, regardless of payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Store-assigned identifier, also the recency tie-break.
    pub id: PostId,
    /// Username of the author.
    pub author: String,
    /// Body text.
    pub content: String,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: i64,
    /// Number of likes at fetch time.
    pub like_count: u32,
    /// Number of comments at fetch time.
    pub comment_count: u32,
}

impl PostRecord {
    /// Create a post with zero likes and comments.
    #[must_use]
    pub fn new(
        id: impl Into<PostId>,
        author: impl Into<String>,
        content: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            content: content.into(),
            created_at,
            like_count: 0,
            comment_count: 0,
        }
    }
}

/// A comment on a post. Comments are listed oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    /// Username of the commenter.
    pub author: String,
    pub content: String,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: i64,
}

/// Outcome of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeToggle {
    /// The post was not liked by the user and now is.
    Liked,
    /// The user's like was removed.
    Unliked,
}

impl LikeToggle {
    #[must_use]
    pub const fn is_liked(self) -> bool {
        matches!(self, Self::Liked)
    }
}
