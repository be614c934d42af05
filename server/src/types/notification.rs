//! Notifications delivered to a user's inbox.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{NotificationId, PostId};

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FriendRequest,
    FriendAccepted,
    Like,
    Comment,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FriendRequest => "friend_request",
            Self::FriendAccepted => "friend_accepted",
            Self::Like => "like",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: String,
    pub sender: Option<String>,
    pub kind: NotificationKind,
    /// Human-readable message.
    pub content: String,
    /// Post the notification refers to, for likes and comments.
    pub post_id: Option<PostId>,
    /// Logical creation time assigned by the store.
    pub created_at: i64,
    pub is_read: bool,
}

/// A notification that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient: String,
    pub sender: Option<String>,
    pub kind: NotificationKind,
    pub content: String,
    pub post_id: Option<PostId>,
}

impl NewNotification {
    /// `sender` asked `recipient` to be friends.
    #[must_use]
    pub fn friend_request(recipient: &str, sender: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
            sender: Some(sender.to_string()),
            kind: NotificationKind::FriendRequest,
            content: format!("{sender} sent you a friend request"),
            post_id: None,
        }
    }

    /// `sender` accepted the friend request `recipient` sent earlier.
    #[must_use]
    pub fn friend_accepted(recipient: &str, sender: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
            sender: Some(sender.to_string()),
            kind: NotificationKind::FriendAccepted,
            content: format!("{sender} accepted your friend request"),
            post_id: None,
        }
    }

    /// `sender` liked a post written by `recipient`.
    #[must_use]
    pub fn like(recipient: &str, sender: &str, post_id: PostId) -> Self {
        Self {
            recipient: recipient.to_string(),
            sender: Some(sender.to_string()),
            kind: NotificationKind::Like,
            content: format!("{sender} liked your post"),
            post_id: Some(post_id),
        }
    }

    /// `sender` commented on a post written by `recipient`.
    #[must_use]
    pub fn comment(recipient: &str, sender: &str, post_id: PostId) -> Self {
        Self {
            recipient: recipient.to_string(),
            sender: Some(sender.to_string()),
            kind: NotificationKind::Comment,
            content: format!("{sender} commented on your post"),
            post_id: Some(post_id),
        }
    }
}
