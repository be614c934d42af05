//! ID types for users, posts, comments and notifications.
//!
//! All identifiers are assigned by the row store. They are integers that
//! increase monotonically in insertion order, which is what lets a post id
//! act as a tie-break between posts created in the same second.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// A unique identifier for a post.
///
/// # Invariants
///
/// - Assigned by the store, never reused.
/// - A post created later always has a larger id than one created earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

/// A unique identifier for a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub i64);

/// A unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

macro_rules! impl_id_conversions {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<i64> for $name {
                fn from(raw: i64) -> Self {
                    Self(raw)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )*
    };
}

impl_id_conversions!(UserId, PostId, CommentId, NotificationId);
