//! User profiles and search results.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Public profile fields of an account, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub profile_pic: String,
    pub bio: String,
    /// Account creation time in seconds since the Unix epoch.
    pub created_at: i64,
}

impl UserProfile {
    /// Create a profile with only the id and username set.
    #[must_use]
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Self::default()
        }
    }
}

/// A user as returned by search, annotated relative to a viewing user.
///
/// `is_friend` and `has_pending_request` are never stored. They are
/// recomputed for every request against the current viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_friend: bool,
    pub has_pending_request: bool,
}

impl SearchUser {
    #[must_use]
    pub fn username(&self) -> &str {
        &self.profile.username
    }
}

impl From<UserProfile> for SearchUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            profile,
            is_friend: false,
            has_pending_request: false,
        }
    }
}
