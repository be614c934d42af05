//! Friend edges between two accounts.
//!
//! # Lifecycle
//!
//! 1. `send_request` stores a `Pending` edge, directed requester -> addressee
//! 2. `accept_request` flips it to `Accepted`; from then on the edge is
//!    treated as undirected
//! 3. `reject_request` / `cancel_request` delete a pending edge,
//!    `remove_friend` deletes an accepted one
//!
//! `Declined` edges may exist in the store. They neither count as a
//! friendship nor block a new request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status of a friend edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
    Pending,
    Accepted,
    Declined,
}

impl EdgeStatus {
    /// Storage representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Whether an edge with this status is directional.
    ///
    /// Only pending edges have a meaningful direction.
    #[must_use]
    pub const fn is_directed(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for EdgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(format!("unknown edge status: {other}")),
        }
    }
}

/// A stored relationship between two usernames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEdge {
    pub requester: String,
    pub addressee: String,
    pub status: EdgeStatus,
    /// Logical creation time assigned by the store.
    pub created_at: i64,
}

impl FriendEdge {
    /// Whether this edge connects `a` and `b`, in either direction.
    #[must_use]
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.requester == a && self.addressee == b) || (self.requester == b && self.addressee == a)
    }

    /// Whether this edge matches `from -> to` for the given status,
    /// honouring direction only when the status is directional.
    #[must_use]
    pub fn matches(&self, from: &str, to: &str, status: EdgeStatus) -> bool {
        if self.status != status {
            return false;
        }
        if status.is_directed() {
            self.requester == from && self.addressee == to
        } else {
            self.connects(from, to)
        }
    }

    /// The endpoint opposite `username`, if `username` is on this edge.
    #[must_use]
    pub fn other(&self, username: &str) -> Option<&str> {
        if self.requester == username {
            Some(&self.addressee)
        } else if self.addressee == username {
            Some(&self.requester)
        } else {
            None
        }
    }
}
