//! Operation generator for deterministic simulation testing.
//!
//! Produces reproducible sequences of friend-graph and timeline operations
//! over a fixed pool of usernames.

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Configuration for operation generation.
#[derive(Debug, Clone)]
pub struct OperationGenConfig {
    /// Probability of a read (friends, timeline) instead of a mutation.
    pub read_rate: f64,
    /// Probability that a username is not registered in the store.
    pub unknown_user_rate: f64,
    /// Probability of a cache maintenance operation (preload, evict).
    pub cache_churn_rate: f64,
    /// Largest timeline limit requested.
    pub max_timeline_limit: usize,
}

impl Default for OperationGenConfig {
    fn default() -> Self {
        Self {
            read_rate: 0.3,
            unknown_user_rate: 0.02,
            cache_churn_rate: 0.05,
            max_timeline_limit: 40,
        }
    }
}

/// A single operation against the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendOperation {
    SendRequest { from: String, to: String },
    AcceptRequest { from: String, to: String },
    RejectRequest { from: String, to: String },
    CancelRequest { from: String, to: String },
    RemoveFriend { user: String, friend: String },
    GetFriends { user: String },
    AreFriends { a: String, b: String },
    Timeline { user: String, limit: usize },
    Preload { user: String },
    Evict { user: String },
}

impl FriendOperation {
    /// Whether the operation writes the store.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SendRequest { .. }
                | Self::AcceptRequest { .. }
                | Self::RejectRequest { .. }
                | Self::CancelRequest { .. }
                | Self::RemoveFriend { .. }
        )
    }
}

/// Generator for random [`FriendOperation`] instances.
///
/// Produces the same sequence for the same seed and user pool.
pub struct OperationGenerator {
    rng: StdRng,
    config: OperationGenConfig,
    users: Vec<String>,
}

impl OperationGenerator {
    #[must_use]
    pub fn new(seed: u64, users: Vec<String>) -> Self {
        Self::with_config(seed, users, OperationGenConfig::default())
    }

    #[must_use]
    pub fn with_config(seed: u64, users: Vec<String>, config: OperationGenConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
            users,
        }
    }

    /// Generate the next operation.
    pub fn next_operation(&mut self) -> FriendOperation {
        if self.rng.random_bool(self.config.cache_churn_rate) {
            let user = self.pick_user();
            return if self.rng.random_bool(0.5) {
                FriendOperation::Preload { user }
            } else {
                FriendOperation::Evict { user }
            };
        }

        if self.rng.random_bool(self.config.read_rate) {
            return match self.rng.random_range(0..3) {
                0 => FriendOperation::GetFriends {
                    user: self.pick_user(),
                },
                1 => {
                    let (a, b) = self.pick_pair();
                    FriendOperation::AreFriends { a, b }
                }
                _ => FriendOperation::Timeline {
                    user: self.pick_user(),
                    limit: self.rng.random_range(0..=self.config.max_timeline_limit),
                },
            };
        }

        let (from, to) = self.pick_pair();
        // Weighted so requests are accepted often enough to build a graph
        match self.rng.random_range(0..10) {
            0..=3 => FriendOperation::SendRequest { from, to },
            4..=6 => FriendOperation::AcceptRequest { from, to },
            7 => FriendOperation::RejectRequest { from, to },
            8 => FriendOperation::CancelRequest { from, to },
            _ => FriendOperation::RemoveFriend {
                user: from,
                friend: to,
            },
        }
    }

    fn pick_user(&mut self) -> String {
        if self.rng.random_bool(self.config.unknown_user_rate) {
            return format!("ghost{}", self.rng.random_range(0..3));
        }
        self.users
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }

    /// Two usernames, occasionally the same one.
    fn pick_pair(&mut self) -> (String, String) {
        let a = self.pick_user();
        let b = if self.rng.random_bool(0.05) {
            a.clone()
        } else {
            self.pick_user()
        };
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::numbered_users;

    #[test]
    fn test_generator_deterministic() {
        let mut gen1 = OperationGenerator::new(42, numbered_users(8));
        let mut gen2 = OperationGenerator::new(42, numbered_users(8));

        for _ in 0..200 {
            assert_eq!(gen1.next_operation(), gen2.next_operation());
        }
    }

    #[test]
    fn test_generator_produces_reads_and_mutations() {
        let mut generator = OperationGenerator::new(7, numbered_users(8));
        let ops: Vec<FriendOperation> = (0..500).map(|_| generator.next_operation()).collect();

        assert!(ops.iter().any(FriendOperation::is_mutation));
        assert!(ops.iter().any(|op| !op.is_mutation()));
        assert!(
            ops.iter()
                .any(|op| matches!(op, FriendOperation::Timeline { .. }))
        );
    }

    #[test]
    fn test_generator_all_reads() {
        let config = OperationGenConfig {
            read_rate: 1.0,
            cache_churn_rate: 0.0,
            ..OperationGenConfig::default()
        };
        let mut generator = OperationGenerator::with_config(3, numbered_users(4), config);

        for _ in 0..100 {
            assert!(!generator.next_operation().is_mutation());
        }
    }
}
