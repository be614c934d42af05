//! Main simulator harness for deterministic simulation testing.
//!
//! Drives the friend graph and timeline services over a fault-injecting
//! [`MemoryStore`] and checks every invariant after each operation.

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::invariants::{ExpectedGraph, InvariantChecker, InvariantViolation, reference_timeline};
use super::operation_gen::{FriendOperation, OperationGenConfig, OperationGenerator};
use crate::services::{FriendGraphService, GraphError, TimelineAssembler, TimelineConfig};
use crate::store::{FaultConfig, MemoryStore, StoreError};
use crate::testing::numbered_users;
use crate::types::PostRecord;

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Fault injection configuration.
    pub fault_config: FaultConfig,
    /// Operation generation configuration.
    pub operation_config: OperationGenConfig,
    /// Number of registered users.
    pub user_count: usize,
    /// Posts seeded per user before the run.
    pub posts_per_user: usize,
    /// Per-author caps used by the timeline assembler.
    pub timeline: TimelineConfig,
}

impl SimulatorConfig {
    /// Create a new simulator config with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fault_config: FaultConfig::default(),
            operation_config: OperationGenConfig::default(),
            user_count: 12,
            posts_per_user: 8,
            timeline: TimelineConfig {
                self_cap: 5,
                friend_cap: 3,
            },
        }
    }

    #[must_use]
    pub const fn with_fault_config(mut self, config: FaultConfig) -> Self {
        self.fault_config = config;
        self
    }

    #[must_use]
    pub const fn with_operation_config(mut self, config: OperationGenConfig) -> Self {
        self.operation_config = config;
        self
    }

    #[must_use]
    pub const fn with_user_count(mut self, count: usize) -> Self {
        self.user_count = count;
        self
    }

    #[must_use]
    pub const fn with_posts_per_user(mut self, count: usize) -> Self {
        self.posts_per_user = count;
        self
    }

    #[must_use]
    pub const fn with_timeline_config(mut self, config: TimelineConfig) -> Self {
        self.timeline = config;
        self
    }
}

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Number of operations processed.
    pub operations_processed: u64,
    /// Operations that completed and did what they asked.
    pub successful_operations: u64,
    /// Operations that completed but were refused by validation.
    pub refused_operations: u64,
    /// Operations that returned an error (injected faults).
    pub failed_operations: u64,
    /// Friendships standing at the end of the run.
    pub final_friendships: usize,
    /// Invariant violations detected.
    pub invariant_violations: Vec<InvariantViolation>,
}

impl SimulationResult {
    /// Check if the simulation passed (no invariant violations).
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }

    /// One line per violation, headed by the seed that reproduces them.
    #[must_use]
    pub fn report(&self) -> String {
        let mut report = format!(
            "seed {}: {} violations",
            self.seed,
            self.invariant_violations.len()
        );
        for violation in &self.invariant_violations {
            report.push_str("\n  ");
            report.push_str(&violation.to_string());
        }
        report
    }
}

/// The main simulator harness.
///
/// This ties together:
/// - The in-memory store with fault injection
/// - The friend graph and timeline services under test
/// - The operation generator
/// - A model of the expected graph and the invariant checker
pub struct Simulator {
    config: SimulatorConfig,
    store: Arc<MemoryStore>,
    graph: Arc<FriendGraphService<MemoryStore>>,
    timeline: TimelineAssembler<MemoryStore>,
    generator: OperationGenerator,
    model: ExpectedGraph,
    posts: Vec<PostRecord>,
    checker: InvariantChecker,
    operations_processed: u64,
    successful_operations: u64,
    refused_operations: u64,
    failed_operations: u64,
}

impl Simulator {
    /// Create a simulator with seeded users and posts.
    pub fn new(config: SimulatorConfig) -> Result<Self, StoreError> {
        let store = Arc::new(MemoryStore::with_faults(
            config.seed,
            config.fault_config.clone(),
        ));
        let users = numbered_users(config.user_count);

        // Narrow timestamp range so equal timestamps are common
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        let mut posts = Vec::with_capacity(users.len() * config.posts_per_user);
        for user in &users {
            store.add_user(user)?;
            for n in 0..config.posts_per_user {
                let created_at = rng.random_range(0..40);
                let content = format!("{user} post {n}");
                let id = store.add_post(user, &content, created_at)?;
                posts.push(PostRecord::new(id, user.as_str(), content, created_at));
            }
        }

        let graph = Arc::new(FriendGraphService::new(Arc::clone(&store)));
        let timeline = TimelineAssembler::new(Arc::clone(&graph), config.timeline);
        let generator = OperationGenerator::with_config(
            config.seed,
            users.clone(),
            config.operation_config.clone(),
        );

        Ok(Self {
            config,
            store,
            graph,
            timeline,
            generator,
            model: ExpectedGraph::new(users),
            posts,
            checker: InvariantChecker::new(),
            operations_processed: 0,
            successful_operations: 0,
            refused_operations: 0,
            failed_operations: 0,
        })
    }

    /// Run `operation_count` generated operations.
    pub fn run(&mut self, operation_count: usize) -> SimulationResult {
        for _ in 0..operation_count {
            let operation = self.generator.next_operation();
            self.execute(&operation);
        }
        self.result()
    }

    /// Execute one operation and check every invariant afterwards.
    pub fn execute(&mut self, operation: &FriendOperation) {
        let index = self.operations_processed;
        let operation_index = usize::try_from(index).unwrap_or(usize::MAX);
        self.operations_processed += 1;

        match operation {
            FriendOperation::SendRequest { from, to } => {
                let expected = self.model.can_send(from, to);
                let result = self.graph.send_request(from, to);
                if self.record_mutation("send_request", expected, result, operation_index) {
                    self.model.apply_send(from, to);
                }
            }
            FriendOperation::AcceptRequest { from, to } => {
                let expected = self.model.has_pending(from, to);
                let result = self.graph.accept_request(from, to);
                if self.record_mutation("accept_request", expected, result, operation_index) {
                    self.model.apply_accept(from, to);
                }
            }
            FriendOperation::RejectRequest { from, to } => {
                let expected = self.model.has_pending(from, to);
                let result = self.graph.reject_request(from, to);
                if self.record_mutation("reject_request", expected, result, operation_index) {
                    self.model.apply_withdraw(from, to);
                }
            }
            FriendOperation::CancelRequest { from, to } => {
                let expected = self.model.has_pending(from, to);
                let result = self.graph.cancel_request(from, to);
                if self.record_mutation("cancel_request", expected, result, operation_index) {
                    self.model.apply_withdraw(from, to);
                }
            }
            FriendOperation::RemoveFriend { user, friend } => {
                let expected = self.model.are_friends(user, friend);
                let result = self.graph.remove_friend(user, friend);
                if self.record_mutation("remove_friend", expected, result, operation_index) {
                    self.model.apply_remove(user, friend);
                }
            }
            FriendOperation::GetFriends { user } => match self.graph.get_friends(user) {
                Ok(friends) => {
                    self.successful_operations += 1;
                    let expected = self.model.friends_of(user);
                    self.checker
                        .check_friends(user, &friends, &expected, operation_index);
                }
                Err(_) => self.failed_operations += 1,
            },
            FriendOperation::AreFriends { a, b } => match self.graph.are_friends(a, b) {
                Ok(actual) => {
                    self.successful_operations += 1;
                    let expected = self.model.are_friends(a, b);
                    self.checker
                        .check_outcome("are_friends", expected, actual, operation_index);
                }
                Err(_) => self.failed_operations += 1,
            },
            FriendOperation::Timeline { user, limit } => {
                match self.timeline.generate(user, *limit) {
                    Ok(posts) => {
                        self.successful_operations += 1;
                        let expected = reference_timeline(
                            &self.model,
                            &self.posts,
                            user,
                            self.config.timeline.self_cap,
                            self.config.timeline.friend_cap,
                            *limit,
                        );
                        self.checker
                            .check_timeline(user, &posts, &expected, operation_index);
                    }
                    Err(_) => self.failed_operations += 1,
                }
            }
            FriendOperation::Preload { user } => {
                self.record_maintenance(self.graph.preload(user).map(|()| true));
            }
            FriendOperation::Evict { user } => {
                self.record_maintenance(self.graph.evict(user));
            }
        }

        self.checker
            .check_store_matches_model(&self.store, &self.model, operation_index);
        self.checker
            .check_cache_matches_store(&self.graph, operation_index);
    }

    /// Count a mutation and check its outcome. Returns whether it took
    /// effect.
    fn record_mutation(
        &mut self,
        name: &str,
        expected: bool,
        result: Result<bool, GraphError>,
        operation_index: usize,
    ) -> bool {
        match result {
            Ok(applied) => {
                if applied {
                    self.successful_operations += 1;
                } else {
                    self.refused_operations += 1;
                }
                self.checker
                    .check_outcome(name, expected, applied, operation_index);
                applied
            }
            Err(e) => {
                tracing::debug!("{name} failed: {e}");
                self.failed_operations += 1;
                false
            }
        }
    }

    fn record_maintenance(&mut self, result: Result<bool, GraphError>) {
        match result {
            Ok(_) => self.successful_operations += 1,
            Err(_) => self.failed_operations += 1,
        }
    }

    /// Snapshot of the run so far.
    #[must_use]
    pub fn result(&self) -> SimulationResult {
        SimulationResult {
            seed: self.config.seed,
            operations_processed: self.operations_processed,
            successful_operations: self.successful_operations,
            refused_operations: self.refused_operations,
            failed_operations: self.failed_operations,
            final_friendships: self.model.friendship_count(),
            invariant_violations: self.checker.violations().to_vec(),
        }
    }

    #[must_use]
    pub const fn model(&self) -> &ExpectedGraph {
        &self.model
    }

    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(config: SimulatorConfig, operations: usize) -> SimulationResult {
        Simulator::new(config).unwrap().run(operations)
    }

    #[test]
    fn test_simulator_basic() {
        let result = run(SimulatorConfig::new(12345), 300);

        assert_eq!(result.operations_processed, 300);
        assert_eq!(
            result.successful_operations + result.refused_operations + result.failed_operations,
            300
        );
        assert_eq!(result.failed_operations, 0);
        assert!(result.passed(), "{}", result.report());
    }

    #[test]
    fn test_simulator_builds_friendships() {
        let result = run(SimulatorConfig::new(2024).with_user_count(6), 500);

        assert!(result.passed(), "{}", result.report());
        assert!(result.final_friendships > 0);
    }

    #[test]
    fn test_simulator_with_faults() {
        let config = SimulatorConfig::new(777).with_fault_config(FaultConfig::high_faults());
        let mut simulator = Simulator::new(config).unwrap();

        let result = simulator.run(500);

        assert!(result.failed_operations > 0);
        assert!(result.passed(), "{}", result.report());
        let stats = simulator.store().stats().unwrap();
        assert!(stats.injected_read_errors + stats.injected_write_errors > 0);
    }

    #[test]
    fn test_simulator_deterministic() {
        let config = SimulatorConfig::new(4242).with_fault_config(FaultConfig::low_faults());
        let result1 = run(config.clone(), 400);
        let result2 = run(config, 400);

        assert_eq!(result1.successful_operations, result2.successful_operations);
        assert_eq!(result1.refused_operations, result2.refused_operations);
        assert_eq!(result1.failed_operations, result2.failed_operations);
        assert_eq!(result1.final_friendships, result2.final_friendships);
    }

    #[test]
    fn test_simulator_many_seeds() {
        for seed in 0..20 {
            let result = run(SimulatorConfig::new(seed).with_user_count(5), 150);
            assert!(result.passed(), "{}", result.report());
        }
    }

    #[test]
    fn test_simulator_read_heavy_with_tight_caps() {
        let operations = OperationGenConfig {
            read_rate: 0.8,
            max_timeline_limit: 5,
            ..OperationGenConfig::default()
        };
        let config = SimulatorConfig::new(31)
            .with_operation_config(operations)
            .with_timeline_config(TimelineConfig {
                self_cap: 1,
                friend_cap: 1,
            })
            .with_fault_config(FaultConfig::low_faults());

        let result = run(config, 400);

        assert_eq!(result.seed, 31);
        assert!(result.passed(), "{}", result.report());
    }

    #[test]
    fn test_report_names_seed_and_context() {
        let mut result = run(SimulatorConfig::new(8).with_user_count(3), 10);
        result.invariant_violations.push(InvariantViolation {
            description: "Friend list differs from model".to_string(),
            operation_index: 4,
            context: "user00: expected [], got [user01]".to_string(),
        });

        let report = result.report();
        assert!(report.starts_with("seed 8: 1 violations"));
        assert!(report.contains("op 4: Friend list differs from model (user00: expected [], got [user01])"));
    }

    #[test]
    fn test_simulator_scripted_operations() {
        let mut simulator = Simulator::new(SimulatorConfig::new(1).with_user_count(3)).unwrap();
        let op = |from: &str, to: &str| FriendOperation::SendRequest {
            from: from.to_string(),
            to: to.to_string(),
        };

        simulator.execute(&op("user00", "user01"));
        simulator.execute(&op("user01", "user00"));
        simulator.execute(&FriendOperation::AcceptRequest {
            from: "user00".to_string(),
            to: "user01".to_string(),
        });
        simulator.execute(&FriendOperation::Timeline {
            user: "user01".to_string(),
            limit: 10,
        });

        let result = simulator.result();
        assert!(result.passed(), "{}", result.report());
        assert_eq!(result.successful_operations, 3);
        assert_eq!(result.refused_operations, 1);
        assert!(simulator.model().are_friends("user01", "user00"));
    }

    #[test]
    #[ignore] // Long running test
    fn test_simulator_stress() {
        let config = SimulatorConfig::new(99999)
            .with_fault_config(FaultConfig::low_faults())
            .with_user_count(40)
            .with_posts_per_user(20);

        let result = run(config, 10_000);

        assert!(result.passed(), "{}", result.report());
    }
}
