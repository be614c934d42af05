//! Deterministic Simulation Testing (DST) infrastructure.
//!
//! This module drives the friend graph and timeline services with:
//! - An in-memory row store with fault injection
//! - Reproducible random operation sequences
//! - A model of the expected graph, checked after each operation
//!
//! # Design Principles
//!
//! Following patterns from `TigerBeetle` and `Turso`:
//! 1. The row store is abstracted and can be simulated
//! 2. All randomness is seeded for reproducibility
//! 3. Faults can be injected at any store call
//! 4. Given the same seed, execution is identical
//!
//! # Usage
//!
//! ```ignore
//! use simulation::{Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::new(12345) // seed
//!     .with_fault_config(FaultConfig::low_faults())
//!     .with_user_count(20);
//!
//! let mut sim = Simulator::new(config)?;
//! let result = sim.run(1000); // Run 1000 operations
//!
//! assert!(result.invariant_violations.is_empty());
//! ```

mod operation_gen;
mod simulator;

pub use invariants::{ExpectedGraph, InvariantChecker, InvariantViolation, reference_timeline};
pub use operation_gen::{FriendOperation, OperationGenConfig, OperationGenerator};
pub use simulator::{SimulationResult, Simulator, SimulatorConfig};
