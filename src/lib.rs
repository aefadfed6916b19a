//! # placematch
//!
//! Deterministic capacity-constrained stable matching via deferred
//! acceptance, extended with a two-tier tentative/final placement status
//! per provider slot.
//!
//! ## Architecture
//!
//! - **Types**: core data structures (Candidate, Provider, PlacementStatus,
//!   RunReceipt)
//! - **Engine**: roster wiring and the deferred-acceptance loop
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical construction input produces an identical
//!    matching; the pending queue's FIFO discipline is part of the contract
//! 2. **Identifier-Based Wiring**: participants reference each other by
//!    roster key, never by direct object reference
//! 3. **Typed Failures**: contract violations are errors, not falsy results
//! 4. **Synchronous Execution**: single-threaded, no I/O in the core loop
//!
//! ## Example
//!
//! ```
//! use placematch::RosterBuilder;
//!
//! let mut engine = RosterBuilder::new()
//!     .candidate("Ada", &["City", "Mercy"])
//!     .candidate("Ben", &["City", "Mercy"])
//!     .provider("City", 1, &["Ada", "Ben"])
//!     .provider("Mercy", 1, &["Ada", "Ben"])
//!     .build()
//!     .unwrap();
//!
//! let receipt = engine.run().unwrap();
//! assert_eq!(receipt.placed, 2);
//! assert_eq!(receipt.unplaced, 0);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Candidate, Provider, statuses, errors, receipts
pub mod types;

/// Matching engine: roster wiring and the deferred-acceptance loop
pub mod engine;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::{MatchingEngine, RosterBuilder};
pub use types::{
    Candidate, MatchError, MatchOutcome, Participant, PlacementRecord, PlacementStatus, Provider,
    RunReceipt,
};
