//! Matching engine module for placematch.
//!
//! ## Design Principles
//!
//! The engine is designed for:
//!
//! 1. **Determinism**: the final matching is a pure function of the
//!    construction input and the queue insertion order
//! 2. **Synchronous Execution**: single-threaded, no suspension points,
//!    no I/O inside the loop
//! 3. **Fail-Fast Contracts**: broken preconditions surface as typed
//!    errors, never as silent negative results
//!
//! ## Components
//!
//! - [`RosterBuilder`]: identifier-based construction input and wiring
//! - [`MatchingEngine`]: qualification, placement transitions, main loop
//!
//! ## Example
//!
//! ```
//! use placematch::RosterBuilder;
//!
//! let mut engine = RosterBuilder::new()
//!     .candidate("Ada", &["City"])
//!     .provider("City", 1, &["Ada"])
//!     .build()
//!     .unwrap();
//!
//! let receipt = engine.run().unwrap();
//! assert_eq!(receipt.placed, 1);
//! ```

pub mod matcher;
pub mod roster;

pub use matcher::MatchingEngine;
pub use roster::RosterBuilder;
