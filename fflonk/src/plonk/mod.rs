//! The fflonk implementation.

/// Module for the hash configuration.
pub mod config;

/// Module for the constraint system.
#[cfg(any(test, feature = "prover"))]
pub mod constraint_system;

/// Module for help functions.
pub(crate) mod helpers;

/// Module for indexer.
pub mod indexer;

/// Module for prover.
#[cfg(any(test, feature = "prover"))]
pub mod prover;

/// Module for transcript.
pub(crate) mod transcript;

/// Module for verifier.
pub mod verifier;

pub use helpers::ProofEvaluations;
