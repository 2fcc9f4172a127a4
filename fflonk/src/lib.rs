//! A verifier for fflonk proofs over BN254, the PLONK variant where all the
//! polynomials of a round are folded into a single KZG commitment and opened
//! together with one SHPLONK proof.
#![deny(warnings)]
#![allow(clippy::needless_borrow)]
#![allow(clippy::upper_case_acronyms)]

/// Module for errors.
pub mod errors;
/// Module for the fflonk protocol.
pub mod plonk;
/// Module for polynomial commitments.
pub mod poly_commit;
/// Module for serde support.
pub mod serialization;
/// Module for the Fiat-Shamir transcript.
pub mod transcript;
/// Module for utils.
pub mod utils;
