//! # odim-zkp — Proof Verifier Boundary
//!
//! The registry never constructs or inspects proofs. It forwards an opaque
//! [`Proof`] and a [`PublicInputs`] vector to a [`ProofVerifier`] and acts
//! on the boolean verdict. This crate defines that boundary and the
//! backends that sit behind it.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): [`ProofVerifier`], one method, object safe.
//!   Production wires a real pairing check; tests wire stubs.
//!
//! - **Proof** (`proof.rs`): Groth16-shaped data model (two G1 points and
//!   one G2 point) plus the public-input vector, in the JSON shape ZoKrates
//!   emits.
//!
//! - **Mock** (`mock.rs`, feature `mock`, on by default): [`FixedVerdictVerifier`] for unit tests, and the
//!   deterministic [`DigestProver`]/[`DigestVerifier`] pair whose proofs bind
//!   to exactly one public-input vector. No zero-knowledge guarantees.
//!
//! - **Groth16** (`groth16.rs`, feature `groth16`): BN254 verification via
//!   `ark-groth16` against a ZoKrates verification key.
//!
//! ## Public-Input Convention
//!
//! Key-binding proofs carry `[x, y, x, y]`: the claimed public-key
//! coordinates twice. The registry passes the vector through untouched and
//! reads the key from the first two elements; what the duplication binds is
//! the circuit's business.

#[cfg(feature = "groth16")]
pub mod groth16;
#[cfg(feature = "mock")]
pub mod mock;
pub mod proof;
pub mod traits;

// Re-export primary types.
#[cfg(feature = "mock")]
pub use mock::{DigestProver, DigestVerifier, FixedVerdictVerifier};
pub use proof::{G1Point, G2Point, Proof, ProofBundle, PublicInputs};
pub use traits::{ProofError, ProofVerifier, VerifyError};

#[cfg(feature = "groth16")]
pub use groth16::{Fq2Order, Groth16Verifier, VerificationKeyJson};
