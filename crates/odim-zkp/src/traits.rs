//! # Proof Verifier Trait
//!
//! The capability the registry consumes: given a proof and its public
//! inputs, return a verdict. Implementations must be deterministic and free
//! of side effects, since every validator replaying the registry history
//! must reach the same verdicts.
//!
//! ## Verdict vs. Fault
//!
//! `Ok(true)` accepts, `Ok(false)` rejects. `Err(_)` means the verifier
//! itself could not run (a structurally malformed proof or key). The
//! registry reports the two differently but rolls back identically.

use std::sync::Arc;

use thiserror::Error;

use crate::proof::{Proof, PublicInputs};

/// Error during proof generation.
///
/// Returned by the development provers in this crate. The registry never
/// generates proofs.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The public inputs could not be encoded.
    #[error("invalid proof inputs: {0}")]
    InvalidInputs(String),
    /// Proof generation failed internally.
    #[error("proof generation failed: {0}")]
    GenerationFailed(String),
}

/// A verifier fault, distinct from an `Ok(false)` verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof is structurally malformed (off-curve point, non-canonical
    /// coordinate, undecodable encoding).
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    /// The verifying key is malformed or incompatible with the backend.
    #[error("key error: {0}")]
    KeyError(String),
    /// The backend failed internally.
    #[error("verifier backend error: {0}")]
    Backend(String),
}

/// One-method capability interface for proof verification.
///
/// Object safe, so callers that pick a backend at runtime can hold a
/// `Box<dyn ProofVerifier>`.
pub trait ProofVerifier: Send + Sync {
    /// Check `proof` against `public_inputs`.
    ///
    /// The inputs are exactly what the caller supplied; the verifier owns
    /// any interpretation of their layout.
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> Result<bool, VerifyError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str {
        "unnamed"
    }
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for Box<V> {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> Result<bool, VerifyError> {
        (**self).verify(proof, public_inputs)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for Arc<V> {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> Result<bool, VerifyError> {
        (**self).verify(proof, public_inputs)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for &V {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> Result<bool, VerifyError> {
        (**self).verify(proof, public_inputs)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
