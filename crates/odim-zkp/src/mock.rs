//! # Mock Verifiers
//!
//! Development and test backends for the [`ProofVerifier`] boundary.
//!
//! - [`FixedVerdictVerifier`] returns a configured verdict for every proof.
//!   Unit tests use it to drive the registry independently of cryptography.
//!
//! - [`DigestProver`] / [`DigestVerifier`] form a deterministic, transparent
//!   "proof system": a proof is the SHA-256 digest of the canonical
//!   public-input vector, split into 128-bit halves and laid out in the
//!   Groth16 shape. A proof minted for one vector fails for every other,
//!   which is enough to exercise the invalid-proof path end to end.
//!
//! ## Security Notice
//!
//! Neither backend proves knowledge of anything. Anyone can mint a digest
//! proof. They must never back a deployment that relies on key ownership.

use serde::Serialize;

use odim_core::{sha256_digest, CanonicalBytes, FieldElement};

use crate::proof::{G1Point, G2Point, Proof, PublicInputs};
use crate::traits::{ProofError, ProofVerifier, VerifyError};

/// Domain tag mixed into every digest proof.
const DIGEST_PROOF_DOMAIN: &str = "odim.mock-proof.v1";

// ---------------------------------------------------------------------------
// FixedVerdictVerifier
// ---------------------------------------------------------------------------

/// A verifier that ignores its inputs and returns a fixed verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedVerdictVerifier {
    verdict: bool,
}

impl FixedVerdictVerifier {
    /// A verifier returning `verdict` for every proof.
    pub fn new(verdict: bool) -> Self {
        Self { verdict }
    }

    /// Accepts every proof.
    pub fn accept_all() -> Self {
        Self::new(true)
    }

    /// Rejects every proof.
    pub fn reject_all() -> Self {
        Self::new(false)
    }
}

impl ProofVerifier for FixedVerdictVerifier {
    fn verify(&self, _proof: &Proof, _public_inputs: &PublicInputs) -> Result<bool, VerifyError> {
        Ok(self.verdict)
    }

    fn backend(&self) -> &'static str {
        if self.verdict {
            "accept-all"
        } else {
            "reject-all"
        }
    }
}

// ---------------------------------------------------------------------------
// Digest proofs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DigestPreimage<'a> {
    domain: &'a str,
    inputs: &'a PublicInputs,
}

/// Compute the digest proof for `inputs`.
fn digest_proof(inputs: &PublicInputs) -> Result<Proof, ProofError> {
    let preimage = DigestPreimage {
        domain: DIGEST_PROOF_DOMAIN,
        inputs,
    };
    let canonical =
        CanonicalBytes::new(&preimage).map_err(|e| ProofError::InvalidInputs(e.to_string()))?;
    let (high, low) = sha256_digest(&canonical).split_u128();
    let hi = FieldElement::from(high);
    let lo = FieldElement::from(low);
    Ok(Proof {
        a: G1Point::new(hi.clone(), lo.clone()),
        b: G2Point::new([hi.clone(), lo.clone()], [lo.clone(), hi.clone()]),
        c: G1Point::new(lo, hi),
    })
}

/// Mints deterministic digest proofs for development.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestProver;

impl DigestProver {
    /// Produce the proof that [`DigestVerifier`] accepts for `inputs`.
    pub fn prove(&self, inputs: &PublicInputs) -> Result<Proof, ProofError> {
        digest_proof(inputs)
    }
}

/// Verifies digest proofs by recomputing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestVerifier;

impl ProofVerifier for DigestVerifier {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> Result<bool, VerifyError> {
        let expected =
            digest_proof(public_inputs).map_err(|e| VerifyError::MalformedProof(e.to_string()))?;
        let valid = expected == *proof;
        tracing::trace!(valid, inputs = public_inputs.len(), "digest proof checked");
        Ok(valid)
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}
