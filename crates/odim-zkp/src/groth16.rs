//! # Groth16 Verifier (BN254, Feature-Gated)
//!
//! Real pairing-check verification for key-binding proofs produced by
//! ZoKrates (`scheme: g16`, `curve: bn128`). Gated behind the `groth16`
//! Cargo feature; the pairing arithmetic is `ark-groth16`'s.
//!
//! ## Input Validation
//!
//! - Every base-field coordinate must be canonical (below the BN254 base
//!   field modulus); every point must be on its curve and in the prime-order
//!   subgroup. Violations are faults (`Err`), not verdicts.
//! - Public inputs must be canonical scalars. A vector whose length does
//!   not match the verification key is an `Ok(false)` verdict.
//!
//! ## G2 Coordinate Order
//!
//! Proof tooling disagrees on whether an `Fq2` pair is written real part
//! first or imaginary part first. [`Fq2Order`] selects the convention.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::{prepare_verifying_key, Groth16, PreparedVerifyingKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use odim_core::FieldElement;

use crate::proof::{G1Point, G2Point, Proof, PublicInputs};
use crate::traits::{ProofVerifier, VerifyError};

/// Serialization order of the two components of an `Fq2` coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fq2Order {
    /// `[c0, c1]`: real part first.
    #[default]
    RealFirst,
    /// `[c1, c0]`: imaginary part first (EVM precompile order).
    ImaginaryFirst,
}

/// A Groth16 verification key in ZoKrates `verification.key` JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKeyJson {
    /// `alpha` in G1.
    pub alpha: G1Point,
    /// `beta` in G2.
    pub beta: G2Point,
    /// `gamma` in G2.
    pub gamma: G2Point,
    /// `delta` in G2.
    pub delta: G2Point,
    /// Input commitment bases, one more than the number of public inputs.
    pub gamma_abc: Vec<G1Point>,
}

/// Groth16 verifier over BN254.
pub struct Groth16Verifier {
    pvk: PreparedVerifyingKey<Bn254>,
    order: Fq2Order,
}

impl std::fmt::Debug for Groth16Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Groth16Verifier")
            .field("public_inputs", &self.input_count())
            .field("order", &self.order)
            .finish()
    }
}

impl Groth16Verifier {
    /// Build a verifier from a parsed verification key.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::KeyError`] if any key point is malformed.
    pub fn new(key: &VerificationKeyJson, order: Fq2Order) -> Result<Self, VerifyError> {
        let as_key_error = |e: VerifyError| VerifyError::KeyError(e.to_string());
        if key.gamma_abc.is_empty() {
            return Err(VerifyError::KeyError("gamma_abc must not be empty".into()));
        }
        let vk = VerifyingKey::<Bn254> {
            alpha_g1: g1(&key.alpha).map_err(as_key_error)?,
            beta_g2: g2(&key.beta, order).map_err(as_key_error)?,
            gamma_g2: g2(&key.gamma, order).map_err(as_key_error)?,
            delta_g2: g2(&key.delta, order).map_err(as_key_error)?,
            gamma_abc_g1: key
                .gamma_abc
                .iter()
                .map(g1)
                .collect::<Result<Vec<_>, _>>()
                .map_err(as_key_error)?,
        };
        Ok(Self {
            pvk: prepare_verifying_key(&vk),
            order,
        })
    }

    /// Parse a ZoKrates `verification.key` document.
    pub fn from_json(json: &str, order: Fq2Order) -> Result<Self, VerifyError> {
        let key: VerificationKeyJson =
            serde_json::from_str(json).map_err(|e| VerifyError::KeyError(e.to_string()))?;
        Self::new(&key, order)
    }

    /// Number of public inputs the key expects.
    pub fn input_count(&self) -> usize {
        self.pvk.vk.gamma_abc_g1.len().saturating_sub(1)
    }
}

impl ProofVerifier for Groth16Verifier {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> Result<bool, VerifyError> {
        if public_inputs.len() != self.input_count() {
            tracing::debug!(
                expected = self.input_count(),
                supplied = public_inputs.len(),
                "public input count does not match verification key"
            );
            return Ok(false);
        }
        let ark_proof = ark_groth16::Proof::<Bn254> {
            a: g1(&proof.a)?,
            b: g2(&proof.b, self.order)?,
            c: g1(&proof.c)?,
        };
        let inputs = public_inputs
            .as_slice()
            .iter()
            .map(scalar)
            .collect::<Result<Vec<_>, _>>()?;
        Groth16::<Bn254>::verify_proof(&self.pvk, &ark_proof, &inputs)
            .map_err(|e| VerifyError::Backend(e.to_string()))
    }

    fn backend(&self) -> &'static str {
        "groth16-bn254"
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Reduce-and-compare: accept only values already below the modulus.
fn canonical<F: PrimeField>(fe: &FieldElement, what: &str) -> Result<F, VerifyError> {
    let bytes = fe.to_be_bytes();
    let value = F::from_be_bytes_mod_order(&bytes);
    if value.into_bigint().to_bytes_be() != bytes.as_slice() {
        return Err(VerifyError::MalformedProof(format!(
            "{what} {fe} is not below the field modulus"
        )));
    }
    Ok(value)
}

fn scalar(fe: &FieldElement) -> Result<Fr, VerifyError> {
    canonical::<Fr>(fe, "public input")
}

fn base(fe: &FieldElement) -> Result<Fq, VerifyError> {
    canonical::<Fq>(fe, "coordinate")
}

fn g1(p: &G1Point) -> Result<G1Affine, VerifyError> {
    let point = G1Affine::new_unchecked(base(&p.x)?, base(&p.y)?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(VerifyError::MalformedProof(format!(
            "G1 point ({}, {}) is not in the BN254 subgroup",
            p.x, p.y
        )));
    }
    Ok(point)
}

fn fq2(pair: &[FieldElement; 2], order: Fq2Order) -> Result<Fq2, VerifyError> {
    let (re, im) = match order {
        Fq2Order::RealFirst => (&pair[0], &pair[1]),
        Fq2Order::ImaginaryFirst => (&pair[1], &pair[0]),
    };
    Ok(Fq2::new(base(re)?, base(im)?))
}

fn g2(p: &G2Point, order: Fq2Order) -> Result<G2Affine, VerifyError> {
    let point = G2Affine::new_unchecked(fq2(&p.x, order)?, fq2(&p.y, order)?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(VerifyError::MalformedProof(
            "G2 point is not in the BN254 subgroup".into(),
        ));
    }
    Ok(point)
}
