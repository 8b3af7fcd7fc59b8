//! # Registry Errors
//!
//! The `Display` strings of the five contract variants are a stable
//! interface: callers match on them verbatim. Do not reword them.

use thiserror::Error;

use odim_core::CanonicalizationError;
use odim_zkp::VerifyError;

/// Why a registry operation was rejected.
///
/// Every variant is detected before any mutation, so a rejected operation
/// leaves the registry and the key store exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The new identity is already linked into some principal's cycle, or
    /// is the caller's own anchor.
    #[error("newIdentity is already part of registered identities")]
    AlreadyRegistered,

    /// The verifier rejected the proof, or the public inputs carry no key.
    #[error("proving ownership of newIdentity failed")]
    InvalidProof,

    /// The caller has never registered an identity.
    #[error("msg.sender is not part of registered identities")]
    SenderNotRegistered,

    /// The removal target is not linked anywhere.
    #[error("toBeRemovedIdentity is not part of registered identities")]
    TargetNotRegistered,

    /// The removal target is linked, but not into the caller's cycle, or is
    /// an anchor.
    #[error("toBeRemovedIdentity is not part of msg.sender's circular linked list of identities")]
    TargetNotInCallersCycle,

    /// The verifier could not run. Not a verdict on the proof.
    #[error("proof verifier fault: {0}")]
    VerifierFault(VerifyError),
}

impl RegistryError {
    /// Stable short name of the error kind, for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered => "AlreadyRegistered",
            Self::InvalidProof => "InvalidProof",
            Self::SenderNotRegistered => "SenderNotRegistered",
            Self::TargetNotRegistered => "TargetNotRegistered",
            Self::TargetNotInCallersCycle => "TargetNotInCallersCycle",
            Self::VerifierFault(_) => "VerifierFault",
        }
    }
}

/// A snapshot could not be taken or restored.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot violates a registry invariant (duplicate identity,
    /// principal listed twice, principal also listed as a member).
    #[error("inconsistent snapshot at principal {principal}: {source}")]
    Inconsistent {
        /// The cycle being restored when the violation was found.
        principal: String,
        /// The invariant that was violated.
        source: RegistryError,
    },

    /// The snapshot could not be canonicalized for digesting.
    #[error("snapshot canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
