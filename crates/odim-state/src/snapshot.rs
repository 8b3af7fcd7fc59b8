//! # Registry Snapshots
//!
//! A [`RegistrySnapshot`] is the complete observable state of a registry:
//! every principal's cycle in traversal order, with the public key bound to
//! each identity. Principals are sorted, so two registries with the same
//! cycles produce byte-identical snapshots regardless of how they got there.
//!
//! ## Digest
//!
//! The state digest is SHA-256 over the JCS canonical bytes of the
//! snapshot. Independent replays of the same operations from the same
//! starting snapshot produce the same digest.
//!
//! ## Restore
//!
//! Restoring re-links each cycle from its oldest identity to its newest,
//! which rebuilds the exact traversal order. A principal with no
//! identities is restored as the registered-but-empty self-loop. Every
//! registry invariant is re-checked while restoring; a snapshot that
//! breaks one is rejected as a whole.

use serde::{Deserialize, Serialize};

use odim_core::{sha256_digest, CanonicalBytes, ContentDigest, Identifier, PublicKey};

use crate::error::{RegistryError, SnapshotError};
use crate::keys::PublicKeyStore;
use crate::registry::IdentityRegistry;

/// One identity in a cycle, with its bound key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundIdentity {
    pub identity: Identifier,
    pub public_key: PublicKey,
}

/// One principal's cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    /// The anchoring principal.
    pub principal: Identifier,
    /// Identities in traversal order, most recently added first. Empty for
    /// a principal whose identities have all been removed.
    #[serde(default)]
    pub identities: Vec<BoundIdentity>,
}

/// The full registry state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Cycles sorted by principal.
    #[serde(default)]
    pub cycles: Vec<CycleSnapshot>,
}

impl RegistrySnapshot {
    /// Capture the state of a registry and its key store.
    pub fn capture(registry: &IdentityRegistry, keys: &PublicKeyStore) -> Self {
        let mut cycles: Vec<CycleSnapshot> = registry
            .principals()
            .map(|principal| CycleSnapshot {
                principal: principal.clone(),
                identities: registry
                    .cycle(principal.as_str())
                    .map(|identity| BoundIdentity {
                        identity: identity.clone(),
                        public_key: keys.get(identity.as_str()),
                    })
                    .collect(),
            })
            .collect();
        cycles.sort_by(|a, b| a.principal.cmp(&b.principal));
        Self { cycles }
    }

    /// Rebuild a registry and key store from this snapshot.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::Inconsistent`] if a principal appears twice, an
    /// identity appears in two cycles, or a principal is also listed as
    /// another principal's identity.
    pub fn restore(&self) -> Result<(IdentityRegistry, PublicKeyStore), SnapshotError> {
        let mut registry = IdentityRegistry::new();
        let mut keys = PublicKeyStore::new();

        for cycle in &self.cycles {
            let inconsistent = |source: RegistryError| SnapshotError::Inconsistent {
                principal: cycle.principal.to_string(),
                source,
            };
            if registry.is_registered(cycle.principal.as_str()) {
                return Err(inconsistent(RegistryError::AlreadyRegistered));
            }
            if cycle.identities.is_empty() {
                registry.commit_self_loop(cycle.principal.clone());
                continue;
            }
            for bound in cycle.identities.iter().rev() {
                registry
                    .link_after(&cycle.principal, &bound.identity)
                    .map_err(inconsistent)?;
                keys.set(bound.identity.clone(), bound.public_key.clone());
            }
        }

        tracing::debug!(
            principals = self.cycles.len(),
            identities = self.identity_count(),
            "restored registry snapshot"
        );
        Ok((registry, keys))
    }

    /// SHA-256 over the canonical bytes of this snapshot.
    pub fn digest(&self) -> Result<ContentDigest, SnapshotError> {
        let canonical = CanonicalBytes::new(self)?;
        Ok(sha256_digest(&canonical))
    }

    /// Total identities across all cycles (anchors excluded).
    pub fn identity_count(&self) -> usize {
        self.cycles.iter().map(|c| c.identities.len()).sum()
    }

    /// The cycle anchored at `principal`, if any.
    ///
    /// Deserialized snapshots may list principals in any order.
    pub fn cycle(&self, principal: &str) -> Option<&CycleSnapshot> {
        self.cycles
            .iter()
            .find(|c| c.principal.as_str() == principal)
    }
}
