//! # Registry Service
//!
//! The public operation surface: proof-gated `add_identity`, caller-scoped
//! `remove_identity`, and the pure queries. Composes the
//! [`IdentityRegistry`], the [`PublicKeyStore`], and a [`ProofVerifier`].
//!
//! ## Security Invariant
//!
//! Every operation is all-or-nothing. All preconditions (including the
//! proof check) are evaluated against unmodified state, and only then are
//! the registry and key store written together. A rejected operation
//! leaves both stores, the event stream, and the state digest untouched.
//!
//! ## Check Order
//!
//! `add_identity`: already registered → proof. The verifier is never
//! consulted for an identity that could not be linked anyway. A caller
//! that is itself a member splices the new identity in right after itself,
//! inside the cycle it already belongs to.
//!
//! `remove_identity`: sender not registered → target not registered →
//! target not in caller's cycle. Anchors are never removable, so a member
//! cannot unregister the principal whose cycle it is in.
//!
//! There is no ambient instance. Each service is constructed explicitly
//! with its verifier and is isolated from every other.

use odim_core::{ContentDigest, Identifier, PublicKey};
use odim_zkp::{Proof, ProofVerifier, PublicInputs};

use crate::error::{RegistryError, SnapshotError};
use crate::events::{IdentityAdded, RegistryEvent};
use crate::keys::PublicKeyStore;
use crate::registry::{CycleIter, IdentityRegistry};
use crate::snapshot::RegistrySnapshot;

/// The identity registry state machine.
#[derive(Debug)]
pub struct RegistryService<V> {
    verifier: V,
    registry: IdentityRegistry,
    keys: PublicKeyStore,
    events: Vec<RegistryEvent>,
    next_sequence: u64,
}

impl<V: ProofVerifier> RegistryService<V> {
    /// Create an empty registry backed by `verifier`.
    pub fn new(verifier: V) -> Self {
        Self {
            verifier,
            registry: IdentityRegistry::new(),
            keys: PublicKeyStore::new(),
            events: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Create a registry backed by `verifier` and seeded from `snapshot`.
    pub fn from_snapshot(verifier: V, snapshot: &RegistrySnapshot) -> Result<Self, SnapshotError> {
        let mut service = Self::new(verifier);
        service.restore(snapshot)?;
        Ok(service)
    }

    /// The verifier this service consults.
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Link `new_identity` into `caller`'s cycle and bind the public key
    /// claimed by `inputs`, provided `proof` verifies over `inputs`.
    ///
    /// The claimed key is `(inputs[0], inputs[1])`. The inputs are handed to
    /// the verifier exactly as supplied.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyRegistered`]
    /// - [`RegistryError::InvalidProof`] if the verifier says no, or the
    ///   inputs carry fewer than two elements.
    /// - [`RegistryError::VerifierFault`] if the verifier could not run.
    pub fn add_identity(
        &mut self,
        caller: &Identifier,
        new_identity: &Identifier,
        proof: &Proof,
        inputs: &PublicInputs,
    ) -> Result<IdentityAdded, RegistryError> {
        let plan = self
            .registry
            .plan_link(caller, new_identity)
            .map_err(|e| rejected("add", caller, new_identity, e))?;

        let key = inputs
            .claimed_key()
            .ok_or_else(|| rejected("add", caller, new_identity, RegistryError::InvalidProof))?;

        match self.verifier.verify(proof, inputs) {
            Ok(true) => {}
            Ok(false) => {
                return Err(rejected(
                    "add",
                    caller,
                    new_identity,
                    RegistryError::InvalidProof,
                ))
            }
            Err(fault) => {
                tracing::warn!(
                    backend = self.verifier.backend(),
                    error = %fault,
                    "proof verifier fault"
                );
                return Err(rejected(
                    "add",
                    caller,
                    new_identity,
                    RegistryError::VerifierFault(fault),
                ));
            }
        }

        // Commit: nothing below can fail.
        self.registry.commit_link(plan);
        self.keys.set(new_identity.clone(), key);

        let event = IdentityAdded {
            sequence: self.next_sequence,
            added_by: caller.clone(),
            new_identity: new_identity.clone(),
        };
        self.next_sequence += 1;
        self.events.push(event.clone().into());

        tracing::info!(
            caller = %caller,
            identity = %new_identity,
            sequence = event.sequence,
            "identity added"
        );
        Ok(event)
    }

    /// Unlink `target` from `caller`'s cycle and clear its key.
    ///
    /// Emits no event.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::SenderNotRegistered`]
    /// - [`RegistryError::TargetNotRegistered`]
    /// - [`RegistryError::TargetNotInCallersCycle`]
    pub fn remove_identity(
        &mut self,
        caller: &Identifier,
        target: &Identifier,
    ) -> Result<(), RegistryError> {
        let plan = self
            .registry
            .plan_unlink(caller.as_str(), target.as_str())
            .map_err(|e| rejected("remove", caller, target, e))?;

        let steps = plan.steps();
        let removed = self.registry.commit_unlink(plan);
        self.keys.clear(removed.as_str());

        tracing::info!(caller = %caller, identity = %removed, steps, "identity removed");
        Ok(())
    }

    /// Return the service to the empty state. The verifier is kept.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.keys.reset();
        self.events.clear();
        self.next_sequence = 0;
    }

    /// Replace the whole state with `snapshot`.
    ///
    /// The event stream is cleared. On error the current state is kept.
    pub fn restore(&mut self, snapshot: &RegistrySnapshot) -> Result<(), SnapshotError> {
        let (registry, keys) = snapshot.restore()?;
        self.registry = registry;
        self.keys = keys;
        self.events.clear();
        self.next_sequence = 0;
        Ok(())
    }

    /// Take every event emitted so far, leaving the stream empty.
    ///
    /// Sequence numbers keep counting from where they were.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }
}

impl<V> RegistryService<V> {
    // ── Queries ──────────────────────────────────────────────────────

    /// The identifier after `id` in its cycle, or `""` if `id` was never
    /// linked (or has been removed).
    pub fn get_next_identity(&self, id: &str) -> &str {
        self.registry.next_of(id).map_or("", Identifier::as_str)
    }

    /// The key bound to `id`, or `(0, 0)`.
    pub fn get_public_key(&self, id: &str) -> PublicKey {
        self.keys.get(id)
    }

    /// `principal`'s identities, most recently added first.
    pub fn identities_of(&self, principal: &str) -> CycleIter<'_> {
        self.registry.cycle(principal)
    }

    /// Whether `id` is an anchor or a member of some cycle.
    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.is_registered(id)
    }

    /// Events not yet drained, oldest first.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// The underlying registry.
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// The underlying key store.
    pub fn keys(&self) -> &PublicKeyStore {
        &self.keys
    }

    /// Capture the current state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::capture(&self.registry, &self.keys)
    }

    /// SHA-256 of the canonical snapshot.
    pub fn state_digest(&self) -> Result<ContentDigest, SnapshotError> {
        self.snapshot().digest()
    }
}

fn rejected(
    operation: &'static str,
    caller: &Identifier,
    identity: &Identifier,
    err: RegistryError,
) -> RegistryError {
    tracing::debug!(
        operation,
        caller = %caller,
        identity = %identity,
        kind = err.kind(),
        "operation rejected"
    );
    err
}
