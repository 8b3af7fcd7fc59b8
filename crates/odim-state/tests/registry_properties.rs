//! # Registry Contract Tests
//!
//! End-to-end behavior of [`RegistryService`] through its public surface
//! only: the pointer structure observed via `get_next_identity`, the key
//! store observed via `get_public_key`, the stable failure strings, and
//! the all-or-nothing guarantee.
//!
//! The property tests at the bottom drive random interleavings of adds and
//! removes against a simple reference model and check that every cycle,
//! every key, and every rejection matches it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use odim_core::{FieldElement, Identifier, PublicKey};
use odim_state::{
    replay, Operation, OperationLog, RegistryError, RegistryService, RegistrySnapshot,
};
use odim_zkp::{
    DigestProver, DigestVerifier, FixedVerdictVerifier, Proof, ProofVerifier, PublicInputs,
    VerifyError,
};

// ─── Helpers ─────────────────────────────────────────────────────────

fn id(s: &str) -> Identifier {
    Identifier::new(s).unwrap()
}

fn key(x: u64, y: u64) -> PublicKey {
    PublicKey::new(FieldElement::from(x), FieldElement::from(y))
}

/// A proof that the digest verifier accepts for the key `(x, y)`.
fn valid(x: u64, y: u64) -> (Proof, PublicInputs) {
    let inputs = PublicInputs::for_key(&key(x, y));
    (DigestProver.prove(&inputs).unwrap(), inputs)
}

/// A proof for `(x, y)` paired with inputs claiming a different key.
fn forged(x: u64, y: u64) -> (Proof, PublicInputs) {
    let (proof, _) = valid(x, y);
    (proof, PublicInputs::for_key(&key(x + 1, y)))
}

fn service() -> RegistryService<DigestVerifier> {
    RegistryService::new(DigestVerifier)
}

fn add(
    svc: &mut RegistryService<DigestVerifier>,
    caller: &str,
    identity: &str,
    x: u64,
) -> Result<(), RegistryError> {
    let (proof, inputs) = valid(x, x + 100);
    svc.add_identity(&id(caller), &id(identity), &proof, &inputs)
        .map(|_| ())
}

fn remove(
    svc: &mut RegistryService<DigestVerifier>,
    caller: &str,
    identity: &str,
) -> Result<(), RegistryError> {
    svc.remove_identity(&id(caller), &id(identity))
}

/// Counts verifier invocations and accepts everything.
#[derive(Default)]
struct CountingVerifier {
    calls: AtomicUsize,
}

impl ProofVerifier for CountingVerifier {
    fn verify(&self, _: &Proof, _: &PublicInputs) -> Result<bool, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

// ─── Contract behavior ───────────────────────────────────────────────

#[test]
fn test_fresh_principal_has_empty_next() {
    let svc = service();
    assert_eq!(svc.get_next_identity("0xP"), "");
    assert!(svc.get_public_key("0xP").is_zero());
}

#[test]
fn test_first_add_forms_two_cycle_and_binds_key() {
    let mut svc = service();
    let (proof, inputs) = valid(11, 12);
    svc.add_identity(&id("0xP"), &id("did:x:1"), &proof, &inputs)
        .unwrap();
    assert_eq!(svc.get_next_identity("0xP"), "did:x:1");
    assert_eq!(svc.get_next_identity("did:x:1"), "0xP");
    assert_eq!(svc.get_public_key("did:x:1"), key(11, 12));
}

#[test]
fn test_adds_are_lifo_at_the_anchor() {
    let mut svc = service();
    for n in 1..=4 {
        add(&mut svc, "0xP", &format!("X{n}"), n).unwrap();
    }
    assert_eq!(svc.get_next_identity("0xP"), "X4");
    assert_eq!(svc.get_next_identity("X4"), "X3");
    assert_eq!(svc.get_next_identity("X3"), "X2");
    assert_eq!(svc.get_next_identity("X2"), "X1");
    assert_eq!(svc.get_next_identity("X1"), "0xP");
}

#[test]
fn test_identities_are_globally_unique() {
    let mut svc = service();
    add(&mut svc, "0xP", "did:x:1", 1).unwrap();
    let err = add(&mut svc, "0xQ", "did:x:1", 2).unwrap_err();
    assert_eq!(err.to_string(), "newIdentity is already part of registered identities");
    // Repeating a successful add by the same caller fails the same way.
    assert_eq!(
        add(&mut svc, "0xP", "did:x:1", 1),
        Err(RegistryError::AlreadyRegistered)
    );
    assert_eq!(svc.get_public_key("did:x:1"), key(1, 101));
}

#[test]
fn test_invalid_proof_changes_nothing() {
    let mut svc = service();
    let before = svc.state_digest().unwrap();
    let (proof, inputs) = forged(11, 12);
    let err = svc
        .add_identity(&id("0xP"), &id("did:x:1"), &proof, &inputs)
        .unwrap_err();
    assert_eq!(err.to_string(), "proving ownership of newIdentity failed");
    assert_eq!(svc.get_next_identity("0xP"), "");
    assert_eq!(svc.get_next_identity("did:x:1"), "");
    assert!(svc.get_public_key("did:x:1").is_zero());
    assert_eq!(svc.state_digest().unwrap(), before);
}

#[test]
fn test_removing_last_identity_leaves_self_loop() {
    let mut svc = service();
    add(&mut svc, "0xP", "did:x:1", 1).unwrap();
    remove(&mut svc, "0xP", "did:x:1").unwrap();
    assert_eq!(svc.get_next_identity("did:x:1"), "");
    assert_eq!(svc.get_next_identity("0xP"), "0xP");
    assert!(svc.get_public_key("did:x:1").is_zero());
    // Registered but empty: a foreign target is still "not in cycle".
    add(&mut svc, "0xQ", "did:q:1", 2).unwrap();
    assert_eq!(
        remove(&mut svc, "0xP", "did:q:1"),
        Err(RegistryError::TargetNotInCallersCycle)
    );
}

#[test]
fn test_remove_authorization_errors() {
    let mut svc = service();
    add(&mut svc, "0xP", "did:p:1", 1).unwrap();
    add(&mut svc, "0xQ", "did:q:1", 2).unwrap();

    let err = remove(&mut svc, "0xR", "did:p:1").unwrap_err();
    assert_eq!(err.to_string(), "msg.sender is not part of registered identities");

    let err = remove(&mut svc, "0xP", "did:q:1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "toBeRemovedIdentity is not part of msg.sender's circular linked list of identities"
    );

    let err = remove(&mut svc, "0xP", "did:never").unwrap_err();
    assert_eq!(
        err.to_string(),
        "toBeRemovedIdentity is not part of registered identities"
    );

    // Nothing moved.
    assert_eq!(svc.get_next_identity("0xQ"), "did:q:1");
    assert_eq!(svc.get_public_key("did:q:1"), key(2, 102));
}

#[test]
fn test_principals_do_not_interfere() {
    let mut svc = service();
    add(&mut svc, "0xP", "did:p:1", 1).unwrap();
    add(&mut svc, "0xQ", "did:q:1", 2).unwrap();
    add(&mut svc, "0xP", "did:p:2", 3).unwrap();
    remove(&mut svc, "0xQ", "did:q:1").unwrap();

    assert_eq!(svc.get_next_identity("0xP"), "did:p:2");
    assert_eq!(svc.get_next_identity("did:p:2"), "did:p:1");
    assert_eq!(svc.get_next_identity("did:p:1"), "0xP");
    assert_eq!(svc.get_next_identity("0xQ"), "0xQ");
}

#[test]
fn test_queries_are_pure() {
    let mut svc = service();
    add(&mut svc, "0xP", "did:x:1", 1).unwrap();
    let before = svc.state_digest().unwrap();
    for _ in 0..3 {
        let _ = svc.get_next_identity("0xP");
        let _ = svc.get_next_identity("nobody");
        let _ = svc.get_public_key("did:x:1");
        let _ = svc.is_registered("nobody");
    }
    assert_eq!(svc.state_digest().unwrap(), before);
    assert!(svc.registry().handle("nobody").is_none());
}

#[test]
fn test_verifier_not_consulted_for_registered_identity() {
    let mut svc = RegistryService::new(CountingVerifier::default());
    let (proof, inputs) = valid(1, 2);
    svc.add_identity(&id("0xP"), &id("did:x:1"), &proof, &inputs)
        .unwrap();
    assert_eq!(svc.verifier().calls.load(Ordering::SeqCst), 1);

    assert_eq!(
        svc.add_identity(&id("0xQ"), &id("did:x:1"), &proof, &inputs),
        Err(RegistryError::AlreadyRegistered)
    );
    assert_eq!(
        svc.add_identity(&id("did:x:1"), &id("0xP"), &proof, &inputs),
        Err(RegistryError::AlreadyRegistered)
    );
    assert_eq!(svc.verifier().calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_member_add_splices_after_caller() {
    let mut svc = service();
    add(&mut svc, "0xP", "0xQ", 1).unwrap();
    add(&mut svc, "0xQ", "did:x:1", 2).unwrap();

    // 0xP → 0xQ → did:x:1 → 0xP
    assert_eq!(svc.get_next_identity("0xP"), "0xQ");
    assert_eq!(svc.get_next_identity("0xQ"), "did:x:1");
    assert_eq!(svc.get_next_identity("did:x:1"), "0xP");
    assert_eq!(svc.get_public_key("did:x:1"), key(2, 102));
    assert_eq!(svc.events().len(), 2);

    let snap = svc.snapshot();
    assert_eq!(snap.cycles.len(), 1);
    assert_eq!(snap.cycles[0].principal, id("0xP"));
    assert_eq!(snap.cycles[0].identities.len(), 2);
}

#[test]
fn test_member_cannot_remove_its_anchor() {
    let mut svc = service();
    add(&mut svc, "0xP", "0xQ", 1).unwrap();
    add(&mut svc, "0xP", "did:p:1", 2).unwrap();
    // 0xP → did:p:1 → 0xQ → 0xP

    let err = remove(&mut svc, "0xQ", "0xP").unwrap_err();
    assert_eq!(
        err.to_string(),
        "toBeRemovedIdentity is not part of msg.sender's circular linked list of identities"
    );
    assert!(svc.is_registered("0xP"));

    remove(&mut svc, "0xQ", "did:p:1").unwrap();
    assert_eq!(svc.get_next_identity("0xP"), "0xQ");
    assert_eq!(svc.get_next_identity("0xQ"), "0xP");
    assert!(svc.get_public_key("did:p:1").is_zero());
}

#[test]
fn test_caller_cannot_add_itself() {
    let mut svc = RegistryService::new(FixedVerdictVerifier::accept_all());
    let (proof, inputs) = valid(1, 2);
    assert_eq!(
        svc.add_identity(&id("0xP"), &id("0xP"), &proof, &inputs),
        Err(RegistryError::AlreadyRegistered)
    );
    assert_eq!(svc.get_next_identity("0xP"), "");
}

#[test]
fn test_inputs_are_passed_through_unchecked() {
    // [x, y, x', y'] with x' != x is not the verifier-facing convention,
    // but the registry does not police it.
    let mut svc = RegistryService::new(FixedVerdictVerifier::accept_all());
    let inputs = PublicInputs::new(vec![
        FieldElement::from(1u64),
        FieldElement::from(2u64),
        FieldElement::from(3u64),
        FieldElement::from(4u64),
    ]);
    let (proof, _) = valid(1, 2);
    svc.add_identity(&id("0xP"), &id("did:x:1"), &proof, &inputs)
        .unwrap();
    assert_eq!(svc.get_public_key("did:x:1"), key(1, 2));
}

// ─── Snapshot and replay ─────────────────────────────────────────────

#[test]
fn test_snapshot_restore_reproduces_state() {
    let mut svc = service();
    add(&mut svc, "0xP", "did:p:1", 1).unwrap();
    add(&mut svc, "0xP", "did:p:2", 2).unwrap();
    add(&mut svc, "0xQ", "did:q:1", 3).unwrap();
    add(&mut svc, "0xR", "did:r:1", 4).unwrap();
    remove(&mut svc, "0xR", "did:r:1").unwrap();

    let snap = svc.snapshot();
    let json = serde_json::to_string(&snap).unwrap();
    let parsed: RegistrySnapshot = serde_json::from_str(&json).unwrap();

    let restored = RegistryService::from_snapshot(DigestVerifier, &parsed).unwrap();
    assert_eq!(restored.state_digest().unwrap(), svc.state_digest().unwrap());
    for name in ["0xP", "did:p:2", "did:p:1", "0xQ", "did:q:1", "0xR", "did:r:1"] {
        assert_eq!(restored.get_next_identity(name), svc.get_next_identity(name));
        assert_eq!(restored.get_public_key(name), svc.get_public_key(name));
    }
}

#[test]
fn test_state_digest_is_pinned() {
    let mut svc = RegistryService::new(FixedVerdictVerifier::accept_all());
    assert_eq!(
        svc.state_digest().unwrap().to_hex(),
        "9e7461d0ece50ab7fb14dc635233b4a634f191b5b1650a39a1e74045b4d5289e"
    );
    let (proof, inputs) = valid(11, 12);
    svc.add_identity(&id("0xP"), &id("did:x:1"), &proof, &inputs)
        .unwrap();
    assert_eq!(
        svc.state_digest().unwrap().to_hex(),
        "9bf0b1711fed3a7e95cb4ac45ae9114b61c9798828e1fe924056cf7674d7d9a9"
    );
}

#[test]
fn test_replay_from_snapshot_is_deterministic() {
    let mut seed = service();
    add(&mut seed, "0xP", "did:p:1", 1).unwrap();
    let snap = seed.snapshot();

    let (proof, inputs) = valid(9, 10);
    let log = OperationLog {
        operations: vec![
            Operation::Add {
                caller: id("0xP"),
                identity: id("did:p:2"),
                proof: proof.clone(),
                inputs: inputs.clone(),
            },
            Operation::Remove {
                caller: id("0xP"),
                identity: id("did:p:1"),
            },
            Operation::Add {
                caller: id("0xQ"),
                identity: id("did:p:2"),
                proof,
                inputs,
            },
        ],
    };
    let yaml = serde_yaml::to_string(&log).unwrap();
    let parsed = OperationLog::from_yaml(&yaml).unwrap();

    let mut a = RegistryService::from_snapshot(DigestVerifier, &snap).unwrap();
    let mut b = RegistryService::from_snapshot(DigestVerifier, &snap).unwrap();
    let ra = replay(&mut a, &log).unwrap();
    let rb = replay(&mut b, &parsed).unwrap();
    assert_eq!(ra, rb);
    assert_eq!(ra.applied(), 2);
    assert_eq!(ra.digest, a.state_digest().unwrap().to_hex());
}

// ─── Property tests ──────────────────────────────────────────────────

mod proptests {
    use super::*;
    use proptest::prelude::*;

    const POOL: [&str; 8] = ["0xA", "0xB", "0xC", "did:1", "did:2", "did:3", "did:4", "did:5"];

    #[derive(Debug, Clone)]
    enum Op {
        Add { caller: usize, target: usize, honest: bool },
        Remove { caller: usize, target: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            2 => (0..POOL.len(), 0..POOL.len(), prop::bool::weighted(0.85))
                .prop_map(|(caller, target, honest)| Op::Add { caller, target, honest }),
            1 => (0..POOL.len(), 0..POOL.len())
                .prop_map(|(caller, target)| Op::Remove { caller, target }),
        ]
    }

    /// Reference model: anchor → identities in traversal order.
    #[derive(Default)]
    struct Model {
        cycles: BTreeMap<String, Vec<String>>,
    }

    impl Model {
        fn is_member(&self, name: &str) -> bool {
            self.cycles.values().any(|c| c.iter().any(|i| i == name))
        }

        fn is_registered(&self, name: &str) -> bool {
            self.cycles.contains_key(name) || self.is_member(name)
        }

        /// The cycle `name` belongs to, and the index right after `name`.
        fn slot_after(&mut self, name: &str) -> Option<(&mut Vec<String>, usize)> {
            if self.cycles.contains_key(name) {
                return self.cycles.get_mut(name).map(|c| (c, 0));
            }
            self.cycles.values_mut().find_map(|c| {
                let pos = c.iter().position(|i| i == name)?;
                Some((c, pos + 1))
            })
        }

        fn add(&mut self, caller: &str, target: &str, honest: bool) -> Result<(), RegistryError> {
            if self.is_registered(target) || caller == target {
                return Err(RegistryError::AlreadyRegistered);
            }
            if !honest {
                return Err(RegistryError::InvalidProof);
            }
            match self.slot_after(caller) {
                Some((cycle, at)) => cycle.insert(at, target.to_string()),
                None => {
                    self.cycles.insert(caller.to_string(), vec![target.to_string()]);
                }
            }
            Ok(())
        }

        fn remove(&mut self, caller: &str, target: &str) -> Result<(), RegistryError> {
            if !self.is_registered(caller) {
                return Err(RegistryError::SenderNotRegistered);
            }
            if !self.is_registered(target) {
                return Err(RegistryError::TargetNotRegistered);
            }
            if caller == target || self.cycles.contains_key(target) {
                return Err(RegistryError::TargetNotInCallersCycle);
            }
            let Some((cycle, _)) = self.slot_after(caller) else {
                return Err(RegistryError::SenderNotRegistered);
            };
            match cycle.iter().position(|i| i == target) {
                Some(pos) => {
                    cycle.remove(pos);
                    Ok(())
                }
                None => Err(RegistryError::TargetNotInCallersCycle),
            }
        }
    }

    fn key_for(target: usize) -> u64 {
        target as u64 + 1
    }

    fn check_structure(
        svc: &RegistryService<DigestVerifier>,
        model: &Model,
    ) -> Result<(), TestCaseError> {
        for (anchor, identities) in &model.cycles {
            let mut walked = Vec::new();
            let mut cursor = svc.get_next_identity(anchor).to_string();
            while cursor != *anchor {
                prop_assert!(!cursor.is_empty(), "cycle of {} is broken", anchor);
                prop_assert!(walked.len() <= POOL.len(), "cycle of {} does not close", anchor);
                walked.push(cursor.clone());
                cursor = svc.get_next_identity(&cursor).to_string();
            }
            prop_assert_eq!(&walked, identities);
            prop_assert!(svc.get_public_key(anchor).is_zero());
        }
        for (index, name) in POOL.iter().enumerate() {
            prop_assert_eq!(svc.is_registered(name), model.is_registered(name));
            if model.is_member(name) {
                let x = key_for(index);
                prop_assert_eq!(svc.get_public_key(name), key(x, x + 7));
            } else {
                prop_assert!(svc.get_public_key(name).is_zero());
            }
            if !model.is_registered(name) {
                prop_assert_eq!(svc.get_next_identity(name), "");
            }
        }
        Ok(())
    }

    proptest! {
        /// Every interleaving of adds and removes agrees with the model,
        /// and a rejected operation never changes the state digest.
        #[test]
        fn interleavings_preserve_cycle_invariants(ops in prop::collection::vec(op(), 0..48)) {
            let mut svc = service();
            let mut model = Model::default();

            for op in ops {
                let before = svc.state_digest().unwrap();
                let (actual, expected) = match op {
                    Op::Add { caller, target, honest } => {
                        let x = key_for(target);
                        let (proof, inputs) = if honest { valid(x, x + 7) } else { forged(x, x + 7) };
                        let actual = svc
                            .add_identity(&id(POOL[caller]), &id(POOL[target]), &proof, &inputs)
                            .map(|_| ());
                        (actual, model.add(POOL[caller], POOL[target], honest))
                    }
                    Op::Remove { caller, target } => (
                        svc.remove_identity(&id(POOL[caller]), &id(POOL[target])),
                        model.remove(POOL[caller], POOL[target]),
                    ),
                };
                prop_assert_eq!(&actual, &expected);
                if actual.is_err() {
                    prop_assert_eq!(svc.state_digest().unwrap(), before);
                }
                check_structure(&svc, &model)?;
            }
        }

        /// Restoring a snapshot of any reachable state reproduces its digest.
        #[test]
        fn snapshot_restore_is_faithful(ops in prop::collection::vec(op(), 0..32)) {
            let mut svc = service();
            for op in ops {
                let _ = match op {
                    Op::Add { caller, target, honest } => {
                        let x = key_for(target);
                        let (proof, inputs) = if honest { valid(x, x + 7) } else { forged(x, x + 7) };
                        svc.add_identity(&id(POOL[caller]), &id(POOL[target]), &proof, &inputs)
                            .map(|_| ())
                    }
                    Op::Remove { caller, target } => {
                        svc.remove_identity(&id(POOL[caller]), &id(POOL[target]))
                    }
                };
            }
            let restored = RegistryService::from_snapshot(DigestVerifier, &svc.snapshot()).unwrap();
            prop_assert_eq!(restored.snapshot(), svc.snapshot());
            prop_assert_eq!(restored.state_digest().unwrap(), svc.state_digest().unwrap());
        }
    }
}
