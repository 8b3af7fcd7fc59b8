//! # odim-state — Identity Registry State Machine
//!
//! Binds off-chain identities to principals. Each principal owns a circular
//! list of the identities it has added; every identity carries the public
//! key proven at the time it was added.
//!
//! ## Architecture
//!
//! - **Registry** (`registry.rs`): the forest of per-principal cycles over
//!   an interned arena, with plan/commit link and unlink.
//!
//! - **Keys** (`keys.rs`): identifier → public key, zero pair by default.
//!
//! - **Service** (`service.rs`): [`RegistryService`], the public operation
//!   surface. Checks every precondition, consults the [`ProofVerifier`],
//!   then commits to both stores together.
//!
//! - **Snapshot** (`snapshot.rs`): sorted, canonical state capture, restore,
//!   and the SHA-256 state digest.
//!
//! - **Replay** (`replay.rs`): deterministic application of an operation
//!   log with per-operation outcomes.
//!
//! ## Determinism
//!
//! No operation reads a clock, draws randomness, or performs I/O. The same
//! operations applied to the same starting snapshot always produce the same
//! outcomes, events, and state digest.
//!
//! [`ProofVerifier`]: odim_zkp::ProofVerifier

pub mod error;
pub mod events;
pub mod keys;
pub mod registry;
pub mod replay;
pub mod service;
pub mod snapshot;

pub use error::{RegistryError, SnapshotError};
pub use events::{IdentityAdded, RegistryEvent};
pub use keys::PublicKeyStore;
pub use registry::{CycleIter, IdentityHandle, IdentityRegistry, LinkPlan, NodeRole, UnlinkPlan};
pub use replay::{replay, Operation, OperationLog, OutcomeStatus, ReplayError, ReplayOutcome, ReplayReport};
pub use service::RegistryService;
pub use snapshot::{BoundIdentity, CycleSnapshot, RegistrySnapshot};
