//! # Registry Events
//!
//! Only successful adds emit an event. Removals are silent.
//!
//! Events carry a per-service sequence number instead of a timestamp, so
//! two replays of the same operations emit identical event streams.

use serde::{Deserialize, Serialize};

use odim_core::Identifier;

/// An identity was linked into a principal's cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAdded {
    /// Position in the service's event stream, starting at 0.
    pub sequence: u64,
    /// The principal that added the identity.
    pub added_by: Identifier,
    /// The identity that was added.
    pub new_identity: Identifier,
}

/// Everything the registry service can emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    IdentityAdded(IdentityAdded),
}

impl RegistryEvent {
    /// The event's sequence number.
    pub fn sequence(&self) -> u64 {
        match self {
            Self::IdentityAdded(e) => e.sequence,
        }
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdentityAdded(e) => write!(
                f,
                "#{} IdentityAdded(addedBy={}, newIdentity={})",
                e.sequence, e.added_by, e.new_identity
            ),
        }
    }
}

impl From<IdentityAdded> for RegistryEvent {
    fn from(event: IdentityAdded) -> Self {
        Self::IdentityAdded(event)
    }
}
