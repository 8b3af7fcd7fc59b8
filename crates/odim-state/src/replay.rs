//! # Operation Log Replay
//!
//! An [`OperationLog`] is an ordered list of add and remove operations,
//! written as YAML or JSON:
//!
//! ```yaml
//! operations:
//!   - op: add
//!     caller: "0xP"
//!     identity: "did:example:1"
//!     proof: { a: ["1", "2"], b: [["3", "4"], ["5", "6"]], c: ["7", "8"] }
//!     inputs: ["11", "12", "11", "12"]
//!   - op: remove
//!     caller: "0xP"
//!     identity: "did:example:1"
//! ```
//!
//! [`replay`] applies every operation in order. A rejected operation is
//! recorded with its stable failure string and replay continues; the
//! registry is unchanged by it. The report ends with the state digest, so
//! independent validators replaying the same log from the same snapshot
//! can compare a single hash.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use odim_core::Identifier;
use odim_zkp::{Proof, ProofVerifier, PublicInputs};

use crate::error::SnapshotError;
use crate::events::RegistryEvent;
use crate::service::RegistryService;

/// Why a log could not be read or replayed.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("operation log is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation log is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The final state could not be digested.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// One registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Operation {
    /// `addIdentity(caller, identity, proof, inputs)`.
    Add {
        caller: Identifier,
        identity: Identifier,
        proof: Proof,
        inputs: PublicInputs,
    },
    /// `removeIdentity(caller, identity)`.
    Remove {
        caller: Identifier,
        identity: Identifier,
    },
}

impl Operation {
    /// `"add"` or `"remove"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
        }
    }

    /// The principal performing the operation.
    pub fn caller(&self) -> &Identifier {
        match self {
            Self::Add { caller, .. } | Self::Remove { caller, .. } => caller,
        }
    }

    /// The identity being added or removed.
    pub fn identity(&self) -> &Identifier {
        match self {
            Self::Add { identity, .. } | Self::Remove { identity, .. } => identity,
        }
    }
}

/// An ordered operation script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLog {
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl OperationLog {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ReplayError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the log has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// What happened to one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeStatus {
    Ok,
    Rejected {
        /// Short error kind, e.g. `AlreadyRegistered`.
        kind: String,
        /// The stable failure string.
        message: String,
    },
}

/// The outcome of one replayed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    /// Zero-based position in the log.
    pub index: usize,
    pub op: String,
    pub caller: Identifier,
    pub identity: Identifier,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ReplayOutcome {
    /// Whether the operation was applied.
    pub fn is_ok(&self) -> bool {
        matches!(self.status, OutcomeStatus::Ok)
    }
}

impl std::fmt::Display for ReplayOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {} by {}: ",
            self.index, self.op, self.identity, self.caller
        )?;
        match &self.status {
            OutcomeStatus::Ok => write!(f, "ok"),
            OutcomeStatus::Rejected { message, .. } => write!(f, "{message}"),
        }
    }
}

/// Everything a replay produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub outcomes: Vec<ReplayOutcome>,
    /// Events emitted during this replay, in order.
    pub events: Vec<RegistryEvent>,
    /// Hex SHA-256 state digest after the last operation.
    pub digest: String,
}

impl ReplayReport {
    /// Number of operations applied.
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Number of operations rejected.
    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.applied()
    }
}

/// Apply `log` to `service` in order and report the results.
///
/// Events already in the service's stream are left in place and are not
/// part of the report.
pub fn replay<V: ProofVerifier>(
    service: &mut RegistryService<V>,
    log: &OperationLog,
) -> Result<ReplayReport, ReplayError> {
    let first_event = service.events().len();
    let mut outcomes = Vec::with_capacity(log.len());

    for (index, operation) in log.operations.iter().enumerate() {
        let result = match operation {
            Operation::Add {
                caller,
                identity,
                proof,
                inputs,
            } => service
                .add_identity(caller, identity, proof, inputs)
                .map(|_| ()),
            Operation::Remove { caller, identity } => service.remove_identity(caller, identity),
        };
        let status = match result {
            Ok(()) => OutcomeStatus::Ok,
            Err(e) => OutcomeStatus::Rejected {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
        };
        outcomes.push(ReplayOutcome {
            index,
            op: operation.name().to_string(),
            caller: operation.caller().clone(),
            identity: operation.identity().clone(),
            status,
        });
    }

    let digest = service.state_digest()?.to_hex();
    let events = service.events()[first_event..].to_vec();
    let report = ReplayReport {
        outcomes,
        events,
        digest,
    };
    tracing::info!(
        operations = log.len(),
        applied = report.applied(),
        rejected = report.rejected(),
        digest = %report.digest,
        "replay complete"
    );
    Ok(report)
}
