//! # Query Subcommand
//!
//! Read-only lookups against a registry snapshot.
//!
//! - `next <ID>` — the identifier after `ID` in its cycle (empty line for
//!   the never-linked sentinel).
//! - `pubkey <ID>` — the bound public key, `(0, 0)` if none.
//! - `cycle <PRINCIPAL>` — the principal's identities, newest first.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use odim_state::RegistryService;
use odim_zkp::FixedVerdictVerifier;

use crate::config::Config;
use crate::state::load_snapshot_or_empty;

/// Arguments for `odim query`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Snapshot to query.
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: QueryCommand,
}

/// Query subcommands.
#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Print the next identifier in the cycle.
    Next {
        /// Identifier to look up.
        id: String,
    },
    /// Print the public key bound to an identifier.
    Pubkey {
        /// Identifier to look up.
        id: String,
    },
    /// List a principal's identities, most recent first.
    Cycle {
        /// Anchoring principal.
        principal: String,
    },
}

/// Execute `odim query`.
pub fn run_query(args: &QueryArgs, config: &Config) -> Result<u8> {
    let state_path = config.state_path(args.state.as_deref());
    let snapshot = load_snapshot_or_empty(state_path.as_deref())?;
    // Queries never consult the verifier.
    let service = RegistryService::from_snapshot(FixedVerdictVerifier::reject_all(), &snapshot)
        .context("snapshot violates registry invariants")?;
    for line in answer(&service, &args.command) {
        println!("{line}");
    }
    Ok(0)
}

/// The lines printed for `command`.
pub fn answer<V>(service: &RegistryService<V>, command: &QueryCommand) -> Vec<String> {
    match command {
        QueryCommand::Next { id } => vec![service.get_next_identity(id).to_string()],
        QueryCommand::Pubkey { id } => vec![service.get_public_key(id).to_string()],
        QueryCommand::Cycle { principal } => service
            .identities_of(principal)
            .map(|identity| identity.to_string())
            .collect(),
    }
}
