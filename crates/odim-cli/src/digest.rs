//! # Digest Subcommand
//!
//! Prints the SHA-256 state digest of a snapshot. Two validators that
//! replayed the same log from the same snapshot print the same line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use odim_state::RegistrySnapshot;

use crate::config::Config;
use crate::state::load_snapshot_or_empty;

/// Arguments for `odim digest`.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Snapshot to digest. Without one, the empty registry is digested.
    #[arg(long)]
    pub state: Option<PathBuf>,
}

/// Execute `odim digest`.
pub fn run_digest(args: &DigestArgs, config: &Config) -> Result<u8> {
    let state_path = config.state_path(args.state.as_deref());
    let snapshot = load_snapshot_or_empty(state_path.as_deref())?;
    println!("{}", state_digest(&snapshot)?);
    Ok(0)
}

/// Restore `snapshot` and return the hex digest of the restored state.
///
/// A file that breaks a registry invariant is rejected rather than
/// digested. The digest is taken over a fresh capture, so the order in
/// which the file lists its principals does not matter.
pub fn state_digest(snapshot: &RegistrySnapshot) -> Result<String> {
    let (registry, keys) = snapshot
        .restore()
        .context("snapshot violates registry invariants")?;
    let digest = RegistrySnapshot::capture(&registry, &keys).digest()?;
    Ok(digest.to_hex())
}
