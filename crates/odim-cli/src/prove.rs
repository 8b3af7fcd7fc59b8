//! # Prove Subcommand
//!
//! Mints a development proof for the key `(x, y)` using the digest-bound
//! mock prover. The output is a proof bundle (proof plus `[x, y, x, y]`
//! inputs) in the same JSON shape proof tooling writes, ready to paste into
//! an operation log. It is accepted only by the `mock` verifier backend.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use odim_core::{FieldElement, PublicKey};
use odim_zkp::{DigestProver, ProofBundle, PublicInputs};

use crate::config::{Config, VerifierConfig};

/// Arguments for `odim prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Public key X coordinate (decimal or 0x-hex).
    #[arg(long)]
    pub x: FieldElement,

    /// Public key Y coordinate (decimal or 0x-hex).
    #[arg(long)]
    pub y: FieldElement,

    /// Write the bundle to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute `odim prove`.
pub fn run_prove(args: &ProveArgs, config: &Config) -> Result<u8> {
    if config.verifier != VerifierConfig::Mock {
        tracing::warn!(
            backend = config.verifier.name(),
            "minted proofs only verify under the mock backend"
        );
    }

    let bundle = mint(&args.x, &args.y)?;
    let json = serde_json::to_string_pretty(&bundle)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("OK: wrote proof bundle to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(0)
}

/// Build the bundle for `(x, y)`.
pub fn mint(x: &FieldElement, y: &FieldElement) -> Result<ProofBundle> {
    let inputs = PublicInputs::for_key(&PublicKey::new(x.clone(), y.clone()));
    let proof = DigestProver
        .prove(&inputs)
        .context("failed to mint development proof")?;
    Ok(ProofBundle { proof, inputs })
}
