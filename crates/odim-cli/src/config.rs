//! # CLI Configuration
//!
//! Loaded from the YAML file named by `--config`, or [`Config::default`]
//! when no file is given:
//!
//! ```yaml
//! state: registry.json
//! verifier:
//!   backend: groth16
//!   verifying_key: keys/verification.key
//!   fq2_order: real-first
//! ```
//!
//! The snapshot path resolves in this order: the subcommand's `--state`
//! flag, then the `ODIM_STATE` environment variable, then `state` from the
//! file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use odim_zkp::{DigestVerifier, FixedVerdictVerifier, ProofVerifier};

/// Environment variable naming the default snapshot path.
pub const STATE_ENV: &str = "ODIM_STATE";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default registry snapshot path.
    pub state: Option<PathBuf>,
    /// Which proof verifier to wire into the registry.
    pub verifier: VerifierConfig,
}

/// Proof verifier backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "kebab-case")]
pub enum VerifierConfig {
    /// Digest-bound development proofs (see `odim prove`).
    #[default]
    Mock,
    /// Accept every proof. Testing only.
    AcceptAll,
    /// Reject every proof. Testing only.
    RejectAll,
    /// BN254 Groth16 against a ZoKrates verification key.
    Groth16 {
        verifying_key: PathBuf,
        #[serde(default)]
        fq2_order: Fq2Layout,
    },
}

/// Component order of G2 coordinates in proof and key files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fq2Layout {
    #[default]
    RealFirst,
    ImaginaryFirst,
}

impl Config {
    /// Load from `path`, or return the default when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), backend = config.verifier.name(), "loaded config");
        Ok(config)
    }

    /// Resolve the snapshot path from the flag, the environment, and the file.
    pub fn state_path(&self, flag: Option<&Path>) -> Option<PathBuf> {
        self.state_path_with_env(flag, std::env::var_os(STATE_ENV).map(PathBuf::from))
    }

    fn state_path_with_env(&self, flag: Option<&Path>, env: Option<PathBuf>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or(env.filter(|p| !p.as_os_str().is_empty()))
            .or_else(|| self.state.clone())
    }
}

impl VerifierConfig {
    /// Short backend name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::AcceptAll => "accept-all",
            Self::RejectAll => "reject-all",
            Self::Groth16 { .. } => "groth16",
        }
    }

    /// Construct the configured verifier.
    pub fn build(&self) -> Result<Box<dyn ProofVerifier>> {
        let verifier: Box<dyn ProofVerifier> = match self {
            Self::Mock => Box::new(DigestVerifier),
            Self::AcceptAll => Box::new(FixedVerdictVerifier::accept_all()),
            Self::RejectAll => Box::new(FixedVerdictVerifier::reject_all()),
            Self::Groth16 {
                verifying_key,
                fq2_order,
            } => build_groth16(verifying_key, *fq2_order)?,
        };
        tracing::debug!(backend = verifier.backend(), "proof verifier ready");
        Ok(verifier)
    }
}

#[cfg(feature = "groth16")]
fn build_groth16(verifying_key: &Path, layout: Fq2Layout) -> Result<Box<dyn ProofVerifier>> {
    use odim_zkp::{Fq2Order, Groth16Verifier};

    let order = match layout {
        Fq2Layout::RealFirst => Fq2Order::RealFirst,
        Fq2Layout::ImaginaryFirst => Fq2Order::ImaginaryFirst,
    };
    let json = std::fs::read_to_string(verifying_key)
        .with_context(|| format!("failed to read verifying key {}", verifying_key.display()))?;
    let verifier = Groth16Verifier::from_json(&json, order)
        .with_context(|| format!("invalid verifying key {}", verifying_key.display()))?;
    Ok(Box::new(verifier))
}

#[cfg(not(feature = "groth16"))]
fn build_groth16(_verifying_key: &Path, _layout: Fq2Layout) -> Result<Box<dyn ProofVerifier>> {
    anyhow::bail!("the groth16 verifier backend requires building odim with `--features groth16`")
}
