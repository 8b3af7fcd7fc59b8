//! # Replay Subcommand
//!
//! Applies an operation log to a registry restored from a snapshot (or to
//! an empty one), prints each outcome and event, and finishes with the
//! state digest. With `--write-state` the resulting snapshot is written
//! back to the snapshot path.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use odim_state::{replay, RegistryService, ReplayReport};

use crate::config::Config;
use crate::state::{load_log, load_snapshot_or_empty, write_snapshot};

/// Arguments for `odim replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Operation log (YAML, or JSON if the name ends in `.json`).
    pub log: PathBuf,

    /// Starting snapshot. A missing file means an empty registry.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Write the resulting snapshot back to the snapshot path.
    #[arg(long)]
    pub write_state: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

/// How the replay report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Execute `odim replay`.
pub fn run_replay(args: &ReplayArgs, config: &Config) -> Result<u8> {
    let state_path = config.state_path(args.state.as_deref());
    if args.write_state && state_path.is_none() {
        bail!("--write-state needs a snapshot path (--state, ODIM_STATE, or `state` in the config)");
    }

    let log = load_log(&args.log)?;
    let snapshot = load_snapshot_or_empty(state_path.as_deref())?;
    let verifier = config.verifier.build()?;
    let mut service = RegistryService::from_snapshot(verifier, &snapshot)
        .context("snapshot violates registry invariants")?;

    tracing::info!(
        log = %args.log.display(),
        operations = log.len(),
        backend = config.verifier.name(),
        "replaying operation log"
    );
    let report = replay(&mut service, &log)?;

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&report)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if args.write_state {
        if let Some(path) = &state_path {
            write_snapshot(path, &service.snapshot())?;
        }
    }
    Ok(0)
}

/// Human-readable report: outcomes, events, summary, digest.
pub fn render_text(report: &ReplayReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        out.push_str(&format!("{outcome}\n"));
    }
    if !report.events.is_empty() {
        out.push_str("events:\n");
        for event in &report.events {
            out.push_str(&format!("  {event}\n"));
        }
    }
    out.push_str(&format!(
        "applied {} of {} operations\n",
        report.applied(),
        report.outcomes.len()
    ));
    out.push_str(&format!("digest: {}\n", report.digest));
    out
}
