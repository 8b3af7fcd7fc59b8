//! # odim-cli — CLI Tool for the ODIM Identity Registry
//!
//! Provides the `odim` command-line interface over registry snapshots and
//! operation logs.
//!
//! ## Subcommands
//!
//! - `odim replay` — Apply an operation log, print outcomes and the digest.
//! - `odim query` — `next`, `pubkey`, and `cycle` lookups on a snapshot.
//! - `odim prove` — Mint a development proof bundle for a key.
//! - `odim digest` — Print a snapshot's state digest.
//!
//! ```bash
//! odim prove --x 11 --y 12 --out bundle.json
//! odim replay ops.yaml --state registry.json --write-state
//! odim query cycle 0xP --state registry.json
//! odim digest --state registry.json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from handlers; handlers delegate to the
//!   domain crates.
//! - Handlers return `anyhow::Result<u8>`; the binary maps the `u8` to the
//!   process exit code and logs errors before exiting with 1.

pub mod config;
pub mod digest;
pub mod prove;
pub mod query;
pub mod replay;
pub mod state;
