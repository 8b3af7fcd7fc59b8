//! # odim CLI entry point
//!
//! Parses command-line arguments, loads configuration, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use odim_cli::config::Config;
use odim_cli::digest::{run_digest, DigestArgs};
use odim_cli::prove::{run_prove, ProveArgs};
use odim_cli::query::{run_query, QueryArgs};
use odim_cli::replay::{run_replay, ReplayArgs};

/// ODIM identity registry toolchain.
///
/// Replays add/remove operation logs against registry snapshots, answers
/// queries, mints development proofs, and prints state digests for
/// cross-validator comparison.
#[derive(Parser, Debug)]
#[command(name = "odim", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply an operation log and print outcomes and the state digest.
    Replay(ReplayArgs),

    /// Look up identities and keys in a snapshot.
    Query(QueryArgs),

    /// Mint a development proof bundle for a public key.
    Prove(ProveArgs),

    /// Print the state digest of a snapshot.
    Digest(DigestArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "odim CLI starting");

    let result = Config::load(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Replay(args) => run_replay(args, &config),
        Commands::Query(args) => run_query(args, &config),
        Commands::Prove(args) => run_prove(args, &config),
        Commands::Digest(args) => run_digest(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_replay() {
        let cli = Cli::try_parse_from([
            "odim",
            "replay",
            "ops.yaml",
            "--state",
            "registry.json",
            "--write-state",
        ])
        .unwrap();
        if let Commands::Replay(args) = cli.command {
            assert_eq!(args.log, PathBuf::from("ops.yaml"));
            assert_eq!(args.state, Some(PathBuf::from("registry.json")));
            assert!(args.write_state);
        } else {
            panic!("expected replay");
        }
    }

    #[test]
    fn cli_parse_query_next() {
        let cli =
            Cli::try_parse_from(["odim", "query", "next", "0xP", "--state", "s.json"]).unwrap();
        if let Commands::Query(args) = cli.command {
            assert_eq!(args.state, Some(PathBuf::from("s.json")));
            assert!(matches!(
                args.command,
                odim_cli::query::QueryCommand::Next { ref id } if id == "0xP"
            ));
        } else {
            panic!("expected query");
        }
    }

    #[test]
    fn cli_parse_query_cycle_and_pubkey() {
        assert!(Cli::try_parse_from(["odim", "query", "cycle", "0xP"]).is_ok());
        assert!(Cli::try_parse_from(["odim", "query", "pubkey", "did:x:1"]).is_ok());
    }

    #[test]
    fn cli_parse_prove() {
        let cli = Cli::try_parse_from(["odim", "prove", "--x", "11", "--y", "0x0c"]).unwrap();
        if let Commands::Prove(args) = cli.command {
            assert_eq!(args.x.to_string(), "11");
            assert_eq!(args.y.to_string(), "12");
        } else {
            panic!("expected prove");
        }
    }

    #[test]
    fn cli_parse_prove_rejects_separators() {
        assert!(Cli::try_parse_from(["odim", "prove", "--x", "1,000", "--y", "1"]).is_err());
    }

    #[test]
    fn cli_parse_digest() {
        let cli = Cli::try_parse_from(["odim", "digest"]).unwrap();
        assert!(matches!(cli.command, Commands::Digest(DigestArgs { state: None })));
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli0 = Cli::try_parse_from(["odim", "digest"]).unwrap();
        assert_eq!(cli0.verbose, 0);

        let cli2 = Cli::try_parse_from(["odim", "-vv", "digest"]).unwrap();
        assert_eq!(cli2.verbose, 2);

        let cli3 = Cli::try_parse_from(["odim", "digest", "-vvv"]).unwrap();
        assert_eq!(cli3.verbose, 3);
    }

    #[test]
    fn cli_parse_config_option() {
        let cli = Cli::try_parse_from(["odim", "--config", "odim.yaml", "digest"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("odim.yaml")));
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["odim"]).is_err());
    }
}
