//! Shardproof CLI — Offline tooling for worker identities and attestations.
//!
//! Subcommands: keygen, identity, commit, verify-commit, replay, verify.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Shardproof — verifiable training-round attestation.
#[derive(Parser, Debug)]
#[command(name = "shardproof", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new worker secret key.
    Keygen(commands::keygen::KeygenArgs),
    /// Show the identity a secret resolves to.
    Identity(commands::identity::IdentityArgs),
    /// Compute the commitment hash of a shard.
    Commit(commands::commit::CommitArgs),
    /// Check a revealed shard against a commitment.
    VerifyCommit(commands::verify_commit::VerifyCommitArgs),
    /// Generate or check a replay proof.
    Replay(commands::replay::ReplayArgs),
    /// Verify a worker update or attestation.
    Verify(commands::verify::VerifyArgs),
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Identity(args) => commands::identity::run(args),
        Commands::Commit(args) => commands::commit::run(args),
        Commands::VerifyCommit(args) => commands::verify_commit::run(args),
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Verify(args) => commands::verify::run(args),
    }
}
