//! `shardproof commit` — Compute the commitment hash of a shard.

use clap::Args;
use std::path::PathBuf;

use shardproof_attestation::create_commitment;

#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Shard file, or `-` for stdin.
    pub shard: PathBuf,
}

pub fn run(args: &CommitArgs) -> anyhow::Result<()> {
    let plaintext = super::read_input(&args.shard)?;
    println!("{}", create_commitment(&plaintext));
    Ok(())
}
