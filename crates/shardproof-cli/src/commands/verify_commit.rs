//! `shardproof verify-commit` — Check a revealed shard against a commitment.

use clap::Args;
use std::path::PathBuf;

use shardproof_attestation::verify_commitment;

#[derive(Args, Debug)]
pub struct VerifyCommitArgs {
    /// Shard file, or `-` for stdin.
    pub shard: PathBuf,

    /// Published commitment hash (lowercase hex SHA-256).
    #[arg(short, long)]
    pub commit_hash: String,
}

pub fn run(args: &VerifyCommitArgs) -> anyhow::Result<()> {
    let plaintext = super::read_input(&args.shard)?;
    let result = verify_commitment(&plaintext, &args.commit_hash);

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.matches {
        anyhow::bail!("shard does not match commitment");
    }
    Ok(())
}
