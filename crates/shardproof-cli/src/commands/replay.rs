//! `shardproof replay` — Generate or check a replay proof.

use clap::Args;
use std::path::PathBuf;

use shardproof_attestation::{ChallengeSource, OsChallengeSource, ReplayProof};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Comma-separated per-epoch losses, e.g. `0.82,0.71,0.65`.
    #[arg(short, long)]
    pub losses: String,

    /// Training seed of the round.
    #[arg(short, long)]
    pub seed: i64,

    /// Challenge seed. Drawn at random when omitted.
    #[arg(short, long)]
    pub challenge: Option<u64>,

    /// Check this proof (or worker update) JSON instead of generating one.
    #[arg(long, conflicts_with = "challenge")]
    pub check: Option<PathBuf>,
}

pub fn run(args: &ReplayArgs) -> anyhow::Result<()> {
    let losses = super::parse_losses(&args.losses)?;

    if let Some(path) = &args.check {
        let proof: ReplayProof = serde_json::from_slice(&super::read_input(path)?)
            .map_err(|e| anyhow::anyhow!("invalid replay proof JSON: {}", e))?;
        let result = proof.verify(&losses, args.seed);
        if result.is_valid() {
            println!(
                "Replay proof is VALID ({} epochs, challenge {})",
                proof.epoch_count(),
                proof.challenge_seed
            );
            return Ok(());
        }
        anyhow::bail!("replay proof is INVALID: {}", result);
    }

    let challenge = args
        .challenge
        .unwrap_or_else(|| OsChallengeSource.draw());
    let proof = ReplayProof::generate(&losses, args.seed, challenge);
    println!("{}", serde_json::to_string_pretty(&proof)?);
    Ok(())
}
