//! `shardproof verify` — Verify a worker update or a bare attestation.

use clap::Args;
use std::path::PathBuf;

use shardproof_attestation::{
    Attestation, AttestationVerifier, TrainingClaims, VerificationResult, WorkerUpdate,
};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Worker update JSON, or an attestation when `--claims` is given. `-` reads stdin.
    pub input: PathBuf,

    /// Training claims JSON the attestation should cover.
    #[arg(long)]
    pub claims: Option<PathBuf>,

    /// Expected signer key, as `NODE_ID=BASE64_PUBLIC_KEY`. Repeatable.
    #[arg(long = "pin", value_name = "NODE_ID=KEY")]
    pub pins: Vec<String>,
}

pub fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let mut verifier = AttestationVerifier::new();
    for pin in &args.pins {
        let (node_id, key) = pin
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid --pin {:?}, expected NODE_ID=KEY", pin))?;
        tracing::debug!(node_id, "pinning signer key");
        verifier.pin_key(node_id, key);
    }

    let input = super::read_input(&args.input)?;
    let result = match &args.claims {
        Some(claims_path) => {
            let attestation: Attestation = serde_json::from_slice(&input)
                .map_err(|e| anyhow::anyhow!("invalid attestation JSON: {}", e))?;
            let claims: TrainingClaims = serde_json::from_slice(&super::read_input(claims_path)?)
                .map_err(|e| anyhow::anyhow!("invalid claims JSON: {}", e))?;
            verifier.verify(&attestation, &claims)?
        }
        None => {
            let update: WorkerUpdate = serde_json::from_slice(&input)
                .map_err(|e| anyhow::anyhow!("invalid worker update JSON: {}", e))?;
            update.verify(&verifier)?
        }
    };

    print_result(&result);

    if !result.valid {
        anyhow::bail!("verification failed");
    }
    Ok(())
}

fn print_result(result: &VerificationResult) {
    if result.valid {
        println!("Attestation is VALID");
    } else {
        println!("Attestation is INVALID");
    }
    println!();
    for check in &result.checks {
        let icon = if check.passed { "PASS" } else { "FAIL" };
        print!("  [{}] {}", icon, check.name);
        if let Some(ref detail) = check.detail {
            print!(": {}", detail);
        }
        println!();
    }
}
