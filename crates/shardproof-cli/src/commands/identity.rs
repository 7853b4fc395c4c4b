//! `shardproof identity` — Show the identity a secret resolves to.

use clap::Args;

use shardproof_core::{IdentityOptions, KeyDecoding, SignatureScheme};
use shardproof_crypto::{secret_env_vars, IdentityStore};

#[derive(Args, Debug)]
pub struct IdentityArgs {
    /// Node id of the worker.
    #[arg(short, long, default_value = "worker-1")]
    pub node_id: String,

    /// Secret (base64, hex, or raw). Defaults to the worker's environment variables.
    #[arg(short, long)]
    pub secret: Option<String>,

    /// Only accept a decoding that yields exactly 32 bytes.
    #[arg(long)]
    pub strict: bool,

    /// Use the insecure development signature scheme.
    #[arg(long)]
    pub insecure_dev: bool,
}

pub fn run(args: &IdentityArgs) -> anyhow::Result<()> {
    let secret = args.secret.clone().or_else(|| {
        secret_env_vars(&args.node_id)
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
    });

    let Some(secret) = secret else {
        let [primary, fallback] = secret_env_vars(&args.node_id);
        anyhow::bail!(
            "no secret given; pass --secret or set {} or {}",
            primary,
            fallback
        );
    };

    let options = IdentityOptions {
        signature_scheme: if args.insecure_dev {
            SignatureScheme::InsecureDevSha256
        } else {
            SignatureScheme::Ed25519
        },
        key_decoding: if args.strict {
            KeyDecoding::Strict
        } else {
            KeyDecoding::Lenient
        },
    };

    let identity =
        IdentityStore::initialize(args.node_id.clone(), Some(secret.as_str()), &options)?;

    println!("Worker Identity:");
    println!("  Node ID:         {}", identity.node_id());
    println!("  Address:         {}", identity.address());
    println!("  Public key:      {}", identity.public_key_base64());
    println!("  Public key hex:  {}", identity.public_key_hex());
    println!("  Scheme:          {}", identity.signature_scheme());
    println!("  Decoded as:      {}", identity.key_origin());

    Ok(())
}
