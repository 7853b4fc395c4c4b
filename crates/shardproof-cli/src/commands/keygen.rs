//! `shardproof keygen` — Generate a new worker secret key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Args, ValueEnum};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use shardproof_core::{IdentityOptions, KeyDecoding};
use shardproof_crypto::{secret_env_vars, IdentityStore, SECRET_KEY_LENGTH};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SecretEncoding {
    Base64,
    Hex,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Node id the key is for.
    #[arg(short, long, default_value = "worker-1")]
    pub node_id: String,

    /// Encoding of the printed secret.
    #[arg(short, long, value_enum, default_value = "base64")]
    pub encoding: SecretEncoding,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    let mut seed = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
    OsRng.fill_bytes(&mut seed[..]);

    let secret = Zeroizing::new(match args.encoding {
        SecretEncoding::Base64 => STANDARD.encode(&seed[..]),
        SecretEncoding::Hex => hex::encode(&seed[..]),
    });

    // Hex text also parses as base64, so only strict decoding reads it as hex.
    let options = IdentityOptions {
        key_decoding: match args.encoding {
            SecretEncoding::Base64 => KeyDecoding::Lenient,
            SecretEncoding::Hex => KeyDecoding::Strict,
        },
        ..Default::default()
    };
    let identity =
        IdentityStore::initialize(args.node_id.clone(), Some(secret.as_str()), &options)?;
    let [env_var, _] = secret_env_vars(&args.node_id);

    println!("Generated worker key for {}", identity.node_id());
    println!("  Secret:      {}", secret.as_str());
    println!("  Public key:  {}", identity.public_key_base64());
    println!("  Address:     {}", identity.address());
    println!();
    println!("Set it for the worker with:");
    println!("  export {}={}", env_var, secret.as_str());
    if options.key_decoding == KeyDecoding::Strict {
        println!("and key_decoding = \"strict\" in the [identity] section of its config.");
    }

    Ok(())
}
