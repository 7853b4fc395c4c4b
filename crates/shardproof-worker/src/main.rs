//! Shardproof Worker — entry point.
//!
//! Reads one round request (JSON) from a file or stdin, attests the round,
//! and writes the resulting update to stdout. Logs go to stderr.

mod config;
mod decrypt;
mod error;
mod round;

use anyhow::Context;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use shardproof_crypto::IdentityStore;

use config::{LoggingConfig, WorkerConfig};
use decrypt::HttpDecryptClient;
use round::{ReportedTraining, RoundOutcome, RoundProcessor, RoundRequest};

/// Shardproof Worker
#[derive(Parser, Debug)]
#[command(name = "shardproof-worker", version, about = "Shardproof training-round worker")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "shardproof-worker.toml")]
    config: PathBuf,

    /// Round request JSON file, or `-` for stdin.
    #[arg(short, long, default_value = "-")]
    request: String,

    /// Override the node id.
    #[arg(long)]
    node_id: Option<String>,

    /// Override the coordinator base URL.
    #[arg(long)]
    coordinator_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,

    /// Print the worker identity and exit.
    #[arg(long)]
    show_identity: bool,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_request(source: &str) -> anyhow::Result<RoundRequest> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("reading round request from {}", source))?
    };
    serde_json::from_str(&text).context("invalid round request JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        let config = WorkerConfig::default();
        config.save(&args.config)?;
        eprintln!("wrote default config to {}", args.config.display());
        return Ok(());
    }

    // Load configuration and apply CLI overrides
    let mut config = WorkerConfig::load(&args.config)?;
    if let Some(node_id) = args.node_id {
        config.identity.node_id = node_id;
    }
    if let Ok(url) = std::env::var("COORDINATOR_URL") {
        config.coordinator.url = url;
    }
    if let Some(url) = args.coordinator_url {
        config.coordinator.url = url;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging);
    tracing::info!("Shardproof Worker v{}", env!("CARGO_PKG_VERSION"));

    let secret = config.identity.resolve_secret();
    let identity = Arc::new(IdentityStore::initialize(
        config.identity.node_id.clone(),
        secret.as_deref(),
        &config.identity.options(),
    )?);

    if args.show_identity {
        println!("Node ID:      {}", identity.node_id());
        println!("Address:      {}", identity.address());
        println!("Public key:   {}", identity.public_key_base64());
        println!("Scheme:       {}", identity.signature_scheme());
        println!("Key origin:   {}", identity.key_origin());
        return Ok(());
    }

    let encoder = config.transport.sealer.encoder();
    if !encoder.sealer().is_confidential() {
        tracing::warn!(
            encryption = encoder.sealer().label(),
            "updates sent with a session key are encoded, not encrypted"
        );
    }

    let decryptor = Arc::new(HttpDecryptClient::new(
        &config.coordinator.url,
        config.coordinator.decrypt_timeout(),
    )?);
    tracing::debug!(
        endpoint = decryptor.endpoint(),
        timeout_secs = config.coordinator.decrypt_timeout_secs,
        "decrypt collaborator configured"
    );
    let processor = RoundProcessor::new(
        identity,
        decryptor,
        encoder,
        config.attestation.clone(),
        config.attested_hardware(),
    );

    let request = read_request(&args.request)?;
    let trainer = ReportedTraining(request.training.clone());
    let outcome = processor.process(&request, &trainer).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let RoundOutcome::Failed(failure) = outcome {
        anyhow::bail!("round failed ({:?}): {}", failure.kind, failure.error);
    }
    Ok(())
}
