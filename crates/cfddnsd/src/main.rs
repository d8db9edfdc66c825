// # cfddnsd - Cloudflare dynamic DNS daemon
//
// Thin integration layer: parses flags, wires the HTTP IP source, the
// Cloudflare provider and the in-memory state store into the engine, and
// runs it until SIGINT/SIGTERM. All update logic lives in cfddns-core.
//
// ## Example
//
// ```bash
// export CF_API_KEY=your_global_api_key
// export CF_EMAIL=admin@example.com
//
// cfddnsd --targetZone example.com --targetRecord home.example.com
// ```

mod cli;

use anyhow::{Context, Result};
use cfddns_core::config::DdnsConfig;
use cfddns_core::state::MemoryStateStore;
use cfddns_core::DdnsEngine;
use cfddns_ip_http::HttpIpSource;
use cfddns_provider_cloudflare::{CloudflareProvider, ProviderOptions};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let args = cli::Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = args.to_config();
    if let Err(e) = config.validate() {
        error!("{}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting");
    info!("Target zone: {}", config.updater.target_zone);
    info!("Target host record: {}", config.updater.target_record);
    info!("Email address: {}", config.updater.email);
    info!("API key: {}", config.updater.masked_api_key());
    if args.dry_run {
        info!("Dry-run mode: the record will not be modified");
    }

    let engine = match build_engine(&config, args.dry_run) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = engine.run().await {
            error!("Daemon error: {}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Construct every component and hand them to the engine
fn build_engine(config: &DdnsConfig, dry_run: bool) -> Result<DdnsEngine> {
    let ip_source =
        HttpIpSource::new(&config.ip_source).context("Failed to create IP source")?;

    let provider = CloudflareProvider::new(
        &config.updater,
        ProviderOptions {
            dry_run,
            ..ProviderOptions::default()
        },
    )
    .context("Failed to create Cloudflare provider")?;

    let (engine, event_rx) = DdnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        Box::new(MemoryStateStore::new()),
        config,
    )
    .context("Failed to create engine")?;

    // The engine logs every tick itself; nothing else consumes events here.
    drop(event_rx);

    Ok(engine)
}
