//! Command-line arguments

use cfddns_core::config::{DEFAULT_IP_SOURCE_URL, DdnsConfig, IpSourceConfig, UpdaterConfig};
use clap::Parser;
use tracing::Level;

/// Keep a Cloudflare A record pointed at this host's public IPv4 address
///
/// Every flag can also be supplied through the environment variable shown
/// in its help text.
#[derive(Parser)]
#[command(name = "cfddnsd")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Cloudflare global API key
    #[arg(long = "apiKey", env = "CF_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Email address of the Cloudflare account
    #[arg(long, env = "CF_EMAIL")]
    pub email: String,

    /// Zone holding the record, e.g. example.com
    #[arg(long = "targetZone", env = "CF_TARGET_ZONE")]
    pub target_zone: String,

    /// Fully qualified record to keep updated, e.g. home.example.com
    #[arg(long = "targetRecord", env = "CF_TARGET_RECORD")]
    pub target_record: String,

    /// IP-echo service answering with the caller's address as plain text
    #[arg(long, env = "CFDDNS_IP_URL", default_value = DEFAULT_IP_SOURCE_URL)]
    pub ip_url: String,

    /// Seconds between checks
    #[arg(long, env = "CFDDNS_INTERVAL_SECS", default_value_t = 60)]
    pub interval_secs: u64,

    /// Start ticking immediately instead of on the next wall-clock boundary
    #[arg(long)]
    pub no_align: bool,

    /// Look everything up but never write the record
    #[arg(long, env = "CFDDNS_DRY_RUN")]
    pub dry_run: bool,

    /// Log verbosity
    #[arg(
        long,
        env = "CFDDNS_LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,
}

impl Args {
    /// Assemble the engine configuration
    pub fn to_config(&self) -> DdnsConfig {
        let mut config = DdnsConfig::new(UpdaterConfig::new(
            self.api_key.clone(),
            self.email.clone(),
            self.target_zone.clone(),
            self.target_record.clone(),
        ));

        config.ip_source = IpSourceConfig {
            url: self.ip_url.clone(),
            ..IpSourceConfig::default()
        };
        config.schedule.interval_secs = self.interval_secs;
        config.schedule.align_to_boundary = !self.no_align;

        config
    }

    /// Max level for the tracing subscriber
    pub fn log_level(&self) -> Level {
        match self.log_level.as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}
