//! Configuration types for the updater
//!
//! Configuration is built once at startup and never mutated afterwards.
//! Components receive the parts they need by reference or as clones.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default IP-echo endpoint
pub const DEFAULT_IP_SOURCE_URL: &str = "https://api.ipify.org";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Provider credentials and target
    pub updater: UpdaterConfig,

    /// IP-echo endpoint settings
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Tick timing
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration with default timing for the given target
    pub fn new(updater: UpdaterConfig) -> Self {
        Self {
            updater,
            ip_source: IpSourceConfig::default(),
            schedule: ScheduleConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.updater.validate()?;
        self.ip_source.validate()?;
        self.schedule.validate()?;

        if self.engine.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

/// Provider credentials and the record to keep up to date
#[derive(Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Provider API key
    pub api_key: String,

    /// Account email paired with the API key
    pub email: String,

    /// Zone name in which the record is found (e.g. "example.com")
    pub target_zone: String,

    /// Full name of the record to update (e.g. "home.example.com")
    pub target_record: String,
}

// The API key must never reach the logs through `{:?}`.
impl std::fmt::Debug for UpdaterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdaterConfig")
            .field("api_key", &"<REDACTED>")
            .field("email", &self.email)
            .field("target_zone", &self.target_zone)
            .field("target_record", &self.target_record)
            .finish()
    }
}

impl UpdaterConfig {
    /// Create a new updater configuration
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        target_zone: impl Into<String>,
        target_record: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            email: email.into(),
            target_zone: target_zone.into(),
            target_record: target_record.into(),
        }
    }

    /// Reject empty values
    pub fn validate(&self) -> Result<(), crate::Error> {
        let fields = [
            ("apiKey", &self.api_key),
            ("email", &self.email),
            ("targetZone", &self.target_zone),
            ("targetRecord", &self.target_record),
        ];

        for (flag, value) in fields {
            if value.trim().is_empty() {
                return Err(crate::Error::config(format!("{} cannot be empty", flag)));
            }
        }

        Ok(())
    }

    /// API key with everything but the last four characters masked
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }

        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

/// IP-echo endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// URL whose response body is the caller's address
    #[serde(default = "default_ip_source_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_ip_source_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("IP source URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "IP source URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("IP source timeout must be > 0"));
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            url: default_ip_source_url(),
            timeout_secs: default_ip_source_timeout_secs(),
        }
    }
}

/// Tick timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Fire the first tick on the next wall-clock multiple of the interval
    /// instead of immediately
    #[serde(default = "default_align_to_boundary")]
    pub align_to_boundary: bool,
}

impl ScheduleConfig {
    /// Validate the schedule
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Tick interval must be > 0"));
        }
        Ok(())
    }

    /// Interval between ticks
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            align_to_boundary: default_align_to_boundary(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the engine event channel
    ///
    /// When full, further events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_ip_source_url() -> String {
    DEFAULT_IP_SOURCE_URL.to_string()
}

fn default_ip_source_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    60
}

fn default_align_to_boundary() -> bool {
    true
}

fn default_event_channel_capacity() -> usize {
    100
}
