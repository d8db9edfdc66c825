//! Error types for the updater
//!
//! Every failure inside a tick maps onto one of these variants. The engine
//! logs them and moves on to the next tick; none of them is fatal to the
//! process except [`Error::Config`] at startup.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the updater
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, TLS, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from an endpoint that has no richer mapping
    #[error("HTTP error: {0}")]
    Http(String),

    /// The IP-echo service returned something that is not an IPv4 address
    #[error("Invalid IP Address: {0}")]
    InvalidAddress(String),

    /// Credentials rejected or missing
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The configured zone name does not resolve to a zone
    #[error("Zone could not be found: {zone}")]
    ZoneNotFound {
        /// Zone name that was looked up
        zone: String,
    },

    /// No record in the zone carries the target name
    #[error("Couldn't find target record. Options are: {}", available.join(", "))]
    RecordNotFound {
        /// Record name that was looked up
        record: String,
        /// Names of every record present in the zone, in listing order
        available: Vec<String>,
    },

    /// The provider refused the write
    #[error("Update rejected: {0}")]
    UpdateRejected(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response body that does not decode into the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(text: impl Into<String>) -> Self {
        Self::InvalidAddress(text.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a zone lookup error
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound { zone: zone.into() }
    }

    /// Create a record lookup error listing the names that do exist
    pub fn record_not_found(record: impl Into<String>, available: Vec<String>) -> Self {
        Self::RecordNotFound {
            record: record.into(),
            available,
        }
    }

    /// Create an update-rejected error
    pub fn update_rejected(msg: impl Into<String>) -> Self {
        Self::UpdateRejected(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the next tick has a reasonable chance of succeeding unchanged
    ///
    /// Only used to pick the log level; the engine never retries within a tick.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http(_) | Self::RateLimited(_) | Self::Io(_)
        )
    }
}
