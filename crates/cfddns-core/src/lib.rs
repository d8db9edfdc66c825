// # cfddns-core
//
// Core library for the cfddns dynamic DNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for discovering the current public IPv4 address
// - **DnsProvider**: Trait for overwriting a DNS record via a provider API
// - **StateStore**: Trait for the in-memory last-known address
// - **Schedule**: Wall-clock aligned tick stream
// - **DdnsEngine**: Runs one resolve-and-update sequence per tick
//
// Implementations of the traits live in sibling crates
// (`cfddns-ip-http`, `cfddns-provider-cloudflare`); the `cfddnsd` binary
// wires them together.

pub mod config;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, IpSourceConfig, ScheduleConfig, UpdaterConfig};
pub use engine::{DdnsEngine, EngineEvent, TickOutcome};
pub use error::{Error, Result};
pub use schedule::Schedule;
pub use state::MemoryStateStore;
pub use traits::{DnsProvider, IpSource, StateStore};
