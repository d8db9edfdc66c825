//! Update engine
//!
//! The DdnsEngine is responsible for:
//! - Waiting for the next tick of the [`Schedule`]
//! - Fetching the current address via IpSource
//! - Comparing it with the last confirmed address
//! - Updating the record via DnsProvider when it changed
//!
//! ## Tick Flow
//!
//! ```text
//! Schedule ──tick──▶ IpSource::current()
//!                         │
//!                         ▼
//!              same as StateStore? ──yes──▶ skip
//!                         │ no
//!                         ▼
//!              DnsProvider::update_record()
//!                         │ confirmed
//!                         ▼
//!              StateStore::set_last_ip()
//! ```
//!
//! The last-known address only moves after the provider confirms the write,
//! so a failed update is attempted again on the next tick.

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::schedule::Schedule;
use crate::traits::{DnsProvider, IpSource, StateStore, UpdateOutcome};
use std::future::Future;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started waiting for ticks
    Started {
        record_name: String,
    },

    /// The IP source could not produce an address
    IpLookupFailed {
        error: String,
    },

    /// Address differs from the last confirmed one
    IpChangeDetected {
        record_name: String,
        new_ip: Ipv4Addr,
        previous_ip: Option<Ipv4Addr>,
    },

    /// Address unchanged, no provider call made
    UpdateSkipped {
        record_name: String,
        current_ip: Ipv4Addr,
    },

    /// Provider confirmed the write
    UpdateSucceeded {
        record_name: String,
        new_ip: Ipv4Addr,
        previous_ip: Option<Ipv4Addr>,
    },

    /// Provider call failed; the next tick will try again
    UpdateFailed {
        record_name: String,
        new_ip: Ipv4Addr,
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Address matched the last confirmed one
    Unchanged(Ipv4Addr),
    /// Record was updated
    Updated(UpdateOutcome),
    /// Address lookup failed; nothing else was attempted
    IpLookupFailed,
    /// Address changed but the provider call failed
    UpdateFailed,
}

/// Core update engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`] (OS signals) or
///    [`DdnsEngine::run_until()`] (caller-supplied shutdown)
/// 3. The engine ticks until shutdown
///
/// ## Threading
///
/// Ticks run inline on the engine's task. A tick always finishes before the
/// next one is awaited and shutdown is only observed between ticks.
pub struct DdnsEngine {
    /// IP source for address lookups
    ip_source: Box<dyn IpSource>,

    /// DNS provider for record updates
    provider: Box<dyn DnsProvider>,

    /// Last confirmed address
    state_store: Box<dyn StateStore>,

    /// Record kept up to date
    target_record: String,

    /// Tick timing
    schedule: Schedule,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// Dropping the receiver is fine; events are then discarded.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
        config: &DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            ip_source,
            provider,
            state_store,
            target_record: config.updater.target_record.clone(),
            schedule: Schedule::new(&config.schedule),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run until SIGINT or SIGTERM (Ctrl-C on non-Unix platforms)
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Signal handlers could not be installed
    pub async fn run(&self) -> Result<()> {
        let signal = shutdown_signal()?;

        self.run_until(async move {
            let name = signal.await;
            info!("Received {}", name);
        })
        .await
    }

    /// Run until `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticks = self.schedule.ticks();

        info!(
            "Updating {} every {:?}, address from {}",
            self.target_record,
            self.schedule.interval(),
            self.ip_source.source_name()
        );
        self.emit_event(EngineEvent::Started {
            record_name: self.target_record.clone(),
        });

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Stopping");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }

                Some(_) = ticks.next() => {
                    self.run_tick().await;
                }
            }
        }

        Ok(())
    }

    /// Run one resolve-and-update sequence
    ///
    /// Errors are logged and folded into the returned [`TickOutcome`]; a
    /// failing tick never stops the engine.
    pub async fn run_tick(&self) -> TickOutcome {
        let current_ip = match self.ip_source.current().await {
            Ok(ip) => ip,
            Err(e) => {
                error!(
                    "Couldn't get current IP from {}: {}",
                    self.ip_source.source_name(),
                    e
                );
                self.emit_event(EngineEvent::IpLookupFailed {
                    error: e.to_string(),
                });
                return TickOutcome::IpLookupFailed;
            }
        };

        let last_known = match self.state_store.get_record(&self.target_record).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to read last known IP, treating as unknown: {}", e);
                None
            }
        };
        let previous_ip = last_known.as_ref().map(|record| record.last_ip);

        if let Some(record) = last_known.filter(|record| record.last_ip == current_ip) {
            debug!(
                "IP unchanged: {} (confirmed {})",
                current_ip,
                record.last_updated.to_rfc3339()
            );
            self.emit_event(EngineEvent::UpdateSkipped {
                record_name: self.target_record.clone(),
                current_ip,
            });
            return TickOutcome::Unchanged(current_ip);
        }

        info!("New IP: {}", current_ip);
        self.emit_event(EngineEvent::IpChangeDetected {
            record_name: self.target_record.clone(),
            new_ip: current_ip,
            previous_ip,
        });

        match self.update(current_ip, previous_ip).await {
            Ok(outcome) => TickOutcome::Updated(outcome),
            Err(e) => {
                if e.is_transient() {
                    warn!("Failed to update {}: {}", self.target_record, e);
                } else {
                    error!("Failed to update {}: {}", self.target_record, e);
                }
                self.emit_event(EngineEvent::UpdateFailed {
                    record_name: self.target_record.clone(),
                    new_ip: current_ip,
                    error: e.to_string(),
                });
                TickOutcome::UpdateFailed
            }
        }
    }

    async fn update(
        &self,
        new_ip: Ipv4Addr,
        previous_ip: Option<Ipv4Addr>,
    ) -> Result<UpdateOutcome> {
        info!("Updating {}", self.provider.provider_name());

        let outcome = self
            .provider
            .update_record(&self.target_record, new_ip)
            .await?;

        // The record is already written; a bookkeeping failure only costs a
        // redundant update on the next tick.
        if let Err(e) = self.state_store.set_last_ip(&self.target_record, new_ip).await {
            warn!("Failed to record last known IP: {}", e);
        }

        info!(
            "Updated {} -> {} (record {}, was: {})",
            self.target_record, new_ip, outcome.record_id, outcome.previous_content
        );
        self.emit_event(EngineEvent::UpdateSucceeded {
            record_name: self.target_record.clone(),
            new_ip,
            previous_ip,
        });

        Ok(outcome)
    }

    fn emit_event(&self, event: EngineEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
        }
        "SIGINT"
    })
}
