//! Test doubles shared by the engine contract tests

#![allow(dead_code)]

use cfddns_core::config::{DdnsConfig, ScheduleConfig, UpdaterConfig};
use cfddns_core::error::{Error, Result};
use cfddns_core::traits::{DnsProvider, IpSource, UpdateOutcome};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An IpSource that replays a scripted sequence of answers
///
/// Once the script runs out the last successful address is repeated.
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<Option<Ipv4Addr>>>>,
    last: Arc<Mutex<Option<Ipv4Addr>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    /// `None` entries make that lookup fail with a network error
    pub fn new(script: Vec<Option<Ipv4Addr>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new ScriptedIpSource that shares script and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Some(ip)) => {
                *self.last.lock().unwrap() = Some(ip);
                Ok(ip)
            }
            Some(None) => Err(Error::network("connection refused")),
            None => {
                let last = *self.last.lock().unwrap();
                last.ok_or_else(|| Error::network("script exhausted"))
            }
        }
    }
}

/// An IpSource that returns a new address on every call
pub struct CountingIpSource {
    call_count: Arc<AtomicUsize>,
}

impl CountingIpSource {
    pub fn new() -> Self {
        Self {
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for CountingIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Ipv4Addr::new(10, 0, (n / 256) as u8, (n % 256) as u8))
    }
}

/// A mock DnsProvider that records every update call
///
/// An optional delay makes each call take that long, and a failure budget
/// makes the first N calls fail.
pub struct MockDnsProvider {
    updates: Arc<Mutex<Vec<(String, Ipv4Addr)>>>,
    failures_left: Arc<AtomicUsize>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    overlapped: Arc<AtomicBool>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            updates: Arc::new(Mutex::new(Vec::new())),
            failures_left: Arc::new(AtomicUsize::new(0)),
            delay: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
            overlapped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make the first `count` update calls fail
    pub fn failing_first(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Make every update call take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Every (record, address) pair passed to update_record()
    pub fn updates(&self) -> Vec<(String, Ipv4Addr)> {
        self.updates.lock().unwrap().clone()
    }

    /// Whether two update calls were ever in flight at once
    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    /// Create a new MockDnsProvider that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            updates: Arc::clone(&other.updates),
            failures_left: Arc::clone(&other.failures_left),
            delay: other.delay,
            in_flight: Arc::clone(&other.in_flight),
            overlapped: Arc::clone(&other.overlapped),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(&self, record_name: &str, new_ip: Ipv4Addr) -> Result<UpdateOutcome> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }

        self.updates
            .lock()
            .unwrap()
            .push((record_name.to_string(), new_ip));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(Error::update_rejected("mock provider refused the write"));
        }

        Ok(UpdateOutcome {
            record_id: "R1".to_string(),
            previous_content: "0.0.0.0".to_string(),
            new_ip,
            dry_run: false,
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(record_name: &str) -> DdnsConfig {
    let mut config = DdnsConfig::new(UpdaterConfig::new(
        "test-key",
        "test@example.com",
        "example.com",
        record_name,
    ));
    config.schedule = ScheduleConfig {
        interval_secs: 60,
        align_to_boundary: false,
    };
    config
}

pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}
