//! Contract Test: Scheduling and Shutdown
//!
//! Constraints verified:
//! - One tick per interval while the engine runs
//! - A tick finishes before the next one starts
//! - The engine returns promptly once the shutdown future resolves
//!
//! All tests run on paused tokio time, so the minutes below elapse instantly.

mod common;

use cfddns_core::state::MemoryStateStore;
use cfddns_core::{DdnsEngine, EngineEvent};
use common::*;
use std::time::Duration;

const RECORD: &str = "home.example.com";

#[tokio::test(start_paused = true)]
async fn ticks_once_per_interval() {
    let ip_source = CountingIpSource::new();
    let provider = MockDnsProvider::new();

    let (engine, _event_rx) = DdnsEngine::new(
        Box::new(CountingIpSource::sharing_counters_with(&ip_source)),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
        Box::new(MemoryStateStore::new()),
        &minimal_config(RECORD),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let engine_handle = tokio::spawn(async move {
        engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    // Ticks at 0s, 60s and 120s
    tokio::time::sleep(Duration::from_secs(150)).await;
    shutdown_tx.send(()).unwrap();
    tokio_test::assert_ok!(engine_handle.await.unwrap());

    assert_eq!(ip_source.call_count(), 3);
    assert_eq!(provider.update_call_count(), 3, "every tick saw a new address");
}

#[tokio::test(start_paused = true)]
async fn slow_ticks_never_overlap() {
    let ip_source = CountingIpSource::new();
    // Each update takes longer than the interval
    let provider = MockDnsProvider::new().with_delay(Duration::from_secs(90));

    let (engine, _event_rx) = DdnsEngine::new(
        Box::new(CountingIpSource::sharing_counters_with(&ip_source)),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
        Box::new(MemoryStateStore::new()),
        &minimal_config(RECORD),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let engine_handle = tokio::spawn(async move {
        engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_secs(600)).await;
    shutdown_tx.send(()).unwrap();
    tokio_test::assert_ok!(engine_handle.await.unwrap());

    assert!(!provider.overlapped(), "two updates were in flight at once");
    assert!(provider.update_call_count() >= 2);
    assert!(
        provider.update_call_count() <= 7,
        "late ticks must be delayed, not replayed: {} updates",
        provider.update_call_count()
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_terminates_engine_and_emits_stopped() {
    let provider = MockDnsProvider::new();

    // Unaligned: one tick at start, the next an hour away.
    let mut config = minimal_config(RECORD);
    config.schedule.interval_secs = 3600;

    let (engine, mut event_rx) = DdnsEngine::new(
        Box::new(ScriptedIpSource::new(vec![Some(ip(1, 1, 1, 1))])),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
        Box::new(MemoryStateStore::new()),
        &config,
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let engine_handle = tokio::spawn(async move {
        engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_secs(10)).await;
    shutdown_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), engine_handle).await;
    assert!(result.is_ok(), "Engine should terminate within 5 seconds");
    tokio_test::assert_ok!(result.unwrap().unwrap());

    assert_eq!(provider.update_call_count(), 1);

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    assert_eq!(
        events.first(),
        Some(&EngineEvent::Started {
            record_name: RECORD.to_string()
        })
    );
    assert!(matches!(
        events.last(),
        Some(EngineEvent::Stopped { .. })
    ));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, EngineEvent::UpdateSucceeded { .. }))
    );
}
