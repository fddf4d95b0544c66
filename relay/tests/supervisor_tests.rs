//! Supervisor state-machine tests on paused virtual time.
//!
//! Time only advances through the tokio test clock, so the 20 s heartbeat
//! and 5 s reconnect delay are asserted exactly, without real waiting.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use coldlink_nullables::NullChainLink;
use coldlink_relay::hub::shared_hub;
use coldlink_relay::{RelayMetrics, RelaySupervisor, ShutdownController};
use coldlink_types::{ChainEvent, Timestamp};

struct Harness {
    link: Arc<NullChainLink>,
    hub: coldlink_relay::SharedHub,
    metrics: Arc<RelayMetrics>,
    shutdown: ShutdownController,
}

impl Harness {
    fn new() -> Self {
        Self {
            link: Arc::new(NullChainLink::new()),
            hub: shared_hub(),
            metrics: Arc::new(RelayMetrics::new()),
            shutdown: ShutdownController::new(),
        }
    }

    fn spawn(&self) -> tokio::task::JoinHandle<()> {
        let supervisor = RelaySupervisor::new(
            Arc::clone(&self.link) as Arc<dyn coldlink_relay::ChainLink>,
            Arc::clone(&self.hub),
            Arc::clone(&self.metrics),
            self.shutdown.subscribe(),
        );
        tokio::spawn(supervisor.run())
    }
}

fn sensor_event() -> ChainEvent {
    ChainEvent::SensorDataUpdated {
        temperature: "2550".into(),
        humidity: "6000".into(),
        power: "1200".into(),
        timestamp: Timestamp::new(1_700_000_000),
    }
}

#[tokio::test(start_paused = true)]
async fn healthy_link_is_probed_every_interval_and_never_reconnects() {
    let harness = Harness::new();
    let session = harness.link.push_session();
    let _task = harness.spawn();

    sleep(Duration::from_secs(61)).await;
    assert_eq!(harness.link.connect_count(), 1);
    assert_eq!(session.probe_count(), 3); // t = 20, 40, 60
    assert_eq!(session.disconnect_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn probe_failure_schedules_exactly_one_reconnect_after_the_delay() {
    let harness = Harness::new();
    let first = harness.link.push_session();
    let second = harness.link.push_session();
    first.fail_probes();
    let _task = harness.spawn();

    // Before the first heartbeat nothing has happened yet.
    sleep(Duration::from_secs(19)).await;
    assert_eq!(harness.link.connect_count(), 1);
    assert_eq!(first.disconnect_count(), 0);

    // Heartbeat at t=20 fails; the reconnect fires at t=25, not sooner.
    sleep(Duration::from_secs(5)).await; // t = 24
    assert_eq!(harness.link.connect_count(), 1);
    assert_eq!(first.disconnect_count(), 1);

    sleep(Duration::from_secs(2)).await; // t = 26
    assert_eq!(harness.link.connect_count(), 2);
    assert_eq!(harness.metrics.reconnections.get(), 1);

    // The dead session's heartbeat was cancelled: exactly the one failing
    // probe, never another.
    sleep(Duration::from_secs(60)).await;
    assert_eq!(first.probe_count(), 1);
    assert_eq!(second.disconnect_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn simultaneous_failure_signals_produce_one_reconnection_sequence() {
    let harness = Harness::new();
    let mut first = harness.link.push_session();
    let _second = harness.link.push_session();
    // Two failure signals at once: the event stream dies and the next
    // probe would fail too.
    first.fail_probes();
    first.close_stream();
    let _task = harness.spawn();

    sleep(Duration::from_secs(120)).await;
    // One reconnection sequence, not two.
    assert_eq!(harness.link.connect_count(), 2);
    assert_eq!(harness.metrics.reconnections.get(), 1);
    assert_eq!(first.disconnect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_connect_attempt_retries_through_the_same_delay_path() {
    let harness = Harness::new();
    harness.link.push_failure("node unreachable");
    harness.link.push_failure("node unreachable");
    let _session = harness.link.push_session();
    let _task = harness.spawn();

    // Attempts at t=0, t=5, t=10; constant back-off, no cap.
    sleep(Duration::from_secs(4)).await;
    assert_eq!(harness.link.connect_count(), 1);
    sleep(Duration::from_secs(2)).await; // t = 6
    assert_eq!(harness.link.connect_count(), 2);
    sleep(Duration::from_secs(5)).await; // t = 11
    assert_eq!(harness.link.connect_count(), 3);

    // Third attempt succeeded; no further connects.
    sleep(Duration::from_secs(60)).await;
    assert_eq!(harness.link.connect_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn injected_event_is_normalized_and_broadcast() {
    let harness = Harness::new();
    let session = harness.link.push_session();

    let (viewer_tx, mut viewer_rx) = mpsc::unbounded_channel();
    harness.hub.write().await.register(viewer_tx);

    let _task = harness.spawn();
    sleep(Duration::from_secs(1)).await; // let the link come up

    session.emit(sensor_event());
    let wire = viewer_rx.recv().await.unwrap();
    assert_eq!(
        wire,
        r#"{"type":"sensor_update","temperature":"2550","humidity":"6000","power":"1200","timestamp":1700000000000}"#
    );
    assert_eq!(harness.metrics.events_relayed.get(), 1);
    assert_eq!(harness.metrics.messages_broadcast.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn events_reach_viewers_in_emission_order() {
    let harness = Harness::new();
    let session = harness.link.push_session();

    let (viewer_tx, mut viewer_rx) = mpsc::unbounded_channel();
    harness.hub.write().await.register(viewer_tx);

    let _task = harness.spawn();
    sleep(Duration::from_secs(1)).await;

    for secs in [1u64, 2, 3] {
        session.emit(ChainEvent::EnergyReported {
            total_energy_wh_scaled: secs.to_string(),
            timestamp: Timestamp::new(secs),
        });
    }
    for secs in [1u64, 2, 3] {
        let wire = viewer_rx.recv().await.unwrap();
        assert!(wire.contains(&format!("\"timestamp\":{}", secs * 1000)));
    }
}

#[tokio::test(start_paused = true)]
async fn events_resume_flowing_after_a_reconnect() {
    let harness = Harness::new();
    let mut first = harness.link.push_session();
    let second = harness.link.push_session();

    let (viewer_tx, mut viewer_rx) = mpsc::unbounded_channel();
    harness.hub.write().await.register(viewer_tx);

    let _task = harness.spawn();
    sleep(Duration::from_secs(1)).await;
    first.close_stream();
    sleep(Duration::from_secs(10)).await; // past the reconnect delay

    session_emit_and_expect(&second, &mut viewer_rx).await;
    assert_eq!(harness.link.connect_count(), 2);
}

async fn session_emit_and_expect(
    session: &coldlink_nullables::NullSessionHandle,
    viewer_rx: &mut mpsc::UnboundedReceiver<String>,
) {
    session.emit(sensor_event());
    let wire = viewer_rx.recv().await.unwrap();
    assert!(wire.contains("\"type\":\"sensor_update\""));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_supervisor_and_disconnects() {
    let harness = Harness::new();
    let session = harness.link.push_session();
    let task = harness.spawn();

    sleep(Duration::from_secs(1)).await;
    harness.shutdown.trigger();
    task.await.unwrap();

    assert_eq!(session.disconnect_count(), 1);
    assert_eq!(harness.link.connect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_reconnect_delay_stops_promptly() {
    let harness = Harness::new();
    harness.link.push_failure("node unreachable");
    let task = harness.spawn();

    sleep(Duration::from_secs(2)).await; // inside the 5 s delay window
    harness.shutdown.trigger();
    task.await.unwrap();

    assert_eq!(harness.link.connect_count(), 1);
}
