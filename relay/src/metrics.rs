//! Prometheus metrics for the relay.
//!
//! [`RelayMetrics`] owns a dedicated [`Registry`] that the API server's
//! `/metrics` endpoint encodes into the text exposition format when
//! metrics are enabled.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

/// Central collection of relay-level Prometheus metrics.
pub struct RelayMetrics {
    /// The registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Contract events decoded and handed to the normalizer.
    pub events_relayed: IntCounter,
    /// Outward messages broadcast to viewers.
    pub messages_broadcast: IntCounter,
    /// Reconnection sequences scheduled.
    pub reconnections: IntCounter,
    /// Heartbeat probes that failed.
    pub heartbeat_failures: IntCounter,
    /// Setpoint commands accepted and submitted on-chain.
    pub commands_submitted: IntCounter,
    /// Setpoint commands that failed (validation or submission).
    pub commands_failed: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Currently connected viewers.
    pub connected_viewers: IntGauge,
    /// 1 while the chain link is live, 0 otherwise.
    pub link_up: IntGauge,
}

impl RelayMetrics {
    /// Create a fresh set of metrics under a new [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let events_relayed = register_int_counter_with_registry!(
            Opts::new("coldlink_events_relayed_total", "Contract events decoded"),
            registry
        )
        .expect("failed to register events_relayed counter");

        let messages_broadcast = register_int_counter_with_registry!(
            Opts::new(
                "coldlink_messages_broadcast_total",
                "Outward messages broadcast to viewers"
            ),
            registry
        )
        .expect("failed to register messages_broadcast counter");

        let reconnections = register_int_counter_with_registry!(
            Opts::new(
                "coldlink_reconnections_total",
                "Reconnection sequences scheduled"
            ),
            registry
        )
        .expect("failed to register reconnections counter");

        let heartbeat_failures = register_int_counter_with_registry!(
            Opts::new(
                "coldlink_heartbeat_failures_total",
                "Heartbeat probes that failed"
            ),
            registry
        )
        .expect("failed to register heartbeat_failures counter");

        let commands_submitted = register_int_counter_with_registry!(
            Opts::new(
                "coldlink_commands_submitted_total",
                "Setpoint commands submitted on-chain"
            ),
            registry
        )
        .expect("failed to register commands_submitted counter");

        let commands_failed = register_int_counter_with_registry!(
            Opts::new(
                "coldlink_commands_failed_total",
                "Setpoint commands that failed"
            ),
            registry
        )
        .expect("failed to register commands_failed counter");

        let connected_viewers = register_int_gauge_with_registry!(
            Opts::new("coldlink_connected_viewers", "Currently connected viewers"),
            registry
        )
        .expect("failed to register connected_viewers gauge");

        let link_up = register_int_gauge_with_registry!(
            Opts::new("coldlink_link_up", "Whether the chain link is live"),
            registry
        )
        .expect("failed to register link_up gauge");

        Self {
            registry,
            events_relayed,
            messages_broadcast,
            reconnections,
            heartbeat_failures,
            commands_submitted,
            commands_failed,
            connected_viewers,
            link_up,
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}
