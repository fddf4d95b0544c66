//! Connection supervision: heartbeat and reconnection.
//!
//! One supervisor task owns the entire connection lifecycle, so the
//! structural invariants hold by construction: at most one live connection,
//! at most one pending reconnection, no ambient globals.
//!
//! The state machine:
//!
//! ```text
//! Connecting ──ok──▶ Live ──probe fail / stream end──▶ Degraded ─┐
//!     ▲  └─err──▶ Disconnected ─┐                                │
//!     │                         ▼                                ▼
//!     └────────── fixed 5 s delay ◀── reconnect pending ◀────────┘
//! ```
//!
//! Retries are unbounded with a constant delay — the relay prefers eventual
//! recovery over fast-fail, since an unattended data feed is worth more
//! than an error report nobody reads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use coldlink_types::ChainEvent;

use crate::error::RelayError;
use crate::hub::SharedHub;
use crate::metrics::RelayMetrics;
use crate::normalizer::normalize;

/// Period of the liveness probe while the link is live.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// Fixed delay before every reconnection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Lifecycle state of the supervised connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStatus {
    Disconnected,
    Connecting,
    Live,
    Degraded,
}

/// Tracks whether a reconnection is already scheduled.
///
/// The supervisor is the only owner, so this is a protocol object rather
/// than a lock: `try_begin` refuses a second pending reconnection, and
/// every attempt — success or failure — must end in `finish` or the relay
/// stalls permanently.
#[derive(Debug, Default)]
pub struct ReconnectState {
    pending: bool,
}

impl ReconnectState {
    pub fn new() -> Self {
        Self { pending: false }
    }

    /// Mark a reconnection as pending. Returns false (a no-op) if one is
    /// already scheduled.
    pub fn try_begin(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Clear the pending flag once an attempt has resolved.
    pub fn finish(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// A live connection: control handle plus the ordered event stream.
///
/// The stream ends when the transport dies; the supervisor treats that
/// exactly like a failed probe.
pub struct ChainSession {
    pub control: Box<dyn ChainControl>,
    pub events: mpsc::UnboundedReceiver<ChainEvent>,
}

/// Factory for connections — the seam between the supervisor and the
/// transport. The production implementation is [`crate::EvmChainLink`];
/// tests substitute a scripted one.
#[async_trait]
pub trait ChainLink: Send + Sync {
    /// Full bring-up: transport, reachability check, subscription set,
    /// decode pump. Any partial failure fails the whole attempt.
    async fn connect(&self) -> Result<ChainSession, RelayError>;
}

/// Control surface of one live connection.
#[async_trait]
pub trait ChainControl: Send + Sync {
    /// Cheap read-only liveness check.
    async fn probe(&self) -> Result<(), RelayError>;

    /// Release the transport. Best-effort: must be safe on an already-dead
    /// connection and must never propagate failures.
    fn disconnect(&self);
}

/// Why the live loop ended.
enum LiveOutcome {
    LinkFailed,
    Shutdown,
}

/// Supervises the chain connection and relays its events to the hub.
pub struct RelaySupervisor {
    link: Arc<dyn ChainLink>,
    hub: SharedHub,
    metrics: Arc<RelayMetrics>,
    shutdown: broadcast::Receiver<()>,
    status: LinkStatus,
    reconnect: ReconnectState,
}

impl RelaySupervisor {
    pub fn new(
        link: Arc<dyn ChainLink>,
        hub: SharedHub,
        metrics: Arc<RelayMetrics>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            link,
            hub,
            metrics,
            shutdown,
            status: LinkStatus::Disconnected,
            reconnect: ReconnectState::new(),
        }
    }

    /// Run until shutdown. Never returns early on connection failures.
    pub async fn run(mut self) {
        loop {
            self.set_status(LinkStatus::Connecting);
            let attempt = self.link.connect().await;
            // The attempt has resolved either way; the scheduled
            // reconnection (if this was one) is complete.
            self.reconnect.finish();

            match attempt {
                Ok(mut session) => {
                    self.set_status(LinkStatus::Live);
                    self.metrics.link_up.set(1);
                    let outcome = self.run_live(&mut session).await;
                    self.metrics.link_up.set(0);
                    if let LiveOutcome::Shutdown = outcome {
                        session.control.disconnect();
                        info!("supervisor stopped");
                        return;
                    }
                    self.set_status(LinkStatus::Degraded);
                    // Reconnecting entry: flag first, then teardown. The
                    // heartbeat timer was already cancelled when the live
                    // loop exited.
                    self.begin_reconnect();
                    session.control.disconnect();
                }
                Err(e) => {
                    warn!(error = %e, "connection attempt failed");
                    self.set_status(LinkStatus::Disconnected);
                    self.begin_reconnect();
                }
            }

            if !self.delay_or_shutdown().await {
                info!("supervisor stopped");
                return;
            }
        }
    }

    fn set_status(&mut self, status: LinkStatus) {
        self.status = status;
        debug!(status = ?self.status, "link status");
    }

    fn begin_reconnect(&mut self) {
        if self.reconnect.try_begin() {
            self.metrics.reconnections.inc();
            info!(delay_secs = RECONNECT_DELAY.as_secs(), "scheduling reconnection");
        } else {
            debug!("reconnection already pending");
        }
    }

    /// Sleep out the reconnect delay; false means shutdown arrived first.
    async fn delay_or_shutdown(&mut self) -> bool {
        tokio::select! {
            _ = self.shutdown.recv() => false,
            _ = sleep(RECONNECT_DELAY) => true,
        }
    }

    /// Relay events and probe the link until something gives. Dropping the
    /// interval on exit cancels the heartbeat before any teardown runs.
    async fn run_live(&mut self, session: &mut ChainSession) -> LiveOutcome {
        info!("chain link live");
        let mut heartbeat = interval_at(Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => return LiveOutcome::Shutdown,
                maybe_event = session.events.recv() => match maybe_event {
                    Some(event) => self.relay(event).await,
                    None => {
                        warn!("event stream ended");
                        return LiveOutcome::LinkFailed;
                    }
                },
                _ = heartbeat.tick() => {
                    if let Err(e) = session.control.probe().await {
                        warn!(error = %e, "heartbeat probe failed");
                        self.metrics.heartbeat_failures.inc();
                        return LiveOutcome::LinkFailed;
                    }
                    debug!("heartbeat ok");
                }
            }
        }
    }

    async fn relay(&self, event: ChainEvent) {
        debug!(event = event.name(), "relaying contract event");
        self.metrics.events_relayed.inc();
        let message = normalize(event);
        let delivered = self.hub.read().await.broadcast(&message);
        self.metrics.messages_broadcast.inc();
        debug!(delivered, "message broadcast");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_state_starts_clear() {
        let state = ReconnectState::new();
        assert!(!state.is_pending());
    }

    #[test]
    fn second_begin_is_a_noop_until_finished() {
        let mut state = ReconnectState::new();
        assert!(state.try_begin());
        assert!(!state.try_begin());
        assert!(state.is_pending());

        state.finish();
        assert!(!state.is_pending());
        assert!(state.try_begin());
    }

    #[test]
    fn finish_without_begin_is_harmless() {
        let mut state = ReconnectState::new();
        state.finish();
        assert!(!state.is_pending());
        assert!(state.try_begin());
    }
}
