//! Nullable chain link — scripted connections without a node.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use coldlink_relay::supervisor::{ChainControl, ChainLink, ChainSession};
use coldlink_relay::RelayError;
use coldlink_types::ChainEvent;

enum ConnectOutcome {
    Fail(String),
    Succeed {
        probe_ok: Arc<AtomicBool>,
        probes: Arc<AtomicUsize>,
        disconnects: Arc<AtomicUsize>,
        events: mpsc::UnboundedReceiver<ChainEvent>,
    },
}

/// Test-side handle to a scripted session.
///
/// Created *before* the supervisor connects, so a test can script probe
/// failures and inject events for a session that does not exist yet.
pub struct NullSessionHandle {
    probe_ok: Arc<AtomicBool>,
    probes: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
    events: Option<mpsc::UnboundedSender<ChainEvent>>,
}

impl NullSessionHandle {
    /// Make every subsequent probe fail.
    pub fn fail_probes(&self) {
        self.probe_ok.store(false, Ordering::SeqCst);
    }

    /// How many times the session was probed.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Inject an event, as if the node emitted a log.
    pub fn emit(&self, event: ChainEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// End the event stream, as if the transport died.
    pub fn close_stream(&mut self) {
        self.events = None;
    }

    /// How many times the session was disconnected.
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

/// A scriptable [`ChainLink`]: each `connect` consumes the next scripted
/// outcome. Once the script is exhausted, connects fail (the supervisor
/// keeps retrying harmlessly).
pub struct NullChainLink {
    connects: AtomicUsize,
    script: Mutex<VecDeque<ConnectOutcome>>,
}

impl NullChainLink {
    pub fn new() -> Self {
        Self {
            connects: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Script the next connect attempt to fail.
    pub fn push_failure(&self, reason: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(ConnectOutcome::Fail(reason.to_string()));
    }

    /// Script the next connect attempt to succeed, returning the handle
    /// that controls the resulting session.
    pub fn push_session(&self) -> NullSessionHandle {
        let probe_ok = Arc::new(AtomicBool::new(true));
        let probes = Arc::new(AtomicUsize::new(0));
        let disconnects = Arc::new(AtomicUsize::new(0));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        self.script
            .lock()
            .unwrap()
            .push_back(ConnectOutcome::Succeed {
                probe_ok: Arc::clone(&probe_ok),
                probes: Arc::clone(&probes),
                disconnects: Arc::clone(&disconnects),
                events: event_rx,
            });

        NullSessionHandle {
            probe_ok,
            probes,
            disconnects,
            events: Some(event_tx),
        }
    }

    /// Total `connect` calls observed.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Default for NullChainLink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainLink for NullChainLink {
    async fn connect(&self) -> Result<ChainSession, RelayError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let outcome = self.script.lock().unwrap().pop_front();
        match outcome {
            Some(ConnectOutcome::Fail(reason)) => Err(RelayError::Other(reason)),
            Some(ConnectOutcome::Succeed {
                probe_ok,
                probes,
                disconnects,
                events,
            }) => Ok(ChainSession {
                control: Box::new(NullControl {
                    probe_ok,
                    probes,
                    disconnects,
                }),
                events,
            }),
            None => Err(RelayError::Other("no scripted session".into())),
        }
    }
}

struct NullControl {
    probe_ok: Arc<AtomicBool>,
    probes: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
}

#[async_trait]
impl ChainControl for NullControl {
    async fn probe(&self) -> Result<(), RelayError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.probe_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RelayError::Other("scripted probe failure".into()))
        }
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}
