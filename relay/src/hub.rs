//! Broadcast hub — fans outward messages to every connected viewer.
//!
//! The hub holds one unbounded channel sender per viewer; the gateway owns
//! the matching receivers and drains them into the sockets. A send into a
//! closed channel means the viewer's writer task is gone — the viewer is
//! skipped, not removed, because removal is driven by the socket's own
//! close/error signal through [`BroadcastHub::unregister`].

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;

use coldlink_types::OutwardMessage;

/// Opaque handle identifying one registered viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewerId(u64);

/// Registry of connected viewers.
pub struct BroadcastHub {
    viewers: HashMap<ViewerId, mpsc::UnboundedSender<String>>,
    next_id: u64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            viewers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Add a viewer. The returned id is the key for later removal.
    pub fn register(&mut self, sender: mpsc::UnboundedSender<String>) -> ViewerId {
        let id = ViewerId(self.next_id);
        self.next_id += 1;
        self.viewers.insert(id, sender);
        debug!(viewer = id.0, viewers = self.viewers.len(), "viewer registered");
        id
    }

    /// Remove a viewer. Idempotent — removing an absent viewer is a no-op.
    /// Returns whether the viewer was present.
    pub fn unregister(&mut self, id: ViewerId) -> bool {
        let was_present = self.viewers.remove(&id).is_some();
        if was_present {
            debug!(viewer = id.0, viewers = self.viewers.len(), "viewer unregistered");
        }
        was_present
    }

    /// Serialize `message` once and send it to every registered viewer
    /// whose channel is still open. Returns the number of deliveries.
    ///
    /// Per-viewer ordering follows broadcast call order; there is no
    /// buffering or replay for viewers that register later.
    pub fn broadcast(&self, message: &OutwardMessage) -> usize {
        let wire = message.to_wire();
        let mut delivered = 0;
        for sender in self.viewers.values() {
            if sender.send(wire.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of registered viewers (including ones whose channel has
    /// closed but whose socket teardown has not run yet).
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

/// The hub as shared between the supervisor (broadcast) and the gateway
/// (register/unregister).
pub type SharedHub = std::sync::Arc<tokio::sync::RwLock<BroadcastHub>>;

/// Convenience constructor for the shared form.
pub fn shared_hub() -> SharedHub {
    std::sync::Arc::new(tokio::sync::RwLock::new(BroadcastHub::new()))
}
