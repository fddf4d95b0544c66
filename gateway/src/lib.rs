//! Viewer-facing WebSocket server.
//!
//! Dashboards connect at `/ws` and receive every outward message the relay
//! broadcasts, in broadcast order. There is no client protocol: viewers
//! only listen (pings are answered by the transport layer). A viewer that
//! was offline for a message does not get it on reconnect.

pub mod server;

pub use server::{ViewerServer, ViewerState};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to bind viewer server: {0}")]
    Bind(#[source] std::io::Error),

    #[error("viewer server error: {0}")]
    Serve(#[source] std::io::Error),
}
