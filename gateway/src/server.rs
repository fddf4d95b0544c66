//! WebSocket server implementation.
//!
//! Each accepted socket is registered in the broadcast hub with its own
//! unbounded channel. A writer pump drains the channel into the socket;
//! the read loop exists only to observe close/error, which drives
//! unregistration — exactly the hub's removal contract.

use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use coldlink_relay::{RelayMetrics, SharedHub};

use crate::GatewayError;

/// Shared state for the viewer server.
#[derive(Clone)]
pub struct ViewerState {
    pub hub: SharedHub,
    pub metrics: Arc<RelayMetrics>,
}

/// The viewer WebSocket server.
pub struct ViewerServer {
    pub port: u16,
    pub state: ViewerState,
}

impl ViewerServer {
    pub fn new(port: u16, hub: SharedHub, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            port,
            state: ViewerState { hub, metrics },
        }
    }

    /// The axum router, exposed separately so tests can serve it on an
    /// ephemeral port.
    pub fn router(state: ViewerState) -> Router {
        Router::new().route("/ws", get(ws_handler)).with_state(state)
    }

    /// Bind and serve until the process shuts down.
    pub async fn start(&self) -> Result<(), GatewayError> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr).await.map_err(GatewayError::Bind)?;
        info!("viewer websocket server listening on {addr}");
        Self::serve(listener, self.state.clone()).await
    }

    /// Serve connections from an already-bound listener.
    pub async fn serve(listener: TcpListener, state: ViewerState) -> Result<(), GatewayError> {
        axum::serve(listener, Self::router(state))
            .await
            .map_err(GatewayError::Serve)
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ViewerState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_viewer(socket, state))
}

/// One connected viewer, from upgrade to unregistration.
async fn handle_viewer(socket: WebSocket, state: ViewerState) {
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let viewer_id = state.hub.write().await.register(outbound);
    state.metrics.connected_viewers.inc();
    debug!("viewer connected");

    let (mut sink, mut source) = socket.split();

    // Writer pump: hub channel → socket, preserving broadcast order.
    let writer = tokio::spawn(async move {
        while let Some(wire) = outbound_rx.recv().await {
            if sink.send(Message::Text(wire)).await.is_err() {
                break;
            }
        }
    });

    // Read loop: viewers do not speak; we only watch for close/error.
    while let Some(received) = source.next().await {
        match received {
            Ok(Message::Close(_)) => {
                debug!("viewer sent close frame");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "viewer socket error");
                break;
            }
        }
    }

    state.hub.write().await.unregister(viewer_id);
    state.metrics.connected_viewers.dec();
    writer.abort();
    debug!("viewer disconnected");
}
