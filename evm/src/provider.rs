//! JSON-RPC over WebSocket.
//!
//! One [`WsProvider`] owns one WebSocket to the node. Requests are
//! correlated by id; `eth_subscription` notifications from every
//! subscription converge on a single ordered channel, so events reach the
//! decode pump in the order the node emitted them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::error::EvmError;

/// Timeout for the initial WebSocket connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for a single request/response round-trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A subscription notification pushed by the node.
#[derive(Clone, Debug)]
pub struct SubscriptionNotice {
    /// The subscription id returned by `eth_subscribe`.
    pub subscription: String,
    /// The notification payload (a log object, for log subscriptions).
    pub result: Value,
}

/// In-flight requests: id → (method, completion channel). The method is
/// kept so error frames can name the call they reject.
type PendingMap = Arc<Mutex<HashMap<u64, (String, oneshot::Sender<Result<Value, EvmError>>)>>>;

/// A JSON-RPC client over one WebSocket connection.
pub struct WsProvider {
    url: String,
    next_id: AtomicU64,
    outbound: mpsc::UnboundedSender<Message>,
    pending: PendingMap,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl WsProvider {
    /// Connect to the node and start the reader/writer tasks.
    ///
    /// Returns the provider and the notification stream. The stream ends
    /// when the transport dies, which downstream consumers treat as a
    /// connection failure.
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SubscriptionNotice>), EvmError> {
        let connect = tokio_tungstenite::connect_async(url);
        let (stream, _response) = tokio::time::timeout(CONNECT_TIMEOUT, connect)
            .await
            .map_err(|_| EvmError::ConnectTimeout(url.to_string()))?
            .map_err(|e| EvmError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let (mut sink, mut source) = stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let writer = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    warn!(error = %e, "websocket send failed");
                    break;
                }
            }
        });

        let reader_pending = Arc::clone(&pending);
        let reader_outbound = outbound.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        route_frame(&text, &reader_pending, &notice_tx).await;
                    }
                    Ok(Message::Ping(payload)) => {
                        let _ = reader_outbound.send(Message::Pong(payload));
                    }
                    Ok(Message::Close(_)) => {
                        debug!("node closed the websocket");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "websocket receive failed");
                        break;
                    }
                }
            }
            // Fail every in-flight request; their callers see a dead
            // transport instead of hanging until the request timeout.
            let mut pending = reader_pending.lock().await;
            for (_, (_, tx)) in pending.drain() {
                let _ = tx.send(Err(EvmError::TransportClosed));
            }
        });

        Ok((
            Self {
                url: url.to_string(),
                next_id: AtomicU64::new(1),
                outbound,
                pending,
                reader,
                writer,
            },
            notice_rx,
        ))
    }

    /// The endpoint this provider is connected to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a request and await its response.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, EvmError> {
        // A finished reader means the transport is gone; fail fast instead
        // of burning the request timeout.
        if self.reader.is_finished() {
            return Err(EvmError::TransportClosed);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .await
            .insert(id, (method.to_string(), tx));

        let frame = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        if self.outbound.send(Message::Text(frame.to_string())).is_err() {
            self.pending.lock().await.remove(&id);
            return Err(EvmError::TransportClosed);
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(EvmError::TransportClosed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(EvmError::RequestTimeout(method.to_string()))
            }
        }
    }

    /// Close the connection. Best-effort: the close frame may never be
    /// flushed if the transport is already dead, which is fine — both
    /// tasks are aborted regardless, and aborting the reader tears down
    /// every subscription routed through it.
    pub fn close(&self) {
        let _ = self.outbound.send(Message::Close(None));
        self.reader.abort();
        self.writer.abort();
    }
}

impl Drop for WsProvider {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Dispatch one inbound frame: a response completes its pending request, a
/// notification goes to the subscription channel, anything else is logged
/// and dropped.
async fn route_frame(
    text: &str,
    pending: &PendingMap,
    notices: &mpsc::UnboundedSender<SubscriptionNotice>,
) {
    let frame: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "dropping unparseable frame");
            return;
        }
    };

    if let Some(id) = frame.get("id").and_then(Value::as_u64) {
        match pending.lock().await.remove(&id) {
            Some((method, tx)) => {
                let outcome = if let Some(err) = frame.get("error") {
                    Err(EvmError::Rpc {
                        method,
                        code: err.get("code").and_then(Value::as_i64).unwrap_or(0),
                        message: err
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown error")
                            .to_string(),
                    })
                } else {
                    Ok(frame.get("result").cloned().unwrap_or(Value::Null))
                };
                let _ = tx.send(outcome);
            }
            None => debug!(id, "response for unknown or timed-out request"),
        }
        return;
    }

    if frame.get("method").and_then(Value::as_str) == Some("eth_subscription") {
        let params = frame.get("params").cloned().unwrap_or(Value::Null);
        let subscription = params
            .get("subscription")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let result = params.get("result").cloned().unwrap_or(Value::Null);
        let _ = notices.send(SubscriptionNotice {
            subscription,
            result,
        });
        return;
    }

    debug!("dropping frame that is neither response nor subscription");
}
