//! The supervised subscription connection.
//!
//! [`establish`] performs the full bring-up sequence: transport connect,
//! reachability check, atomic registration of the three event
//! subscriptions, and the decode pump. The returned [`EvmControl`] is the
//! handle the heartbeat supervisor probes and tears down; the event
//! receiver dies with the connection, so a subscription can never outlive
//! its transport.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use coldlink_types::ChainEvent;

use crate::abi;
use crate::error::EvmError;
use crate::provider::WsProvider;

/// Static connection parameters, taken from configuration at startup.
#[derive(Clone, Debug)]
pub struct EvmEndpoint {
    pub rpc_ws_url: String,
    pub contract_address: Address,
}

impl EvmEndpoint {
    /// Build an endpoint, validating the contract address shape.
    pub fn new(rpc_ws_url: &str, contract_address: &str) -> Result<Self, EvmError> {
        let contract_address = Address::from_str(contract_address)
            .map_err(|_| EvmError::InvalidAddress(contract_address.to_string()))?;
        Ok(Self {
            rpc_ws_url: rpc_ws_url.to_string(),
            contract_address,
        })
    }
}

/// Control handle for one live connection: probe and teardown.
pub struct EvmControl {
    provider: Arc<WsProvider>,
    contract: Address,
}

impl EvmControl {
    /// Cheap read-only liveness check: `eth_call` the contract's
    /// `getHistoryCount()`. Any transport or RPC failure means the
    /// connection can no longer be trusted.
    pub async fn probe(&self) -> Result<(), EvmError> {
        let params = json!([
            {
                "to": self.contract.to_string(),
                "data": abi::encode_call(abi::GET_HISTORY_COUNT_SIG),
            },
            "latest",
        ]);
        self.provider.request("eth_call", params).await.map(|_| ())
    }

    /// Release the transport. Safe on an already-dead connection; a
    /// transport that refuses to close cleanly must not block recovery.
    pub fn disconnect(&self) {
        debug!(url = self.provider.url(), "closing node connection");
        self.provider.close();
    }
}

/// Bring up a connection: connect, verify reachability, register the
/// subscription set, start the decode pump.
///
/// Any failure along the way fails the whole attempt — partial
/// registration never survives, because the provider (and with it every
/// subscription) is dropped on the error path.
pub async fn establish(
    endpoint: &EvmEndpoint,
) -> Result<(EvmControl, mpsc::UnboundedReceiver<ChainEvent>), EvmError> {
    info!(url = %endpoint.rpc_ws_url, "connecting to node");
    let (provider, notices) = WsProvider::connect(&endpoint.rpc_ws_url).await?;
    let provider = Arc::new(provider);

    // Reachability round-trip before touching subscriptions.
    provider.request("eth_chainId", json!([])).await?;

    let sub_ids = register_subscriptions(&provider, endpoint.contract_address).await?;
    info!(
        contract = %endpoint.contract_address,
        subscriptions = sub_ids.len(),
        "node connection established"
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    tokio::spawn(pump_events(notices, sub_ids, event_tx));

    Ok((
        EvmControl {
            provider,
            contract: endpoint.contract_address,
        },
        event_rx,
    ))
}

/// Register a log subscription for each of the three contract events.
/// All three must succeed; the ids are how the pump recognizes its logs.
async fn register_subscriptions(
    provider: &WsProvider,
    contract: Address,
) -> Result<HashSet<String>, EvmError> {
    let mut sub_ids = HashSet::new();
    for sig in abi::SUBSCRIBED_EVENT_SIGS {
        let params = json!([
            "logs",
            {
                "address": contract.to_string(),
                "topics": [abi::event_topic(sig).to_string()],
            },
        ]);
        let result = provider.request("eth_subscribe", params).await?;
        let id = result
            .as_str()
            .ok_or_else(|| EvmError::Response {
                method: "eth_subscribe".into(),
                detail: format!("expected subscription id string, got {result}"),
            })?
            .to_string();
        debug!(event = sig, subscription = %id, "registered log subscription");
        sub_ids.insert(id);
    }
    Ok(sub_ids)
}

/// Decode pump: raw log notifications → [`ChainEvent`]s, in node emission
/// order. Undecodable logs are dropped with a diagnostic, never forwarded.
/// Ends when the transport dies or the supervisor drops the receiver.
async fn pump_events(
    mut notices: mpsc::UnboundedReceiver<crate::provider::SubscriptionNotice>,
    sub_ids: HashSet<String>,
    event_tx: mpsc::UnboundedSender<ChainEvent>,
) {
    while let Some(notice) = notices.recv().await {
        if !sub_ids.contains(&notice.subscription) {
            debug!(subscription = %notice.subscription, "notification for unknown subscription");
            continue;
        }
        match abi::decode_log(&notice.result) {
            Ok(event) => {
                debug!(event = event.name(), "decoded contract event");
                if event_tx.send(event).is_err() {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "dropping undecodable log"),
        }
    }
    debug!("event pump stopped");
}

/// Parse an `0x`-prefixed EVM address, for config validation.
pub fn parse_address(raw: &str) -> Result<Address, EvmError> {
    Address::from_str(raw).map_err(|_| EvmError::InvalidAddress(raw.to_string()))
}
