//! Production setpoint submitter.
//!
//! Each command opens its own short-lived connection, so the write path
//! never shares a transport with the supervised subscription — a failing
//! submission cannot disturb the event feed, and vice versa. Signing is
//! delegated to the node's managed account (`eth_sendTransaction` with a
//! configured `from` address); confirmation is receipt polling.

use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use coldlink_commands::{CommandError, SetpointSubmitter, TxReceipt};

use crate::abi;
use crate::error::EvmError;
use crate::provider::WsProvider;

/// How often to poll for a transaction receipt.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long to wait for a receipt before giving up.
const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(90);

/// Submits setpoint writes through the node's managed signing account.
pub struct EvmSubmitter {
    rpc_ws_url: String,
    contract: Address,
    signer: Address,
}

impl EvmSubmitter {
    pub fn new(rpc_ws_url: &str, contract: Address, signer: Address) -> Self {
        Self {
            rpc_ws_url: rpc_ws_url.to_string(),
            contract,
            signer,
        }
    }

    async fn submit(&self, signature: &str, scaled: u64) -> Result<TxReceipt, CommandError> {
        let (provider, _notices) = WsProvider::connect(&self.rpc_ws_url)
            .await
            .map_err(submission_error)?;

        let result = self.send_and_confirm(&provider, signature, scaled).await;
        provider.close();
        result
    }

    async fn send_and_confirm(
        &self,
        provider: &WsProvider,
        signature: &str,
        scaled: u64,
    ) -> Result<TxReceipt, CommandError> {
        let params = json!([{
            "from": self.signer.to_string(),
            "to": self.contract.to_string(),
            "data": abi::encode_uint_call(signature, scaled),
        }]);
        let tx_hash = provider
            .request("eth_sendTransaction", params)
            .await
            .map_err(submission_error)?
            .as_str()
            .ok_or_else(|| CommandError::Submission("node returned no transaction hash".into()))?
            .to_string();
        info!(%tx_hash, call = signature, scaled, "transaction submitted");

        let deadline = Instant::now() + CONFIRMATION_TIMEOUT;
        loop {
            let receipt = provider
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await
                .map_err(submission_error)?;

            if !receipt.is_null() {
                return check_receipt(&tx_hash, &receipt);
            }
            if Instant::now() >= deadline {
                return Err(CommandError::ConfirmationTimeout);
            }
            debug!(%tx_hash, "no receipt yet");
            sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

/// A mined receipt either confirms the transaction or reports a revert.
fn check_receipt(tx_hash: &str, receipt: &Value) -> Result<TxReceipt, CommandError> {
    let status = receipt.get("status").and_then(Value::as_str).unwrap_or("");
    if status == "0x0" {
        return Err(CommandError::Reverted(tx_hash.to_string()));
    }
    Ok(TxReceipt {
        tx_hash: tx_hash.to_string(),
    })
}

fn submission_error(e: EvmError) -> CommandError {
    CommandError::Submission(e.to_string())
}

#[async_trait]
impl SetpointSubmitter for EvmSubmitter {
    async fn set_target_temperature(&self, scaled: u64) -> Result<TxReceipt, CommandError> {
        self.submit(abi::SET_TARGET_TEMPERATURE_SIG, scaled).await
    }

    async fn set_target_humidity(&self, scaled: u64) -> Result<TxReceipt, CommandError> {
        self.submit(abi::SET_TARGET_HUMIDITY_SIG, scaled).await
    }
}
