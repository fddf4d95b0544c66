//! Command validation and dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use coldlink_types::{parse_scaled, Setpoint};
use tracing::{info, warn};

use crate::error::CommandError;

/// A confirmed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash, 0x-prefixed hex.
    pub tx_hash: String,
}

/// The external transaction-submission capability.
///
/// Implementations submit a setpoint write to the controller contract and
/// resolve only once the transaction is confirmed (or has definitively
/// failed). Signing and nonce/gas management are the implementation's
/// concern; the relay never sees a key.
#[async_trait]
pub trait SetpointSubmitter: Send + Sync {
    async fn set_target_temperature(&self, scaled: u64) -> Result<TxReceipt, CommandError>;

    async fn set_target_humidity(&self, scaled: u64) -> Result<TxReceipt, CommandError>;
}

/// Validates and forwards setpoint commands.
///
/// One-shot semantics: a command lives for the duration of the underlying
/// submission. No retry is performed here — a failure is surfaced once to
/// the caller, which owns any user-facing retry.
pub struct CommandRelay {
    submitter: Arc<dyn SetpointSubmitter>,
}

impl CommandRelay {
    pub fn new(submitter: Arc<dyn SetpointSubmitter>) -> Self {
        Self { submitter }
    }

    /// Validate `raw_value`, scale it, and submit it as the given setpoint.
    ///
    /// An absent value is a client error and never reaches the chain.
    pub async fn submit(
        &self,
        kind: Setpoint,
        raw_value: Option<&str>,
    ) -> Result<TxReceipt, CommandError> {
        let raw = raw_value.ok_or(CommandError::MissingValue(kind))?;
        let scaled = parse_scaled(raw)
            .map_err(|source| CommandError::InvalidValue { kind, source })?;

        info!(%kind, raw, scaled, "submitting setpoint");
        let result = match kind {
            Setpoint::Temperature => self.submitter.set_target_temperature(scaled).await,
            Setpoint::Humidity => self.submitter.set_target_humidity(scaled).await,
        };

        match &result {
            Ok(receipt) => info!(%kind, tx_hash = %receipt.tx_hash, "setpoint confirmed"),
            Err(e) => warn!(%kind, error = %e, "setpoint submission failed"),
        }
        result
    }
}
