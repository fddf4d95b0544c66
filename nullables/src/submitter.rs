//! Nullable setpoint submitter — records writes instead of sending them.

use std::sync::Mutex;

use async_trait::async_trait;

use coldlink_commands::{CommandError, SetpointSubmitter, TxReceipt};
use coldlink_types::Setpoint;

/// Records every setpoint write; outcome is scripted at construction.
pub struct NullSubmitter {
    calls: Mutex<Vec<(Setpoint, u64)>>,
    failure: Option<String>,
}

impl NullSubmitter {
    /// A submitter that confirms everything.
    pub fn confirming() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// A submitter that fails everything with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    /// Every write observed, in order.
    pub fn calls(&self) -> Vec<(Setpoint, u64)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: Setpoint, scaled: u64) -> Result<TxReceipt, CommandError> {
        self.calls.lock().unwrap().push((kind, scaled));
        match &self.failure {
            Some(message) => Err(CommandError::Submission(message.clone())),
            None => Ok(TxReceipt {
                tx_hash: format!("0xnull{scaled:x}"),
            }),
        }
    }
}

#[async_trait]
impl SetpointSubmitter for NullSubmitter {
    async fn set_target_temperature(&self, scaled: u64) -> Result<TxReceipt, CommandError> {
        self.record(Setpoint::Temperature, scaled)
    }

    async fn set_target_humidity(&self, scaled: u64) -> Result<TxReceipt, CommandError> {
        self.record(Setpoint::Humidity, scaled)
    }
}
