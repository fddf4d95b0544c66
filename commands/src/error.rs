use coldlink_types::{ScaledValueError, Setpoint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no {0} value supplied")]
    MissingValue(Setpoint),

    #[error("invalid {kind} value: {source}")]
    InvalidValue {
        kind: Setpoint,
        #[source]
        source: ScaledValueError,
    },

    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error("transaction reverted on-chain: {0}")]
    Reverted(String),

    #[error("timed out waiting for transaction confirmation")]
    ConfirmationTimeout,
}

impl CommandError {
    /// Whether the failure is the caller's fault (bad input) rather than a
    /// submission failure. The HTTP layer maps this to 400 vs 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CommandError::MissingValue(_) | CommandError::InvalidValue { .. }
        )
    }
}
