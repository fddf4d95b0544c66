//! Setpoint command relay.
//!
//! Validates viewer-issued setpoint commands, scales them to the on-chain
//! fixed-point representation, and forwards them to the
//! transaction-submission capability. The capability itself (signing, nonce
//! and gas management, confirmation) lives behind [`SetpointSubmitter`]; the
//! production implementation is in `coldlink-evm`.

pub mod error;
pub mod relay;

pub use error::CommandError;
pub use relay::{CommandRelay, SetpointSubmitter, TxReceipt};
