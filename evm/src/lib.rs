//! Ethereum-node transport for the coldlink relay.
//!
//! Everything that talks to the chain node lives here:
//! - [`provider::WsProvider`] — a minimal JSON-RPC-over-WebSocket client
//!   with request/response correlation and one ordered notification stream.
//! - [`abi`] — event topics, log decoding, and call encoding for the
//!   controller contract.
//! - [`connection`] — establish/probe/disconnect of the supervised
//!   subscription connection.
//! - [`submitter`] — the production [`SetpointSubmitter`] implementation
//!   (one fresh connection per command, node-managed signing).
//!
//! [`SetpointSubmitter`]: coldlink_commands::SetpointSubmitter

pub mod abi;
pub mod connection;
pub mod error;
pub mod provider;
pub mod submitter;

pub use connection::{establish, EvmControl, EvmEndpoint};
pub use error::EvmError;
pub use provider::WsProvider;
pub use submitter::EvmSubmitter;
