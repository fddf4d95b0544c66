//! Coldlink core — supervises the chain subscription and relays events.
//!
//! The relay is the part of the system with real failure handling:
//! - [`supervisor`] owns the connection lifecycle: heartbeat probing while
//!   live, constant-delay reconnection on failure, at most one live
//!   connection and one pending reconnection at any time.
//! - [`normalizer`] maps decoded contract events onto the outward message
//!   schema.
//! - [`hub`] fans normalized messages out to every connected viewer.
//!
//! Configuration, logging, metrics, and shutdown coordination for the whole
//! process also live here, so the gateway, API, and daemon crates share one
//! ambient stack.

pub mod chain_link;
pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod metrics;
pub mod normalizer;
pub mod shutdown;
pub mod supervisor;

pub use chain_link::EvmChainLink;
pub use config::RelayConfig;
pub use error::RelayError;
pub use hub::{BroadcastHub, SharedHub, ViewerId};
pub use logging::{init_logging, LogFormat};
pub use metrics::RelayMetrics;
pub use normalizer::normalize;
pub use shutdown::ShutdownController;
pub use supervisor::{
    ChainControl, ChainLink, ChainSession, LinkStatus, ReconnectState, RelaySupervisor,
    HEARTBEAT_INTERVAL, RECONNECT_DELAY,
};
