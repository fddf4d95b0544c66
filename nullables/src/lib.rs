//! Nullable infrastructure for deterministic testing.
//!
//! The chain transport and the transaction-submission capability are
//! abstracted behind traits; this crate provides scriptable, in-memory
//! implementations that never touch the network:
//! - [`NullChainLink`] — scripted connect outcomes, controllable probes,
//!   injectable events, call counting.
//! - [`NullSubmitter`] — records setpoint writes instead of sending them.
//!
//! Usage: swap the real implementations for nullables in supervisor and
//! command tests.

pub mod chain;
pub mod submitter;

pub use chain::{NullChainLink, NullSessionHandle};
pub use submitter::NullSubmitter;
