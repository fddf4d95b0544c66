//! Fundamental types shared across the coldlink crates.
//!
//! Everything that crosses a crate boundary lives here: the decoded
//! on-chain events, the outward wire messages delivered to viewers,
//! setpoint commands, and the fixed-point scaled-value parser.

pub mod event;
pub mod message;
pub mod setpoint;
pub mod time;

pub use event::ChainEvent;
pub use message::OutwardMessage;
pub use setpoint::{parse_scaled, ScaledValueError, Setpoint};
pub use time::Timestamp;
