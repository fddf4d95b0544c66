//! Decoded controller-contract events.
//!
//! These are the three event signatures the relay subscribes to. Decoding
//! from raw logs happens in `coldlink-evm`; normalization into the outward
//! schema happens in `coldlink-relay`. uint256 fields are carried as decimal
//! strings end to end.

use crate::time::Timestamp;

/// An event emitted by the controller contract, decoded from a log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainEvent {
    /// `SensorDataUpdated(uint256 temperature, uint256 humidity,
    /// uint256 power, uint256 timestamp)` — values scaled by 100.
    SensorDataUpdated {
        temperature: String,
        humidity: String,
        power: String,
        timestamp: Timestamp,
    },
    /// `SystemErrorOccurred(string reason, uint256 timestamp)`.
    SystemErrorOccurred {
        reason: String,
        timestamp: Timestamp,
    },
    /// `EnergyReported(uint256 totalEnergyWhScaled, uint256 timestamp)`.
    EnergyReported {
        total_energy_wh_scaled: String,
        timestamp: Timestamp,
    },
}

impl ChainEvent {
    /// The Solidity event name, as used in the subscription set.
    pub fn name(&self) -> &'static str {
        match self {
            ChainEvent::SensorDataUpdated { .. } => "SensorDataUpdated",
            ChainEvent::SystemErrorOccurred { .. } => "SystemErrorOccurred",
            ChainEvent::EnergyReported { .. } => "EnergyReported",
        }
    }
}
