//! Outward message schema delivered to dashboard viewers.
//!
//! The wire format is fixed — the dashboard parses these shapes verbatim:
//!
//! ```json
//! {"type":"sensor_update","temperature":"2550","humidity":"6000","power":"1200","timestamp":1700000000000}
//! {"type":"system_error","message":"compressor stalled","timestamp":1700000000000}
//! {"type":"energy_update","totalEnergy":"184000","timestamp":1700000000000}
//! ```
//!
//! Numeric chain values are carried as decimal strings so uint256 never
//! loses precision in a JSON number; `timestamp` is milliseconds since
//! epoch.

use serde::{Deserialize, Serialize};

/// A message fanned out to every connected viewer.
///
/// Immutable once constructed; carries no identity beyond its content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutwardMessage {
    /// Periodic sensor readings from the device.
    SensorUpdate {
        temperature: String,
        humidity: String,
        power: String,
        timestamp: u64,
    },
    /// An application-level error reported by the contract itself.
    SystemError { message: String, timestamp: u64 },
    /// Cumulative energy report.
    EnergyUpdate {
        #[serde(rename = "totalEnergy")]
        total_energy: String,
        timestamp: u64,
    },
}

impl OutwardMessage {
    /// Serialize to the wire JSON. Serialization of this enum cannot fail
    /// (no non-string map keys, no foreign types).
    pub fn to_wire(&self) -> String {
        serde_json::to_string(self).expect("OutwardMessage is always serializable")
    }
}
