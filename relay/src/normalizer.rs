//! Event normalization — contract events onto the outward schema.
//!
//! Pure shape translation: decimal strings pass through untouched and the
//! contract's seconds-since-epoch become the dashboard's milliseconds.

use coldlink_types::{ChainEvent, OutwardMessage};

/// Map a decoded contract event onto its outward message variant.
pub fn normalize(event: ChainEvent) -> OutwardMessage {
    match event {
        ChainEvent::SensorDataUpdated {
            temperature,
            humidity,
            power,
            timestamp,
        } => OutwardMessage::SensorUpdate {
            temperature,
            humidity,
            power,
            timestamp: timestamp.as_millis(),
        },
        ChainEvent::SystemErrorOccurred { reason, timestamp } => OutwardMessage::SystemError {
            message: reason,
            timestamp: timestamp.as_millis(),
        },
        ChainEvent::EnergyReported {
            total_energy_wh_scaled,
            timestamp,
        } => OutwardMessage::EnergyUpdate {
            total_energy: total_energy_wh_scaled,
            timestamp: timestamp.as_millis(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coldlink_types::Timestamp;

    #[test]
    fn sensor_update_scales_timestamp_to_millis() {
        let message = normalize(ChainEvent::SensorDataUpdated {
            temperature: "2550".into(),
            humidity: "6000".into(),
            power: "1200".into(),
            timestamp: Timestamp::new(1_700_000_000),
        });
        assert_eq!(
            message.to_wire(),
            r#"{"type":"sensor_update","temperature":"2550","humidity":"6000","power":"1200","timestamp":1700000000000}"#
        );
    }

    #[test]
    fn system_error_keeps_reason_verbatim() {
        let message = normalize(ChainEvent::SystemErrorOccurred {
            reason: "door left open".into(),
            timestamp: Timestamp::new(12),
        });
        assert_eq!(
            message,
            OutwardMessage::SystemError {
                message: "door left open".into(),
                timestamp: 12_000,
            }
        );
    }

    #[test]
    fn energy_report_passes_decimal_text_through() {
        let message = normalize(ChainEvent::EnergyReported {
            total_energy_wh_scaled: "340282366920938463463374607431768211463".into(),
            timestamp: Timestamp::new(1),
        });
        assert_eq!(
            message,
            OutwardMessage::EnergyUpdate {
                total_energy: "340282366920938463463374607431768211463".into(),
                timestamp: 1_000,
            }
        );
    }
}
