//! Contract ABI codec for the refrigeration controller.
//!
//! The interface is small enough to encode by hand: three events with
//! value-type (plus one `string`) parameters, one read-only probe call, and
//! two uint256 setters. Topics and selectors are derived from the canonical
//! signatures with keccak256 at runtime, so nothing here depends on a
//! compiled ABI artifact.

use alloy_primitives::{keccak256, B256, U256};
use coldlink_types::{ChainEvent, Timestamp};
use serde_json::Value;

use crate::error::EvmError;

/// `SensorDataUpdated(uint256 temperature, uint256 humidity, uint256 power,
/// uint256 timestamp)`.
pub const SENSOR_DATA_UPDATED_SIG: &str = "SensorDataUpdated(uint256,uint256,uint256,uint256)";
/// `SystemErrorOccurred(string reason, uint256 timestamp)`.
pub const SYSTEM_ERROR_OCCURRED_SIG: &str = "SystemErrorOccurred(string,uint256)";
/// `EnergyReported(uint256 totalEnergyWhScaled, uint256 timestamp)`.
pub const ENERGY_REPORTED_SIG: &str = "EnergyReported(uint256,uint256)";

/// Probe call used by the heartbeat.
pub const GET_HISTORY_COUNT_SIG: &str = "getHistoryCount()";
/// Setpoint writes.
pub const SET_TARGET_TEMPERATURE_SIG: &str = "setTargetTemperature(uint256)";
pub const SET_TARGET_HUMIDITY_SIG: &str = "setTargetHumidity(uint256)";

/// The three event signatures the relay subscribes to, in registration
/// order.
pub const SUBSCRIBED_EVENT_SIGS: [&str; 3] = [
    SENSOR_DATA_UPDATED_SIG,
    SYSTEM_ERROR_OCCURRED_SIG,
    ENERGY_REPORTED_SIG,
];

/// keccak256 of the canonical event signature — `topics[0]` of its logs.
pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// First four bytes of the keccak256 of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a no-argument call as 0x-prefixed hex calldata.
pub fn encode_call(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

/// Encode a single-uint256-argument call as 0x-prefixed hex calldata.
pub fn encode_uint_call(signature: &str, value: u64) -> String {
    let word = U256::from(value).to_be_bytes::<32>();
    format!("0x{}{}", hex::encode(selector(signature)), hex::encode(word))
}

/// Decode a log notification payload (`topics` + `data`) into a
/// [`ChainEvent`].
///
/// Logs whose `topics[0]` matches none of the three subscribed events are
/// a [`EvmError::Decode`] — callers drop them with a diagnostic; they are
/// never forwarded.
pub fn decode_log(log: &Value) -> Result<ChainEvent, EvmError> {
    let topic0 = log
        .get("topics")
        .and_then(Value::as_array)
        .and_then(|t| t.first())
        .and_then(Value::as_str)
        .ok_or_else(|| EvmError::Decode("log has no topics".into()))?;
    let topic0 = parse_b256(topic0)?;

    let data = log
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| EvmError::Decode("log has no data field".into()))?;
    let data = hex::decode(data.trim_start_matches("0x"))
        .map_err(|e| EvmError::Decode(format!("log data is not hex: {e}")))?;

    if topic0 == event_topic(SENSOR_DATA_UPDATED_SIG) {
        Ok(ChainEvent::SensorDataUpdated {
            temperature: uint_word(&data, 0)?.to_string(),
            humidity: uint_word(&data, 1)?.to_string(),
            power: uint_word(&data, 2)?.to_string(),
            timestamp: timestamp_word(&data, 3)?,
        })
    } else if topic0 == event_topic(SYSTEM_ERROR_OCCURRED_SIG) {
        Ok(ChainEvent::SystemErrorOccurred {
            reason: string_at_offset_word(&data, 0)?,
            timestamp: timestamp_word(&data, 1)?,
        })
    } else if topic0 == event_topic(ENERGY_REPORTED_SIG) {
        Ok(ChainEvent::EnergyReported {
            total_energy_wh_scaled: uint_word(&data, 0)?.to_string(),
            timestamp: timestamp_word(&data, 1)?,
        })
    } else {
        Err(EvmError::Decode(format!("unrecognized event topic {topic0}")))
    }
}

fn parse_b256(hex_str: &str) -> Result<B256, EvmError> {
    let bytes = hex::decode(hex_str.trim_start_matches("0x"))
        .map_err(|e| EvmError::Decode(format!("bad topic hex: {e}")))?;
    if bytes.len() != 32 {
        return Err(EvmError::Decode(format!(
            "topic is {} bytes, expected 32",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}

/// The `index`-th 32-byte word of ABI-encoded data.
fn word(data: &[u8], index: usize) -> Result<&[u8], EvmError> {
    let start = index * 32;
    data.get(start..start + 32)
        .ok_or_else(|| EvmError::Decode(format!("data too short for word {index}")))
}

fn uint_word(data: &[u8], index: usize) -> Result<U256, EvmError> {
    word(data, index).map(U256::from_be_slice)
}

fn timestamp_word(data: &[u8], index: usize) -> Result<Timestamp, EvmError> {
    let value = uint_word(data, index)?;
    let secs: u64 = value
        .try_into()
        .map_err(|_| EvmError::Decode(format!("timestamp {value} exceeds u64")))?;
    Ok(Timestamp::new(secs))
}

/// Decode a dynamic `string` whose offset sits in head word `index`.
fn string_at_offset_word(data: &[u8], index: usize) -> Result<String, EvmError> {
    let offset: usize = uint_word(data, index)?
        .try_into()
        .map_err(|_| EvmError::Decode("string offset exceeds usize".into()))?;
    let len_word = data
        .get(offset..offset + 32)
        .ok_or_else(|| EvmError::Decode("string offset past end of data".into()))?;
    let len: usize = U256::from_be_slice(len_word)
        .try_into()
        .map_err(|_| EvmError::Decode("string length exceeds usize".into()))?;
    let bytes = data
        .get(offset + 32..offset + 32 + len)
        .ok_or_else(|| EvmError::Decode("string body past end of data".into()))?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| EvmError::Decode(format!("string is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn word_hex(v: u64) -> String {
        format!("{v:064x}")
    }

    fn log(sig: &str, data_hex: &str) -> Value {
        json!({
            "address": "0x00000000000000000000000000000000000000aa",
            "topics": [event_topic(sig).to_string()],
            "data": format!("0x{data_hex}"),
        })
    }

    #[test]
    fn selectors_are_four_bytes_of_topic() {
        let topic = event_topic(GET_HISTORY_COUNT_SIG);
        assert_eq!(selector(GET_HISTORY_COUNT_SIG), topic[..4]);
    }

    #[test]
    fn encode_uint_call_is_selector_plus_padded_word() {
        let calldata = encode_uint_call(SET_TARGET_TEMPERATURE_SIG, 2150);
        // 0x + 4-byte selector + 32-byte word
        assert_eq!(calldata.len(), 2 + 8 + 64);
        assert!(calldata.ends_with(&word_hex(2150)));
    }

    #[test]
    fn decodes_sensor_data_updated() {
        let data = [2550, 6000, 1200, 1_700_000_000]
            .map(word_hex)
            .concat();
        let event = decode_log(&log(SENSOR_DATA_UPDATED_SIG, &data)).unwrap();
        assert_eq!(
            event,
            ChainEvent::SensorDataUpdated {
                temperature: "2550".into(),
                humidity: "6000".into(),
                power: "1200".into(),
                timestamp: Timestamp::new(1_700_000_000),
            }
        );
    }

    #[test]
    fn decodes_energy_reported() {
        let data = [184_000, 1_700_000_123].map(word_hex).concat();
        let event = decode_log(&log(ENERGY_REPORTED_SIG, &data)).unwrap();
        assert_eq!(
            event,
            ChainEvent::EnergyReported {
                total_energy_wh_scaled: "184000".into(),
                timestamp: Timestamp::new(1_700_000_123),
            }
        );
    }

    #[test]
    fn decodes_system_error_string() {
        let reason = b"compressor stalled";
        let mut data = String::new();
        data.push_str(&word_hex(0x40)); // offset of the string
        data.push_str(&word_hex(1_700_000_000)); // timestamp
        data.push_str(&word_hex(reason.len() as u64)); // string length
        let mut padded = reason.to_vec();
        padded.resize(32, 0);
        data.push_str(&hex::encode(padded));

        let event = decode_log(&log(SYSTEM_ERROR_OCCURRED_SIG, &data)).unwrap();
        assert_eq!(
            event,
            ChainEvent::SystemErrorOccurred {
                reason: "compressor stalled".into(),
                timestamp: Timestamp::new(1_700_000_000),
            }
        );
    }

    #[test]
    fn unknown_topic_is_a_decode_error() {
        let data = word_hex(1);
        let result = decode_log(&log("SomethingElse(uint256)", &data));
        assert!(matches!(result, Err(EvmError::Decode(_))));
    }

    #[test]
    fn truncated_data_is_a_decode_error() {
        let data = word_hex(2550); // only one of four words
        let result = decode_log(&log(SENSOR_DATA_UPDATED_SIG, &data));
        assert!(matches!(result, Err(EvmError::Decode(_))));
    }

    #[test]
    fn large_uint_values_keep_full_precision() {
        // 2^128 + 7 does not fit u128; the decimal string must still be exact
        let mut word = [0u8; 32];
        word[15] = 1;
        word[31] = 7;
        let data = format!("{}{}", hex::encode(word), word_hex(1));
        let event = decode_log(&log(ENERGY_REPORTED_SIG, &data)).unwrap();
        assert_eq!(
            event,
            ChainEvent::EnergyReported {
                total_energy_wh_scaled: "340282366920938463463374607431768211463".into(),
                timestamp: Timestamp::new(1),
            }
        );
    }
}
