//! Setpoint commands and fixed-point scaled values.
//!
//! The contract stores setpoints as unsigned integers with two implied
//! fractional digits: `"21.5"` degrees is submitted as `2150`. Parsing is
//! strict — the value either converts exactly or the command is rejected
//! before any chain interaction.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which setpoint a command targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setpoint {
    Temperature,
    Humidity,
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setpoint::Temperature => write!(f, "temperature"),
            Setpoint::Humidity => write!(f, "humidity"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScaledValueError {
    #[error("value is empty")]
    Empty,

    #[error("value {0:?} is not a decimal number")]
    Malformed(String),

    #[error("value {0:?} is negative; setpoints are unsigned on-chain")]
    Negative(String),

    #[error("value {0:?} has more than two fractional digits")]
    TooPrecise(String),

    #[error("value {0:?} is out of range")]
    Overflow(String),
}

/// Parse decimal text into a ×100 scaled integer.
///
/// `"21.5"` → `2150`, `"7"` → `700`, `"0.05"` → `5`. At most two fractional
/// digits are accepted; anything else is an error, never silently rounded.
pub fn parse_scaled(raw: &str) -> Result<u64, ScaledValueError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScaledValueError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(ScaledValueError::Negative(raw.to_string()));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    // "21." is fine (frac empty); "." alone is not.
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ScaledValueError::Malformed(raw.to_string()));
    }
    if frac_part.len() > 2 {
        return Err(ScaledValueError::TooPrecise(raw.to_string()));
    }

    let digits_ok = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits_ok(int_part) || !digits_ok(frac_part) {
        return Err(ScaledValueError::Malformed(raw.to_string()));
    }

    let whole: u64 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| ScaledValueError::Overflow(raw.to_string()))?
    };

    // Right-pad the fraction to two digits: "5" means 50 hundredths.
    let frac: u64 = match frac_part.len() {
        0 => 0,
        1 => frac_part.parse::<u64>().expect("checked ascii digits") * 10,
        _ => frac_part.parse::<u64>().expect("checked ascii digits"),
    };

    whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| ScaledValueError::Overflow(raw.to_string()))
}
