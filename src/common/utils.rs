//! Utility functions for minits

use crate::common::{Error, Result};
use std::time::Duration;

/// Parse duration string (e.g., "250ms", "5s", "1m")
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::InvalidConfig("empty duration".into()));
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| Error::InvalidConfig(format!("missing duration unit: {}", s)))?;
    let (num_str, unit) = s.split_at(split);

    let num: u64 = num_str
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("invalid duration: {}", s)))?;

    let duration = match unit {
        "ms" => Duration::from_millis(num),
        "s" => Duration::from_secs(num),
        "m" => Duration::from_secs(num * 60),
        "h" => Duration::from_secs(num * 3600),
        _ => {
            return Err(Error::InvalidConfig(format!(
                "unknown duration unit: {}",
                unit
            )))
        }
    };

    Ok(duration)
}

/// Split a `key=value` argument.
pub fn parse_key_value(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::InvalidRequest(format!("expected key=value, got '{}'", s))),
    }
}

/// Split a `key=number` field argument.
pub fn parse_field(s: &str) -> Result<(String, f64)> {
    let (key, value) = parse_key_value(s)?;
    let value = value
        .parse()
        .map_err(|_| Error::InvalidRequest(format!("field '{}' is not a number", key)))?;
    Ok((key, value))
}
