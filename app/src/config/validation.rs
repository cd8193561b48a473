//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_SNOWFLAKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{1,20}$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "CHANNELS" => {
            for id in split_list(value) {
                if !RE_SNOWFLAKE.is_match(id) {
                    return Err(format!("{id:?} is not a channel id"));
                }
            }
        }
        "RESYNC_INTERVAL_SECS" => validate_int_range(value, 60, 86_400)?,
        "FETCH_TIMEOUT_SECS" => validate_int_range(value, 1, 300)?,
        _ => {}
    }
    Ok(())
}

/// Split a comma-separated list, dropping blanks.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.trim().parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
