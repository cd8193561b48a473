//! Conversion between calendar dates and Discord snowflake ids.
//!
//! A snowflake stores milliseconds since the Discord epoch
//! (2015-01-01T00:00:00Z) in its upper 42 bits. The low 22 bits hold
//! worker/process/sequence numbers and are ignored when decoding.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Discord epoch as milliseconds since the Unix epoch.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Width of the sequence/worker section below the timestamp.
pub const TIMESTAMP_SHIFT: u32 = 22;

/// Storage format for puzzle dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeError {
    #[error("malformed snowflake id: {0:?}")]
    InvalidId(String),

    #[error("malformed date: {0:?} (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)")]
    InvalidDate(String),

    #[error("{0} is before the Discord epoch")]
    BeforeEpoch(NaiveDateTime),

    #[error("{0} does not fit in a snowflake")]
    Overflow(NaiveDateTime),
}

/// Smallest snowflake that could have been issued at midnight UTC of `date`.
pub fn encode_date(date: NaiveDate) -> Result<u64, SnowflakeError> {
    encode_datetime(date.and_time(chrono::NaiveTime::MIN))
}

/// Smallest snowflake that could have been issued at `datetime` (UTC).
pub fn encode_datetime(datetime: NaiveDateTime) -> Result<u64, SnowflakeError> {
    let ms = datetime.and_utc().timestamp_millis() - DISCORD_EPOCH_MS;
    if ms < 0 {
        return Err(SnowflakeError::BeforeEpoch(datetime));
    }
    let ms = ms as u64;
    if ms >> (64 - TIMESTAMP_SHIFT) != 0 {
        return Err(SnowflakeError::Overflow(datetime));
    }
    Ok(ms << TIMESTAMP_SHIFT)
}

/// Encode a `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS` string.
pub fn encode_str(value: &str) -> Result<u64, SnowflakeError> {
    let trimmed = value.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT) {
        return encode_datetime(datetime);
    }
    match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        Ok(date) => encode_date(date),
        Err(_) => Err(SnowflakeError::InvalidDate(value.to_string())),
    }
}

/// Creation instant of a snowflake, millisecond precision.
pub fn decode_timestamp(id: u64) -> DateTime<Utc> {
    let ms = (id >> TIMESTAMP_SHIFT) as i64 + DISCORD_EPOCH_MS;
    // 42 bits of milliseconds past 2015 stay far inside chrono's range.
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// UTC calendar day a snowflake was issued on.
pub fn decode(id: u64) -> NaiveDate {
    decode_timestamp(id).date_naive()
}

/// Decode a decimal snowflake string.
pub fn decode_str(id: &str) -> Result<NaiveDate, SnowflakeError> {
    let value = parse_id(id)?;
    Ok(decode(value))
}

/// Parse a decimal snowflake string.
pub fn parse_id(id: &str) -> Result<u64, SnowflakeError> {
    id.trim()
        .parse::<u64>()
        .map_err(|_| SnowflakeError::InvalidId(id.to_string()))
}

/// Format a date the way puzzle rows store it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Half-open id range `[start, end)` covering every snowflake issued on
/// the UTC days `from..=to`.
pub fn id_window(from: NaiveDate, to: NaiveDate) -> Result<(u64, u64), SnowflakeError> {
    let start = encode_date(from)?;
    let after = to
        .checked_add_days(Days::new(1))
        .ok_or(SnowflakeError::Overflow(to.and_time(chrono::NaiveTime::MIN)))?;
    Ok((start, encode_date(after)?))
}

/// Default statistics window: the 30 days up to and including `today`.
pub fn default_date_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.checked_sub_days(Days::new(30)).unwrap_or(today);
    (start, today)
}
