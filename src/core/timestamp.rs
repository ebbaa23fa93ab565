use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::{Europe::Brussels, Tz};

use crate::prelude::*;

/// Central European time zone the markets settle in.
pub const TIME_ZONE: Tz = Brussels;

pub type Timestamp = DateTime<Tz>;

/// Midnight of the date in the market time zone.
pub fn start_of_day(date: NaiveDate) -> Result<Timestamp> {
    TIME_ZONE
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .with_context(|| format!("`{date}` has no midnight in {TIME_ZONE}"))
}

/// Parse an RFC 3339 timestamp, or a naive one in the market time zone.
pub fn parse_timestamp(text: &str) -> Result<Timestamp> {
    let text = text.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&TIME_ZONE));
    }
    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .with_context(|| format!("`{text}` is not a valid timestamp"))?;
    TIME_ZONE
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("`{text}` does not exist in {TIME_ZONE}"))
}
