//! Record normalization
//!
//! Turns the wire-format strings and integers into date-time values the
//! scales can map. Runs exactly once per fetch; the loader caches the result.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::error::{LoadError, LoadResult};
use super::types::{RaceRecord, RawRecord};

/// Display format for finish times
pub const TIME_FORMAT: &str = "%M:%S";

/// Reference date every finish time is anchored to
fn reference_midnight() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1970, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a "MM:SS" string into a time-of-day on the reference date
///
/// Overflowing components carry over, so "75:00" is 01:15:00.
pub fn parse_time(value: &str) -> Option<NaiveDateTime> {
    let (minutes, seconds) = value.trim().split_once(':')?;
    if seconds.contains(':') {
        return None;
    }

    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;

    reference_midnight()?.checked_add_signed(
        Duration::minutes(minutes as i64) + Duration::seconds(seconds as i64),
    )
}

/// January 1 of `year`, midnight
pub fn year_value(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format a finish time as "MM:SS"
pub fn format_time(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Normalize a single raw record
pub fn normalize_record(raw: RawRecord) -> LoadResult<RaceRecord> {
    let time = parse_time(&raw.time).ok_or_else(|| LoadError::InvalidTime {
        name: raw.name.clone(),
        value: raw.time.clone(),
    })?;

    let year = year_value(raw.year).ok_or_else(|| LoadError::InvalidYear {
        name: raw.name.clone(),
        year: raw.year,
    })?;

    Ok(RaceRecord {
        name: raw.name,
        nationality: raw.nationality,
        place: raw.place,
        year,
        time,
        doping: raw.doping,
        url: if raw.url.is_empty() { None } else { Some(raw.url) },
    })
}

/// Normalize a whole payload
///
/// The batch fails on the first malformed record.
pub fn normalize(raw: Vec<RawRecord>) -> LoadResult<Vec<RaceRecord>> {
    raw.into_iter().map(normalize_record).collect()
}
