//! Status Derivation Module
//!
//! Maps a (start, end) submission-window pair to a lifecycle status relative
//! to the current time. Malformed or missing timestamps behave as absent;
//! derivation never fails.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::types::Status;

/// Parse an ISO-ish timestamp, accepting a trailing `Z`, a naive datetime,
/// or a bare date. Naive values are treated as UTC.
fn parse_iso_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Derive the lifecycle status for a submission window against the current time.
pub fn derive_status(begins_iso: Option<&str>, ends_iso: Option<&str>) -> Status {
    derive_status_at(begins_iso, ends_iso, Utc::now())
}

/// Same as [`derive_status`] but against an explicit `now`.
///
/// Decision order, first match wins:
/// 1. start in the future -> upcoming
/// 2. now within [start, end] -> running
/// 3. end in the past -> ended
/// 4. anything else (absent or unparsable dates) -> upcoming
pub fn derive_status_at(
    begins_iso: Option<&str>,
    ends_iso: Option<&str>,
    now: DateTime<Utc>,
) -> Status {
    let start = begins_iso.and_then(parse_iso_timestamp);
    let end = ends_iso.and_then(parse_iso_timestamp);

    match (start, end) {
        (Some(start), _) if now < start => Status::Upcoming,
        (Some(start), Some(end)) if start <= now && now <= end => Status::Running,
        (_, Some(end)) if now > end => Status::Ended,
        _ => Status::Upcoming,
    }
}
