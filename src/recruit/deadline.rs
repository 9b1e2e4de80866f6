//! Deadline parsing for the recruitment command
//!
//! Supports two forms:
//! - Relative: `10m`, `2h`
//! - Clock time: `21:30` (next occurrence in the caller's time zone)

use chrono::{DateTime, Days, NaiveTime, TimeZone};
use std::time::Duration;

const MINUTE_MS: u64 = 60 * 1000;
const HOUR_MS: u64 = 60 * MINUTE_MS;

/// Deadline parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeadlineError {
    #[error("Invalid deadline format '{0}' (e.g. 10m, 21:30)")]
    InvalidFormat(String),
}

/// Parse a deadline string into the time remaining from `now`.
///
/// Forms are tried in order:
/// 1. `<digits>m` / `<digits>h`
/// 2. `H:MM` in `now`'s time zone; if that time is not after `now` today,
///    the same time tomorrow is used
///
/// # Examples
/// ```
/// use boshu::recruit::deadline::parse_deadline;
/// use chrono::{FixedOffset, TimeZone};
///
/// let tz = FixedOffset::east_opt(9 * 3600).unwrap();
/// let now = tz.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
///
/// assert_eq!(parse_deadline("10m", &now).unwrap().as_millis(), 600_000);
/// assert_eq!(parse_deadline("2h", &now).unwrap().as_millis(), 7_200_000);
/// assert_eq!(parse_deadline("21:30", &now).unwrap().as_secs(), 90 * 60);
/// assert!(parse_deadline("soon", &now).is_err());
/// ```
pub fn parse_deadline<Tz: TimeZone>(
    input: &str,
    now: &DateTime<Tz>,
) -> Result<Duration, DeadlineError> {
    let invalid = || DeadlineError::InvalidFormat(input.to_string());

    if let Some(ms) = parse_relative_ms(input) {
        return ms.map(Duration::from_millis).ok_or_else(invalid);
    }

    if let Some(time) = parse_clock(input) {
        return until_next(time, now).ok_or_else(invalid);
    }

    Err(invalid())
}

/// `Some(None)` means the input had the relative shape but overflowed.
fn parse_relative_ms(input: &str) -> Option<Option<u64>> {
    let (digits, unit_ms) = if let Some(d) = input.strip_suffix('m') {
        (d, MINUTE_MS)
    } else if let Some(d) = input.strip_suffix('h') {
        (d, HOUR_MS)
    } else {
        return None;
    };

    if !is_ascii_digits(digits, 1, usize::MAX) {
        return None;
    }

    Some(digits.parse::<u64>().ok().and_then(|n| n.checked_mul(unit_ms)))
}

fn parse_clock(input: &str) -> Option<NaiveTime> {
    let (hours, minutes) = input.split_once(':')?;
    if !is_ascii_digits(hours, 1, 2) || !is_ascii_digits(minutes, 1, 2) {
        return None;
    }

    // from_hms_opt rejects hours > 23 and minutes > 59
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

fn is_ascii_digits(s: &str, min_len: usize, max_len: usize) -> bool {
    (min_len..=max_len).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Duration from `now` until the next occurrence of `time` strictly after it.
fn until_next<Tz: TimeZone>(time: NaiveTime, now: &DateTime<Tz>) -> Option<Duration> {
    let tz = now.timezone();
    let today = now.date_naive();

    // Tomorrow normally suffices; the third day covers a DST gap swallowing
    // the wall-clock time tomorrow.
    for offset in 0..3 {
        let day = today.checked_add_days(Days::new(offset))?;
        let Some(target) = tz.from_local_datetime(&day.and_time(time)).earliest() else {
            continue;
        };
        if target > *now {
            return target.signed_duration_since(now.clone()).to_std().ok();
        }
    }

    None
}
