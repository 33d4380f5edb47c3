//! Month-granular period math.
//!
//! Every subscription date is canonicalized to the first day of its month, so
//! all comparisons here operate at month resolution.

use chrono::{Datelike, NaiveDate};

use crate::error::{AppError, Res};

/// Display/wire format of a month date.
pub const MONTH_YEAR_FORMAT: &str = "%m-%Y";

/// Stand-in for an open end date when comparing intervals.
pub fn open_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 1).unwrap_or(NaiveDate::MAX)
}

/// Parses `MM-YYYY` or `YYYY-MM` into the first day of that month.
///
/// Parsed by hand: chrono's `%m`/`%Y` accept single-digit months, signed and
/// wider years, which would let `7-2025` or `+2025-07` through.
pub fn parse_month_year(s: &str) -> Res<NaiveDate> {
    let invalid = || AppError::bad_request(format!("invalid month date '{}'", s));

    let bytes = s.as_bytes();
    if bytes.len() != 7 {
        return Err(invalid());
    }

    let (month, year) = if bytes[2] == b'-' {
        (digits(&bytes[..2]), digits(&bytes[3..]))
    } else if bytes[4] == b'-' {
        (digits(&bytes[5..]), digits(&bytes[..4]))
    } else {
        return Err(invalid());
    };

    match (month, year) {
        (Some(month), Some(year)) if year > 0 => {
            NaiveDate::from_ymd_opt(year as i32, month, 1).ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn digits(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

pub fn format_month_year(date: NaiveDate) -> String {
    date.format(MONTH_YEAR_FORMAT).to_string()
}

/// Whole months from `a` to `b`, both ends included.
pub fn months_inclusive(a: NaiveDate, b: NaiveDate) -> i64 {
    let years = i64::from(b.year() - a.year());
    let months = i64::from(b.month()) - i64::from(a.month());
    years * 12 + months + 1
}

pub fn max_date(a: NaiveDate, b: NaiveDate) -> NaiveDate {
    if a > b { a } else { b }
}

/// Closed-interval intersection test; `None` ends never close.
pub fn intervals_overlap(
    start_a: NaiveDate,
    end_a: Option<NaiveDate>,
    start_b: NaiveDate,
    end_b: Option<NaiveDate>,
) -> bool {
    start_a <= end_b.unwrap_or_else(open_end) && start_b <= end_a.unwrap_or_else(open_end)
}
