//! Calendar numbering primitives
//!
//! Day numbers count from year 0, day 1 of the proleptic Gregorian calendar
//! (the `to_days` epoch, which predates the Unix epoch by 719,528 days).
//! Week numbering implements the eight-mode table: mode bit 0 selects Monday
//! as the first day of the week, bit 1 selects the 1-53 range where a
//! boundary week belongs to the adjacent year, bit 2 selects the "first week
//! has at least four days" rule.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// Day number of 1970-01-01
pub(crate) const EPOCH_DAYNR: i64 = 719_528;

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds from the proleptic year-0 epoch to the Unix epoch
pub(crate) const PROLEPTIC_EPOCH_SECONDS: i64 = EPOCH_DAYNR * SECONDS_PER_DAY;

/// Largest representable epoch second fraction for unix-time conversions
pub(crate) const MAX_EPOCH_SECONDS: f64 = 32_536_771_199.999_999;

/// Day number of a civil date, counting from year 0 day 1
pub(crate) fn daynr(date: NaiveDate) -> i64 {
    // chrono day 1 is 0001-01-01; year 0 contributes 366 days minus the
    // one-day offset between the two conventions
    i64::from(date.num_days_from_ce()) + 365
}

/// Inverse of `daynr`; None when the number falls outside the supported range
pub(crate) fn date_from_daynr(n: i64) -> Option<NaiveDate> {
    i32::try_from(n - 365)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

fn days_in_year(year: i32) -> i64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Weekday index of a day number: 0=Monday, or 0=Sunday when `sunday_first`
fn weekday_of(daynr: i64, sunday_first: bool) -> i64 {
    (daynr + 5 + i64::from(sunday_first)) % 7
}

/// Week number of `date` under `mode` (0..=7), together with the year the
/// week is attributed to. The attributed year differs from the calendar year
/// in boundary weeks: Dec 31 may count in week 1 of the next year and Jan 1
/// in the last week of the previous one.
pub(crate) fn calc_week(date: NaiveDate, mode: u8) -> (i32, u32) {
    let monday_first = mode & 1 != 0;
    let mut week_year = mode & 2 != 0;
    // Without Monday-first, bit 2 has inverted meaning
    let effective = if monday_first { mode } else { mode ^ 4 };
    let first_weekday = effective & 4 != 0;

    let day_number = daynr(date);
    let mut year = date.year();
    let jan_first =
        NaiveDate::from_ymd_opt(year, 1, 1).expect("January 1st exists for every valid year");
    let mut first_daynr = daynr(jan_first);
    let mut weekday = weekday_of(first_daynr, !monday_first);

    if date.month() == 1 && i64::from(date.day()) <= 7 - weekday {
        if !week_year && ((first_weekday && weekday != 0) || (!first_weekday && weekday >= 4)) {
            return (year, 0);
        }
        week_year = true;
        year -= 1;
        let prev_days = days_in_year(year);
        first_daynr -= prev_days;
        weekday = (weekday + 53 * 7 - prev_days) % 7;
    }

    let days = if (first_weekday && weekday != 0) || (!first_weekday && weekday >= 4) {
        day_number - (first_daynr + (7 - weekday))
    } else {
        day_number - (first_daynr - weekday)
    };

    if week_year && days >= 52 * 7 {
        weekday = (weekday + days_in_year(year)) % 7;
        if (!first_weekday && weekday < 4) || (first_weekday && weekday == 0) {
            return (year + 1, 1);
        }
    }

    (year, (days / 7 + 1) as u32)
}

/// Whole calendar months from `from` to `to`, truncated toward zero
pub(crate) fn months_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let mut months =
        i64::from(to.year() - from.year()) * 12 + i64::from(to.month() as i32 - from.month() as i32);
    if months > 0 && add_months(from, months).is_some_and(|adj| adj > to) {
        months -= 1;
    } else if months < 0 && add_months(from, months).is_some_and(|adj| adj < to) {
        months += 1;
    }
    months
}

fn add_months(dt: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    if months >= 0 {
        dt.checked_add_months(Months::new(u32::try_from(months).ok()?))
    } else {
        dt.checked_sub_months(Months::new(u32::try_from(-months).ok()?))
    }
}

/// Round half away from zero to an integer
pub(crate) fn round_half_away(x: f64) -> i64 {
    x.round() as i64
}

/// Fractional part of a non-negative `x` rounded to microseconds; a fraction
/// that rounds up to a whole second saturates at 999,999
pub(crate) fn micro_fraction(x: f64) -> u32 {
    let micros = ((x - x.trunc()) * 1_000_000.0).round() as u32;
    micros.min(999_999)
}

/// Decode a packed numeric datetime, selected by the digit count of the
/// integer part: `YYMMDD`, `YYYYMMDD`, `YYMMDDhhmmss`, `YYYYMMDDhhmmss`,
/// with an optional fractional-second part. Two-digit years pivot at 70:
/// 00-69 map to 2000-2069, 70-99 to 1970-1999. Returns None for any other
/// shape or for invalid calendar/clock fields.
pub(crate) fn decode_packed(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let int_part = value.trunc() as i64;
    let micros = micro_fraction(value);
    let digits = int_part.to_string();

    let (year, rest): (i32, &str) = match digits.len() {
        6 | 12 => {
            let yy: i32 = digits[..2].parse().ok()?;
            (if yy < 70 { 2000 + yy } else { 1900 + yy }, &digits[2..])
        }
        8 | 14 => (digits[..4].parse().ok()?, &digits[4..]),
        _ => return None,
    };

    let month: u32 = rest[..2].parse().ok()?;
    let day: u32 = rest[2..4].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = if rest.len() > 4 {
        let hour: u32 = rest[4..6].parse().ok()?;
        let minute: u32 = rest[6..8].parse().ok()?;
        let second: u32 = rest[8..10].parse().ok()?;
        chrono::NaiveTime::from_hms_micro_opt(hour, minute, second, micros)?
    } else {
        chrono::NaiveTime::from_hms_micro_opt(0, 0, 0, micros)?
    };

    Some(date.and_time(time))
}
