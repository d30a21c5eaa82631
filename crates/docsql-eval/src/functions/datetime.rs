//! Temporal functions
//!
//! Covers the cast family (`date`, `time`, `datetime`, `timestamp`), the
//! clock family (`now`, `curdate`, ...) pinned to the query start instant,
//! interval arithmetic, field extraction, week numbering, day-number and
//! epoch conversions, and the `makedate`/`maketime` constructors.
//!
//! String arguments are parsed as temporal literals inside the function
//! body; a malformed literal is a semantic-check failure naming the value.
//! Computations whose result has no representation ("no such value", e.g.
//! `from_unixtime` outside the representable range) yield `NULL` instead.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use docsql_types::{temporal, ExprCoreType, ExprError, ExprResult, ExprValue, IntervalUnit, IntervalValue};

use crate::context::FunctionProperties;
use crate::registry::{FunctionRegistry, ReturnType};

use super::calendar::{
    calc_week, date_from_daynr, daynr, decode_packed, micro_fraction, months_between,
    round_half_away, MAX_EPOCH_SECONDS, PROLEPTIC_EPOCH_SECONDS, SECONDS_PER_DAY,
};
use super::{binary, nullary, ternary, unary};

pub(crate) fn register(registry: &mut FunctionRegistry) {
    use ExprCoreType::{Date, DateTime, Double, Integer, Interval, Long, String, Time, Timestamp};

    let date_t = ReturnType::Fixed(Date);
    let time_t = ReturnType::Fixed(Time);
    let datetime_t = ReturnType::Fixed(DateTime);
    let integer_t = ReturnType::Fixed(Integer);
    let long_t = ReturnType::Fixed(Long);
    let string_t = ReturnType::Fixed(String);

    for name in ["now", "current_timestamp", "localtimestamp", "localtime"] {
        registry.register(name, vec![], datetime_t, nullary(now));
    }
    for name in ["curdate", "current_date"] {
        registry.register(name, vec![], date_t, nullary(curdate));
    }
    for name in ["curtime", "current_time"] {
        registry.register(name, vec![], time_t, nullary(curtime));
    }

    registry.register("date", vec![Timestamp], date_t, unary(cast_date));
    registry.register("time", vec![Timestamp], time_t, unary(cast_time));
    registry.register("datetime", vec![Timestamp], datetime_t, unary(cast_datetime));
    registry.register(
        "timestamp",
        vec![Timestamp],
        ReturnType::Fixed(Timestamp),
        unary(cast_timestamp),
    );

    // Interval arithmetic keeps a pure date a date and a timestamp a
    // timestamp, so the result kind depends on the input
    let shifted_t = ReturnType::Fixed(ExprCoreType::Undefined);
    registry.register("date_add", vec![Timestamp, Interval], shifted_t, binary(date_add));
    registry.register("date_sub", vec![Timestamp, Interval], shifted_t, binary(date_sub));
    registry.register("adddate", vec![Timestamp, Interval], shifted_t, binary(date_add));
    registry.register("subdate", vec![Timestamp, Interval], shifted_t, binary(date_sub));
    registry.register("adddate", vec![Timestamp, Long], shifted_t, binary(adddate_days));
    registry.register("subdate", vec![Timestamp, Long], shifted_t, binary(subdate_days));
    registry.register(
        "timestampadd",
        vec![String, Long, Timestamp],
        shifted_t,
        ternary(timestampadd),
    );

    registry.register("datediff", vec![Timestamp, Timestamp], long_t, binary(datediff));
    registry.register(
        "timestampdiff",
        vec![String, Timestamp, Timestamp],
        long_t,
        ternary(timestampdiff),
    );

    registry.register("extract", vec![String, Timestamp], long_t, binary(extract));
    registry.register("year", vec![Timestamp], integer_t, unary(year));
    registry.register("quarter", vec![Timestamp], integer_t, unary(quarter));
    for name in ["month", "month_of_year"] {
        registry.register(name, vec![Timestamp], integer_t, unary(month));
    }
    for name in ["day", "dayofmonth", "day_of_month"] {
        registry.register(name, vec![Timestamp], integer_t, unary(dayofmonth));
    }
    for name in ["dayofweek", "day_of_week"] {
        registry.register(name, vec![Timestamp], integer_t, unary(dayofweek));
    }
    for name in ["dayofyear", "day_of_year"] {
        registry.register(name, vec![Timestamp], integer_t, unary(dayofyear));
    }
    for name in ["hour", "hour_of_day"] {
        registry.register(name, vec![Timestamp], integer_t, unary(hour));
    }
    for name in ["minute", "minute_of_hour"] {
        registry.register(name, vec![Timestamp], integer_t, unary(minute));
    }
    for name in ["second", "second_of_minute"] {
        registry.register(name, vec![Timestamp], integer_t, unary(second));
    }
    registry.register("microsecond", vec![Timestamp], integer_t, unary(microsecond));
    registry.register("dayname", vec![Timestamp], string_t, unary(dayname));
    registry.register("monthname", vec![Timestamp], string_t, unary(monthname));

    for name in ["week", "week_of_year"] {
        registry.register(name, vec![Timestamp], integer_t, unary(week_default));
        registry.register(name, vec![Timestamp, Integer], integer_t, binary(week_with_mode));
    }
    registry.register("yearweek", vec![Timestamp], integer_t, unary(yearweek_default));
    registry.register(
        "yearweek",
        vec![Timestamp, Integer],
        integer_t,
        binary(yearweek_with_mode),
    );

    registry.register("to_days", vec![Timestamp], long_t, unary(to_days));
    registry.register("from_days", vec![Long], date_t, unary(from_days));
    registry.register("to_seconds", vec![Timestamp], long_t, unary(to_seconds));
    registry.register("to_seconds", vec![Long], long_t, unary(to_seconds_packed));

    registry.register("unix_timestamp", vec![], long_t, nullary(unix_timestamp_now));
    registry.register(
        "unix_timestamp",
        vec![Double],
        ReturnType::Fixed(Double),
        unary(unix_timestamp_packed),
    );
    registry.register(
        "unix_timestamp",
        vec![Timestamp],
        ReturnType::Fixed(Double),
        unary(unix_timestamp_temporal),
    );
    registry.register("from_unixtime", vec![Double], datetime_t, unary(from_unixtime));
    registry.register(
        "from_unixtime",
        vec![Double, String],
        string_t,
        binary(from_unixtime_formatted),
    );

    registry.register("makedate", vec![Double, Double], date_t, binary(makedate));
    registry.register("maketime", vec![Double, Double, Double], time_t, ternary(maketime));
}

// === Argument coercion helpers ===

/// Date view of a temporal or literal-string argument; a bare `Time`
/// contributes the query date
pub(crate) fn as_civil_date(props: &FunctionProperties, value: &ExprValue) -> ExprResult<NaiveDate> {
    match value {
        ExprValue::String(s) => temporal::parse_datetime(s).map(|dt| dt.date()),
        ExprValue::Time(_) => Ok(props.current_date()),
        other => other.date_value(),
    }
}

/// Datetime view of a temporal or literal-string argument
pub(crate) fn as_civil_datetime(
    props: &FunctionProperties,
    value: &ExprValue,
) -> ExprResult<NaiveDateTime> {
    match value {
        ExprValue::String(s) => temporal::parse_datetime(s),
        ExprValue::Time(t) => Ok(props.current_date().and_time(*t)),
        other => other.datetime_value(),
    }
}

/// Time view of a temporal or literal-string argument
fn as_civil_time(value: &ExprValue) -> ExprResult<NaiveTime> {
    match value {
        ExprValue::String(s) => temporal::parse_time(s)
            .or_else(|e| temporal::parse_datetime(s).map(|dt| dt.time()).map_err(|_| e)),
        ExprValue::Date(_) => Ok(NaiveTime::MIN),
        other => other.time_value(),
    }
}

// === Clock family ===

fn now(props: &FunctionProperties) -> ExprResult<ExprValue> {
    Ok(ExprValue::datetime(props.current_datetime()))
}

fn curdate(props: &FunctionProperties) -> ExprResult<ExprValue> {
    Ok(ExprValue::date(props.current_date()))
}

fn curtime(props: &FunctionProperties) -> ExprResult<ExprValue> {
    Ok(ExprValue::time(props.current_time()))
}

// === Cast family ===

fn cast_date(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    as_civil_date(props, value).map(ExprValue::date)
}

fn cast_time(_props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    as_civil_time(value).map(ExprValue::time)
}

fn cast_datetime(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    as_civil_datetime(props, value).map(ExprValue::datetime)
}

fn cast_timestamp(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    as_civil_datetime(props, value).map(|dt| ExprValue::timestamp(dt.and_utc()))
}

// === Interval arithmetic ===

/// Add an interval; a pure date plus a date-granularity interval stays a
/// date, a timestamp stays a timestamp, every other combination promotes
/// to a datetime
fn apply_interval(
    props: &FunctionProperties,
    value: &ExprValue,
    interval: &IntervalValue,
) -> ExprResult<ExprValue> {
    match value {
        ExprValue::Date(d) if interval.is_date_granularity() => {
            let shifted = interval.apply_to(d.and_time(NaiveTime::MIN))?;
            Ok(ExprValue::date(shifted.date()))
        }
        ExprValue::Timestamp(ts) => {
            let shifted = interval.apply_to(ts.naive_utc())?;
            Ok(ExprValue::timestamp(shifted.and_utc()))
        }
        other => {
            let dt = as_civil_datetime(props, other)?;
            Ok(ExprValue::datetime(interval.apply_to(dt)?))
        }
    }
}

fn date_add(
    props: &FunctionProperties,
    value: &ExprValue,
    interval: &ExprValue,
) -> ExprResult<ExprValue> {
    apply_interval(props, value, interval.interval_value()?)
}

fn date_sub(
    props: &FunctionProperties,
    value: &ExprValue,
    interval: &ExprValue,
) -> ExprResult<ExprValue> {
    apply_interval(props, value, &interval.interval_value()?.negated())
}

/// Day-count form of `adddate`: a pure date stays a date
fn shift_days(
    props: &FunctionProperties,
    value: &ExprValue,
    days: i64,
) -> ExprResult<ExprValue> {
    match value {
        ExprValue::Date(d) => date_from_daynr(daynr(*d) + days)
            .map(ExprValue::date)
            .ok_or_else(|| ExprError::overflow("day addition")),
        ExprValue::Timestamp(ts) => ts
            .checked_add_signed(TimeDelta::days(days))
            .map(ExprValue::timestamp)
            .ok_or_else(|| ExprError::overflow("day addition")),
        other => {
            let dt = as_civil_datetime(props, other)?;
            dt.checked_add_signed(TimeDelta::days(days))
                .map(ExprValue::datetime)
                .ok_or_else(|| ExprError::overflow("day addition"))
        }
    }
}

fn adddate_days(
    props: &FunctionProperties,
    value: &ExprValue,
    days: &ExprValue,
) -> ExprResult<ExprValue> {
    shift_days(props, value, days.long_value()?)
}

fn subdate_days(
    props: &FunctionProperties,
    value: &ExprValue,
    days: &ExprValue,
) -> ExprResult<ExprValue> {
    shift_days(props, value, -days.long_value()?)
}

fn timestampadd(
    props: &FunctionProperties,
    unit: &ExprValue,
    amount: &ExprValue,
    value: &ExprValue,
) -> ExprResult<ExprValue> {
    let unit = IntervalUnit::parse(unit.string_value()?)?;
    let interval = IntervalValue::from_unit(unit, amount.long_value()?)?;
    match value {
        ExprValue::Timestamp(ts) => {
            let shifted = interval.apply_to(ts.naive_utc())?;
            Ok(ExprValue::timestamp(shifted.and_utc()))
        }
        other => {
            let dt = as_civil_datetime(props, other)?;
            Ok(ExprValue::datetime(interval.apply_to(dt)?))
        }
    }
}

// === Differences ===

/// Day difference of the date parts, first minus second
fn datediff(
    props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    let lhs = daynr(as_civil_date(props, left)?);
    let rhs = daynr(as_civil_date(props, right)?);
    Ok(ExprValue::long(lhs - rhs))
}

/// Whole elapsed units from `from` to `to`, truncated toward zero
fn timestampdiff(
    props: &FunctionProperties,
    unit: &ExprValue,
    from: &ExprValue,
    to: &ExprValue,
) -> ExprResult<ExprValue> {
    let unit = IntervalUnit::parse(unit.string_value()?)?;
    let from = as_civil_datetime(props, from)?;
    let to = as_civil_datetime(props, to)?;
    let delta = to.signed_duration_since(from);
    let count = match unit {
        IntervalUnit::Year => months_between(from, to) / 12,
        IntervalUnit::Quarter => months_between(from, to) / 3,
        IntervalUnit::Month => months_between(from, to),
        IntervalUnit::Week => delta.num_weeks(),
        IntervalUnit::Day => delta.num_days(),
        IntervalUnit::Hour => delta.num_hours(),
        IntervalUnit::Minute => delta.num_minutes(),
        IntervalUnit::Second => delta.num_seconds(),
        IntervalUnit::Microsecond => delta
            .num_microseconds()
            .ok_or_else(|| ExprError::overflow("timestampdiff in microseconds"))?,
        compound => {
            return Err(ExprError::semantic_check(format!(
                "timestampdiff does not support unit {}",
                compound.name()
            )));
        }
    };
    Ok(ExprValue::long(count))
}

// === Field extraction ===

fn extract(
    props: &FunctionProperties,
    unit: &ExprValue,
    value: &ExprValue,
) -> ExprResult<ExprValue> {
    let unit = IntervalUnit::parse(unit.string_value()?)?;
    let dt = as_civil_datetime(props, value)?;
    let (y, mo, d) = (i64::from(dt.year()), i64::from(dt.month()), i64::from(dt.day()));
    let (h, mi, s) = (
        i64::from(dt.hour()),
        i64::from(dt.minute()),
        i64::from(dt.second()),
    );
    let us = i64::from(dt.nanosecond() / 1_000);
    // Compound units concatenate their fields as decimal digit groups
    let out = match unit {
        IntervalUnit::Year => y,
        IntervalUnit::Quarter => (mo + 2) / 3,
        IntervalUnit::Month => mo,
        IntervalUnit::Week => i64::from(calc_week(dt.date(), 0).1),
        IntervalUnit::Day => d,
        IntervalUnit::Hour => h,
        IntervalUnit::Minute => mi,
        IntervalUnit::Second => s,
        IntervalUnit::Microsecond => us,
        IntervalUnit::YearMonth => y * 100 + mo,
        IntervalUnit::DayHour => d * 100 + h,
        IntervalUnit::DayMinute => d * 10_000 + h * 100 + mi,
        IntervalUnit::DaySecond => d * 1_000_000 + h * 10_000 + mi * 100 + s,
        IntervalUnit::DayMicrosecond => (d * 1_000_000 + h * 10_000 + mi * 100 + s) * 1_000_000 + us,
        IntervalUnit::HourMinute => h * 100 + mi,
        IntervalUnit::HourSecond => h * 10_000 + mi * 100 + s,
        IntervalUnit::HourMicrosecond => (h * 10_000 + mi * 100 + s) * 1_000_000 + us,
        IntervalUnit::MinuteSecond => mi * 100 + s,
        IntervalUnit::MinuteMicrosecond => (mi * 100 + s) * 1_000_000 + us,
        IntervalUnit::SecondMicrosecond => s * 1_000_000 + us,
    };
    Ok(ExprValue::long(out))
}

fn year(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    Ok(ExprValue::integer(as_civil_date(props, value)?.year()))
}

fn quarter(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let month = as_civil_date(props, value)?.month();
    Ok(ExprValue::integer(((month + 2) / 3) as i32))
}

fn month(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    Ok(ExprValue::integer(as_civil_date(props, value)?.month() as i32))
}

fn dayofmonth(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    Ok(ExprValue::integer(as_civil_date(props, value)?.day() as i32))
}

/// Weekday index, 1 = Sunday through 7 = Saturday
fn dayofweek(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let weekday = as_civil_date(props, value)?.weekday();
    Ok(ExprValue::integer(weekday.number_from_sunday() as i32))
}

fn dayofyear(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    Ok(ExprValue::integer(as_civil_date(props, value)?.ordinal() as i32))
}

fn hour(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let _ = props;
    Ok(ExprValue::integer(as_civil_time(value)?.hour() as i32))
}

fn minute(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let _ = props;
    Ok(ExprValue::integer(as_civil_time(value)?.minute() as i32))
}

fn second(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let _ = props;
    Ok(ExprValue::integer(as_civil_time(value)?.second() as i32))
}

fn microsecond(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let _ = props;
    Ok(ExprValue::integer((as_civil_time(value)?.nanosecond() / 1_000) as i32))
}

fn dayname(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let date = as_civil_date(props, value)?;
    Ok(ExprValue::string(date.format("%A").to_string()))
}

fn monthname(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let date = as_civil_date(props, value)?;
    Ok(ExprValue::string(date.format("%B").to_string()))
}

// === Week numbering ===

fn week_mode(value: &ExprValue) -> ExprResult<u8> {
    let mode = value.long_value()?;
    u8::try_from(mode)
        .ok()
        .filter(|m| *m <= 7)
        .ok_or_else(|| {
            ExprError::semantic_check(format!(
                "mode:{mode} is invalid, please use mode value between 0-7"
            ))
        })
}

fn week_default(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let date = as_civil_date(props, value)?;
    Ok(ExprValue::integer(calc_week(date, 0).1 as i32))
}

fn week_with_mode(
    props: &FunctionProperties,
    value: &ExprValue,
    mode: &ExprValue,
) -> ExprResult<ExprValue> {
    let date = as_civil_date(props, value)?;
    Ok(ExprValue::integer(calc_week(date, week_mode(mode)?).1 as i32))
}

/// `yearweek` always attributes boundary weeks to the adjacent year, so the
/// week-year bit is forced regardless of mode
fn yearweek_impl(date: NaiveDate, mode: u8) -> ExprValue {
    let (year, week) = calc_week(date, mode | 2);
    ExprValue::integer(year * 100 + week as i32)
}

fn yearweek_default(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    Ok(yearweek_impl(as_civil_date(props, value)?, 0))
}

fn yearweek_with_mode(
    props: &FunctionProperties,
    value: &ExprValue,
    mode: &ExprValue,
) -> ExprResult<ExprValue> {
    Ok(yearweek_impl(as_civil_date(props, value)?, week_mode(mode)?))
}

// === Day-number and epoch conversions ===

fn to_days(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    Ok(ExprValue::long(daynr(as_civil_date(props, value)?)))
}

fn from_days(_props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let n = value.long_value()?;
    date_from_daynr(n).map(ExprValue::date).ok_or_else(|| {
        ExprError::semantic_check(format!("day number:{n} is out of the supported date range"))
    })
}

fn seconds_from_year_zero(dt: NaiveDateTime) -> i64 {
    daynr(dt.date()) * SECONDS_PER_DAY + i64::from(dt.num_seconds_from_midnight())
}

fn to_seconds(props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let dt = as_civil_datetime(props, value)?;
    Ok(ExprValue::long(seconds_from_year_zero(dt)))
}

/// Packed-numeric form of `to_seconds`; an undecodable shape is "no such
/// value" and yields NULL
fn to_seconds_packed(_props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    let packed = value.long_value()?;
    if packed < 0 {
        return Err(ExprError::semantic_check(format!(
            "value:{packed} is out of range, to_seconds requires a non-negative packed datetime"
        )));
    }
    Ok(match decode_packed(packed as f64) {
        Some(dt) => ExprValue::long(PROLEPTIC_EPOCH_SECONDS + dt.and_utc().timestamp()),
        None => ExprValue::null(),
    })
}

fn unix_timestamp_now(props: &FunctionProperties) -> ExprResult<ExprValue> {
    Ok(ExprValue::long(props.epoch_seconds()))
}

fn epoch_seconds_of(dt: NaiveDateTime) -> f64 {
    let instant = dt.and_utc();
    instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_micros()) / 1_000_000.0
}

fn clamp_epoch(seconds: f64) -> f64 {
    if (0.0..=MAX_EPOCH_SECONDS).contains(&seconds) {
        seconds
    } else {
        0.0
    }
}

fn unix_timestamp_temporal(
    props: &FunctionProperties,
    value: &ExprValue,
) -> ExprResult<ExprValue> {
    // A string argument may be a temporal literal or a packed numeric shape
    if let ExprValue::String(s) = value {
        if temporal::parse_datetime(s).is_err() {
            if let Ok(packed) = s.parse::<f64>() {
                return unix_timestamp_packed(props, &ExprValue::double(packed));
            }
        }
    }
    let dt = as_civil_datetime(props, value)?;
    Ok(ExprValue::double(clamp_epoch(epoch_seconds_of(dt))))
}

/// Packed-numeric form of `unix_timestamp`; an undecodable shape or a
/// decoded instant with no in-range epoch representation yields NULL
fn unix_timestamp_packed(
    _props: &FunctionProperties,
    value: &ExprValue,
) -> ExprResult<ExprValue> {
    Ok(decode_packed(value.double_value()?)
        .map(epoch_seconds_of)
        .filter(|s| (0.0..=MAX_EPOCH_SECONDS).contains(s))
        .map_or_else(ExprValue::null, ExprValue::double))
}

fn datetime_from_epoch(seconds: f64) -> Option<NaiveDateTime> {
    if !(0.0..=MAX_EPOCH_SECONDS).contains(&seconds) {
        return None;
    }
    // Rounding at microsecond precision carries a near-whole fraction into
    // the seconds field
    let micros = (seconds * 1_000_000.0).round() as i64;
    chrono::DateTime::from_timestamp_micros(micros).map(|ts| ts.naive_utc())
}

fn from_unixtime(_props: &FunctionProperties, value: &ExprValue) -> ExprResult<ExprValue> {
    Ok(match datetime_from_epoch(value.double_value()?) {
        Some(dt) => ExprValue::datetime(dt),
        None => ExprValue::null(),
    })
}

fn from_unixtime_formatted(
    _props: &FunctionProperties,
    value: &ExprValue,
    fmt: &ExprValue,
) -> ExprResult<ExprValue> {
    Ok(match datetime_from_epoch(value.double_value()?) {
        Some(dt) => ExprValue::string(super::format::render_datetime(dt, fmt.string_value()?)),
        None => ExprValue::null(),
    })
}

// === Constructors ===

/// Build a date from a year and a 1-based day of year; the day count rolls
/// past December 31 into subsequent years. Year 0 reads as 2000; a negative
/// year or a non-positive day count is "no such value"
fn makedate(
    _props: &FunctionProperties,
    year: &ExprValue,
    day_of_year: &ExprValue,
) -> ExprResult<ExprValue> {
    let year = round_half_away(year.double_value()?);
    let day_of_year = round_half_away(day_of_year.double_value()?);
    if year < 0 || day_of_year <= 0 {
        return Ok(ExprValue::null());
    }
    let year = if year == 0 { 2000 } else { year };
    let date = i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        .and_then(|jan1| jan1.checked_add_days(Days::new(day_of_year as u64 - 1)));
    Ok(match date {
        Some(d) => ExprValue::date(d),
        None => ExprValue::null(),
    })
}

/// Build a time of day from hour/minute/second; the second carries a
/// microsecond fraction. Negative components are "no such value"; components
/// beyond the clock range are a semantic failure
fn maketime(
    _props: &FunctionProperties,
    hour: &ExprValue,
    minute: &ExprValue,
    second: &ExprValue,
) -> ExprResult<ExprValue> {
    let (h, m, s) = (
        hour.double_value()?,
        minute.double_value()?,
        second.double_value()?,
    );
    if h < 0.0 || m < 0.0 || s < 0.0 {
        return Ok(ExprValue::null());
    }
    let hour = round_half_away(h);
    let minute = round_half_away(m);
    if hour >= 24 || minute >= 60 || s >= 60.0 {
        return Err(ExprError::semantic_check(format!(
            "time field value out of range in maketime({h}, {m}, {s})"
        )));
    }
    let secs = s.trunc() as u32;
    let micros = micro_fraction(s);
    NaiveTime::from_hms_micro_opt(hour as u32, minute as u32, secs, micros)
        .map(ExprValue::time)
        .ok_or_else(|| {
            ExprError::semantic_check(format!(
                "time field value out of range in maketime({h}, {m}, {s})"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn props() -> FunctionProperties {
        let start = "2020-09-16T17:30:00Z".parse::<DateTime<Utc>>().unwrap();
        FunctionProperties::new(start)
    }

    fn date_of(s: &str) -> ExprValue {
        ExprValue::date(temporal::parse_date(s).unwrap())
    }

    fn datetime_of(s: &str) -> ExprValue {
        ExprValue::datetime(temporal::parse_datetime(s).unwrap())
    }

    #[test]
    fn test_clock_family_pins_to_query_start() {
        assert_eq!(now(&props()).unwrap(), datetime_of("2020-09-16 17:30:00"));
        assert_eq!(curdate(&props()).unwrap(), date_of("2020-09-16"));
        assert_eq!(
            curtime(&props()).unwrap(),
            ExprValue::time(temporal::parse_time("17:30:00").unwrap())
        );
    }

    #[test]
    fn test_casts_accept_string_literals() {
        assert_eq!(
            cast_date(&props(), &ExprValue::string("2020-09-16 10:11:12")).unwrap(),
            date_of("2020-09-16")
        );
        assert_eq!(
            cast_datetime(&props(), &ExprValue::string("2020-09-16")).unwrap(),
            datetime_of("2020-09-16 00:00:00")
        );
        assert_eq!(
            cast_time(&props(), &ExprValue::string("10:11:12")).unwrap(),
            ExprValue::time(temporal::parse_time("10:11:12").unwrap())
        );
    }

    #[test]
    fn test_date_add_keeps_date_for_day_granularity() {
        let interval = ExprValue::interval(
            IntervalValue::from_unit(IntervalUnit::Day, 5).unwrap(),
        );
        assert_eq!(
            date_add(&props(), &date_of("2020-02-25"), &interval).unwrap(),
            date_of("2020-03-01")
        );
    }

    #[test]
    fn test_date_add_promotes_on_clock_granularity() {
        let interval = ExprValue::interval(
            IntervalValue::from_unit(IntervalUnit::Hour, 2).unwrap(),
        );
        assert_eq!(
            date_add(&props(), &date_of("2020-02-25"), &interval).unwrap(),
            datetime_of("2020-02-25 02:00:00")
        );
    }

    #[test]
    fn test_date_add_month_clamps_to_end_of_month() {
        let interval = ExprValue::interval(
            IntervalValue::from_unit(IntervalUnit::Month, 1).unwrap(),
        );
        assert_eq!(
            date_add(&props(), &date_of("2020-01-31"), &interval).unwrap(),
            date_of("2020-02-29")
        );
    }

    #[test]
    fn test_date_add_preserves_timestamp_kind() {
        let ts = ExprValue::timestamp(temporal::parse_timestamp("2020-09-16 10:00:00").unwrap());
        let interval = ExprValue::interval(
            IntervalValue::from_unit(IntervalUnit::Hour, 3).unwrap(),
        );
        assert_eq!(
            date_add(&props(), &ts, &interval).unwrap(),
            ExprValue::timestamp(temporal::parse_timestamp("2020-09-16 13:00:00").unwrap())
        );
        assert_eq!(
            adddate_days(&props(), &ts, &ExprValue::long(1)).unwrap(),
            ExprValue::timestamp(temporal::parse_timestamp("2020-09-17 10:00:00").unwrap())
        );
    }

    #[test]
    fn test_date_add_declared_type_covers_every_result_kind() {
        let registry = FunctionRegistry::with_standard_functions();
        let resolved = registry
            .resolve("date_add", &[ExprCoreType::Date, ExprCoreType::Interval])
            .unwrap();
        assert_eq!(resolved.return_type(), ExprCoreType::Undefined);
        let interval = ExprValue::interval(
            IntervalValue::from_unit(IntervalUnit::Month, 1).unwrap(),
        );
        let out = resolved
            .apply(&props(), &[date_of("2020-01-31"), interval])
            .unwrap();
        assert_eq!(out.core_type(), ExprCoreType::Date);
    }

    #[test]
    fn test_date_sub_negates() {
        let interval = ExprValue::interval(
            IntervalValue::from_unit(IntervalUnit::Week, 1).unwrap(),
        );
        assert_eq!(
            date_sub(&props(), &date_of("2020-01-08"), &interval).unwrap(),
            date_of("2020-01-01")
        );
    }

    #[test]
    fn test_adddate_day_count_form() {
        assert_eq!(
            adddate_days(&props(), &date_of("2020-09-16"), &ExprValue::long(20)).unwrap(),
            date_of("2020-10-06")
        );
        assert_eq!(
            subdate_days(&props(), &datetime_of("2020-09-16 10:00:00"), &ExprValue::long(1))
                .unwrap(),
            datetime_of("2020-09-15 10:00:00")
        );
    }

    #[test]
    fn test_datediff_is_signed() {
        let out = datediff(&props(), &date_of("2020-09-21"), &date_of("2020-09-16")).unwrap();
        assert_eq!(out, ExprValue::long(5));
        let out = datediff(&props(), &date_of("2020-09-16"), &date_of("2020-09-21")).unwrap();
        assert_eq!(out, ExprValue::long(-5));
    }

    #[test]
    fn test_datediff_ignores_clock_parts() {
        let out = datediff(
            &props(),
            &datetime_of("2020-09-17 23:59:59"),
            &datetime_of("2020-09-16 00:00:00"),
        )
        .unwrap();
        assert_eq!(out, ExprValue::long(1));
    }

    #[rstest]
    #[case("YEAR", "2019-01-01 00:00:00", "2020-09-16 00:00:00", 1)]
    #[case("MONTH", "2020-01-31 00:00:00", "2020-02-28 00:00:00", 0)]
    #[case("DAY", "2020-09-16 00:00:00", "2020-09-17 23:59:59", 1)]
    #[case("HOUR", "2020-09-16 10:00:00", "2020-09-16 09:00:00", -1)]
    #[case("SECOND", "2020-09-16 10:00:00", "2020-09-16 10:00:30", 30)]
    fn test_timestampdiff_truncates_toward_zero(
        #[case] unit: &str,
        #[case] from: &str,
        #[case] to: &str,
        #[case] expected: i64,
    ) {
        let out = timestampdiff(
            &props(),
            &ExprValue::string(unit),
            &datetime_of(from),
            &datetime_of(to),
        )
        .unwrap();
        assert_eq!(out, ExprValue::long(expected));
    }

    #[rstest]
    #[case("YEAR", 2020)]
    #[case("MONTH", 9)]
    #[case("DAY", 16)]
    #[case("HOUR", 10)]
    #[case("YEAR_MONTH", 202_009)]
    #[case("DAY_HOUR", 1610)]
    #[case("HOUR_SECOND", 102_030)]
    #[case("SECOND_MICROSECOND", 30_000_000)]
    fn test_extract_units(#[case] unit: &str, #[case] expected: i64) {
        let out = extract(
            &props(),
            &ExprValue::string(unit),
            &datetime_of("2020-09-16 10:20:30"),
        )
        .unwrap();
        assert_eq!(out, ExprValue::long(expected));
    }

    #[test]
    fn test_simple_extractors() {
        let dt = datetime_of("2020-09-16 10:20:30.123456");
        assert_eq!(year(&props(), &dt).unwrap(), ExprValue::integer(2020));
        assert_eq!(quarter(&props(), &dt).unwrap(), ExprValue::integer(3));
        assert_eq!(month(&props(), &dt).unwrap(), ExprValue::integer(9));
        assert_eq!(dayofmonth(&props(), &dt).unwrap(), ExprValue::integer(16));
        // 2020-09-16 is a Wednesday: 1=Sunday makes it 4
        assert_eq!(dayofweek(&props(), &dt).unwrap(), ExprValue::integer(4));
        assert_eq!(dayofyear(&props(), &dt).unwrap(), ExprValue::integer(260));
        assert_eq!(hour(&props(), &dt).unwrap(), ExprValue::integer(10));
        assert_eq!(minute(&props(), &dt).unwrap(), ExprValue::integer(20));
        assert_eq!(second(&props(), &dt).unwrap(), ExprValue::integer(30));
        assert_eq!(
            microsecond(&props(), &dt).unwrap(),
            ExprValue::integer(123_456)
        );
        assert_eq!(
            dayname(&props(), &dt).unwrap(),
            ExprValue::string("Wednesday")
        );
        assert_eq!(
            monthname(&props(), &dt).unwrap(),
            ExprValue::string("September")
        );
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 52)]
    #[case(5, 0)]
    #[case(7, 53)]
    fn test_week_modes(#[case] mode: i32, #[case] expected: i32) {
        let out = week_with_mode(
            &props(),
            &date_of("2019-01-05"),
            &ExprValue::integer(mode),
        )
        .unwrap();
        assert_eq!(out, ExprValue::integer(expected));
    }

    #[test]
    fn test_week_rejects_invalid_mode() {
        let err =
            week_with_mode(&props(), &date_of("2019-01-05"), &ExprValue::integer(8)).unwrap_err();
        assert!(err.to_string().contains("mode:8"));
    }

    #[test]
    fn test_yearweek_forces_year_attribution() {
        // Mode 0 week is 0, but yearweek reports the adjacent year's week
        assert_eq!(
            yearweek_default(&props(), &date_of("2019-01-05")).unwrap(),
            ExprValue::integer(201_852)
        );
        assert_eq!(
            yearweek_with_mode(&props(), &date_of("2019-01-05"), &ExprValue::integer(1)).unwrap(),
            ExprValue::integer(201_901)
        );
    }

    #[test]
    fn test_to_days_from_days_round_trip() {
        let out = to_days(&props(), &date_of("2008-10-07")).unwrap();
        assert_eq!(out, ExprValue::long(733_687));
        assert_eq!(
            from_days(&props(), &ExprValue::long(733_687)).unwrap(),
            date_of("2008-10-07")
        );
    }

    #[test]
    fn test_to_seconds() {
        let out = to_seconds(&props(), &date_of("1970-01-01")).unwrap();
        assert_eq!(out, ExprValue::long(62_167_219_200));
        let out = to_seconds(&props(), &datetime_of("1970-01-01 00:00:30")).unwrap();
        assert_eq!(out, ExprValue::long(62_167_219_230));
    }

    #[test]
    fn test_to_seconds_packed_forms() {
        let out = to_seconds_packed(&props(), &ExprValue::long(19_700_101)).unwrap();
        assert_eq!(out, ExprValue::long(62_167_219_200));
        assert!(to_seconds_packed(&props(), &ExprValue::long(12_345)).unwrap().is_null());
        let err = to_seconds_packed(&props(), &ExprValue::long(-1)).unwrap_err();
        assert!(matches!(err, ExprError::SemanticCheck { .. }));
    }

    #[test]
    fn test_unix_timestamp_forms() {
        assert_eq!(
            unix_timestamp_now(&props()).unwrap(),
            ExprValue::long(1_600_277_400)
        );
        let out =
            unix_timestamp_temporal(&props(), &datetime_of("2020-09-16 17:30:00")).unwrap();
        assert_eq!(out, ExprValue::double(1_600_277_400.0));
        // Packed numeric shape
        let out =
            unix_timestamp_packed(&props(), &ExprValue::double(20200916.0)).unwrap();
        assert_eq!(out, ExprValue::double(1_600_214_400.0));
        // Feb 31 does not exist
        assert!(
            unix_timestamp_packed(&props(), &ExprValue::double(19990231.0))
                .unwrap()
                .is_null()
        );
        // Before the epoch: clamps to 0
        let out = unix_timestamp_temporal(&props(), &datetime_of("1960-01-01 00:00:00")).unwrap();
        assert_eq!(out, ExprValue::double(0.0));
        // Past the representable range: also 0
        let out = unix_timestamp_temporal(&props(), &datetime_of("3001-01-20 00:00:00")).unwrap();
        assert_eq!(out, ExprValue::double(0.0));
    }

    #[test]
    fn test_unix_timestamp_accepts_packed_strings() {
        let out =
            unix_timestamp_temporal(&props(), &ExprValue::string("20200916")).unwrap();
        assert_eq!(out, ExprValue::double(1_600_214_400.0));
        assert!(
            unix_timestamp_temporal(&props(), &ExprValue::string("19990231"))
                .unwrap()
                .is_null()
        );
    }

    #[test]
    fn test_from_unixtime_round_trip() {
        let out = from_unixtime(&props(), &ExprValue::double(1_600_277_400.0)).unwrap();
        assert_eq!(out, datetime_of("2020-09-16 17:30:00"));
        assert!(from_unixtime(&props(), &ExprValue::double(-1.0)).unwrap().is_null());
        assert!(
            from_unixtime(&props(), &ExprValue::double(MAX_EPOCH_SECONDS + 1.0))
                .unwrap()
                .is_null()
        );
    }

    #[test]
    fn test_from_unixtime_carries_near_whole_fraction_into_seconds() {
        let out = from_unixtime(&props(), &ExprValue::double(59.999_999_9)).unwrap();
        assert_eq!(out, datetime_of("1970-01-01 00:01:00"));
    }

    #[test]
    fn test_makedate_rolls_past_year_end() {
        assert_eq!(
            makedate(&props(), &ExprValue::double(2001.0), &ExprValue::double(366.0)).unwrap(),
            date_of("2002-01-01")
        );
        assert_eq!(
            makedate(&props(), &ExprValue::double(2020.0), &ExprValue::double(1.0)).unwrap(),
            date_of("2020-01-01")
        );
    }

    #[test]
    fn test_makedate_year_zero_reads_as_2000() {
        assert_eq!(
            makedate(&props(), &ExprValue::double(0.0), &ExprValue::double(42.0)).unwrap(),
            date_of("2000-02-11")
        );
    }

    #[test]
    fn test_makedate_rounds_half_away() {
        assert_eq!(
            makedate(&props(), &ExprValue::double(2019.5), &ExprValue::double(1.5)).unwrap(),
            date_of("2020-01-02")
        );
    }

    #[test]
    fn test_makedate_no_such_value_is_null() {
        assert!(
            makedate(&props(), &ExprValue::double(-1.0), &ExprValue::double(42.0))
                .unwrap()
                .is_null()
        );
        assert!(
            makedate(&props(), &ExprValue::double(2020.0), &ExprValue::double(0.0))
                .unwrap()
                .is_null()
        );
    }

    #[test]
    fn test_maketime_builds_time_with_fraction() {
        let out = maketime(
            &props(),
            &ExprValue::double(23.0),
            &ExprValue::double(59.0),
            &ExprValue::double(59.5),
        )
        .unwrap();
        assert_eq!(
            out,
            ExprValue::time(temporal::parse_time("23:59:59.500000").unwrap())
        );
    }

    #[test]
    fn test_maketime_fraction_saturates_below_one_second() {
        let out = maketime(
            &props(),
            &ExprValue::double(12.0),
            &ExprValue::double(15.0),
            &ExprValue::double(59.999_999_9),
        )
        .unwrap();
        assert_eq!(
            out,
            ExprValue::time(NaiveTime::from_hms_micro_opt(12, 15, 59, 999_999).unwrap())
        );
    }

    #[test]
    fn test_maketime_negative_is_null_but_overrange_fails() {
        let out = maketime(
            &props(),
            &ExprValue::double(-1.0),
            &ExprValue::double(0.0),
            &ExprValue::double(0.0),
        )
        .unwrap();
        assert!(out.is_null());

        let err = maketime(
            &props(),
            &ExprValue::double(24.0),
            &ExprValue::double(0.0),
            &ExprValue::double(0.0),
        )
        .unwrap_err();
        assert!(matches!(err, ExprError::SemanticCheck { .. }));
    }

    #[test]
    fn test_registry_resolves_week_overloads() {
        let registry = FunctionRegistry::with_standard_functions();
        let one = registry.resolve("week", &[ExprCoreType::Date]).unwrap();
        assert_eq!(one.return_type(), ExprCoreType::Integer);
        let two = registry
            .resolve("week", &[ExprCoreType::String, ExprCoreType::Integer])
            .unwrap();
        let out = two
            .apply(
                &props(),
                &[ExprValue::string("2019-01-05"), ExprValue::integer(1)],
            )
            .unwrap();
        assert_eq!(out, ExprValue::integer(1));
    }
}
