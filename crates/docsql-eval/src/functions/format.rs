//! Format and parse subsystem
//!
//! `date_format`/`time_format` render a temporal value through the `%`-token
//! format language; `str_to_date` runs the same token set in reverse as a
//! lock-step parser. Rendering is total over the token set; parsing returns
//! NULL on the first mismatch, on trailing input, and on any field
//! combination that does not name a real calendar point.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use docsql_types::{temporal, ExprCoreType, ExprResult, ExprValue};

use crate::context::FunctionProperties;
use crate::registry::{FunctionRegistry, ReturnType};

use super::calendar::calc_week;
use super::datetime::as_civil_datetime;
use super::binary;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    use ExprCoreType::{String, Timestamp};
    registry.register(
        "date_format",
        vec![Timestamp, String],
        ReturnType::Fixed(String),
        binary(date_format),
    );
    registry.register(
        "time_format",
        vec![Timestamp, String],
        ReturnType::Fixed(String),
        binary(time_format),
    );
    // The result kind depends on which fields the pattern extracts
    registry.register(
        "str_to_date",
        vec![String, String],
        ReturnType::Fixed(ExprCoreType::Undefined),
        binary(str_to_date),
    );
}

fn date_format(
    props: &FunctionProperties,
    value: &ExprValue,
    fmt: &ExprValue,
) -> ExprResult<ExprValue> {
    let dt = as_civil_datetime(props, value)?;
    Ok(ExprValue::string(render(dt, fmt.string_value()?, false)))
}

/// Like `date_format` but over the time part only; date tokens render as
/// zero fields
fn time_format(
    _props: &FunctionProperties,
    value: &ExprValue,
    fmt: &ExprValue,
) -> ExprResult<ExprValue> {
    let time = match value {
        ExprValue::String(s) => temporal::parse_time(s)
            .or_else(|e| temporal::parse_datetime(s).map(|dt| dt.time()).map_err(|_| e))?,
        other => other.time_value()?,
    };
    let dt = NaiveDate::default().and_time(time);
    Ok(ExprValue::string(render(dt, fmt.string_value()?, true)))
}

fn str_to_date(
    _props: &FunctionProperties,
    text: &ExprValue,
    fmt: &ExprValue,
) -> ExprResult<ExprValue> {
    Ok(parse(text.string_value()?, fmt.string_value()?).unwrap_or(ExprValue::Null))
}

// === Rendering ===

fn day_suffix(day: u32) -> &'static str {
    match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

fn hour12(hour: u32) -> u32 {
    (hour + 11) % 12 + 1
}

fn meridiem(hour: u32) -> &'static str {
    if hour < 12 { "AM" } else { "PM" }
}

/// Render `dt` through the token language. With `zero_date` the date tokens
/// produce zero fields, which is how `time_format` treats them.
pub(crate) fn render(dt: NaiveDateTime, fmt: &str, zero_date: bool) -> String {
    use std::fmt::Write;

    let date = dt.date();
    let time = dt.time();
    let micros = time.nanosecond() / 1_000;
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(token) = chars.next() else {
            out.push('%');
            break;
        };
        if zero_date {
            let handled = match token {
                'Y' => Some("0000"),
                'y' | 'm' | 'd' | 'U' | 'u' | 'V' | 'v' => Some("00"),
                'c' | 'e' | 'w' | 'a' | 'b' | 'D' | 'M' | 'W' => Some("0"),
                'j' => Some("000"),
                'X' | 'x' => Some("0000"),
                _ => None,
            };
            if let Some(text) = handled {
                out.push_str(text);
                continue;
            }
        }
        // Infallible writes into a String
        let _ = match token {
            'a' => write!(out, "{}", date.format("%a")),
            'b' => write!(out, "{}", date.format("%b")),
            'c' => write!(out, "{}", date.month()),
            'D' => write!(out, "{}{}", date.day(), day_suffix(date.day())),
            'd' => write!(out, "{:02}", date.day()),
            'e' => write!(out, "{}", date.day()),
            'f' => write!(out, "{micros:06}"),
            'H' => write!(out, "{:02}", time.hour()),
            'h' | 'I' => write!(out, "{:02}", hour12(time.hour())),
            'i' => write!(out, "{:02}", time.minute()),
            'j' => write!(out, "{:03}", date.ordinal()),
            'k' => write!(out, "{}", time.hour()),
            'l' => write!(out, "{}", hour12(time.hour())),
            'M' => write!(out, "{}", date.format("%B")),
            'm' => write!(out, "{:02}", date.month()),
            'p' => write!(out, "{}", meridiem(time.hour())),
            'r' => write!(
                out,
                "{:02}:{:02}:{:02} {}",
                hour12(time.hour()),
                time.minute(),
                time.second(),
                meridiem(time.hour())
            ),
            'S' | 's' => write!(out, "{:02}", time.second()),
            'T' => write!(
                out,
                "{:02}:{:02}:{:02}",
                time.hour(),
                time.minute(),
                time.second()
            ),
            'U' => write!(out, "{:02}", calc_week(date, 0).1),
            'u' => write!(out, "{:02}", calc_week(date, 1).1),
            'V' => write!(out, "{:02}", calc_week(date, 2).1),
            'v' => write!(out, "{:02}", calc_week(date, 3).1),
            'W' => write!(out, "{}", date.format("%A")),
            'w' => write!(out, "{}", date.weekday().num_days_from_sunday()),
            'X' => write!(out, "{:04}", calc_week(date, 2).0),
            'x' => write!(out, "{:04}", calc_week(date, 3).0),
            'Y' => write!(out, "{:04}", date.year()),
            'y' => write!(out, "{:02}", date.year().rem_euclid(100)),
            '%' => write!(out, "%"),
            other => write!(out, "%{other}"),
        };
    }
    out
}

/// Canonical full-datetime rendering used by `from_unixtime` with a format
pub(crate) fn render_datetime(dt: NaiveDateTime, fmt: &str) -> String {
    render(dt, fmt, false)
}

// === Parsing ===

#[derive(Default)]
struct ParsedFields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    day_of_year: Option<u32>,
    hour24: Option<u32>,
    hour12: Option<u32>,
    pm: Option<bool>,
    minute: Option<u32>,
    second: Option<u32>,
    micros: Option<u32>,
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    /// Consume up to `max` leading digits, at least one
    fn digits(&mut self, max: usize) -> Option<&'a str> {
        let len = self
            .rest
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if len == 0 {
            return None;
        }
        let (taken, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(taken)
    }

    fn number(&mut self, max: usize) -> Option<u32> {
        self.digits(max)?.parse().ok()
    }

    fn literal(&mut self, c: char) -> Option<()> {
        self.rest = self.rest.strip_prefix(c)?;
        Some(())
    }

    /// Case-insensitive keyword match against a candidate list; returns the
    /// 1-based index of the match
    fn keyword(&mut self, candidates: &[&str]) -> Option<u32> {
        for (i, cand) in candidates.iter().enumerate() {
            // None when the input is short or the boundary splits a
            // multi-byte character
            if let Some(head) = self.rest.get(..cand.len()) {
                if head.eq_ignore_ascii_case(cand) {
                    self.rest = &self.rest[cand.len()..];
                    return Some(i as u32 + 1);
                }
            }
        }
        None
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn two_digit_year(yy: u32) -> i32 {
    if yy < 70 {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

/// Lock-step parse of `text` against `fmt`; None on any mismatch
fn parse(text: &str, fmt: &str) -> Option<ExprValue> {
    let mut cur = Cursor { rest: text };
    let mut fields = ParsedFields::default();
    let mut tokens = fmt.chars();

    while let Some(c) = tokens.next() {
        if c != '%' {
            cur.literal(c)?;
            continue;
        }
        let token = tokens.next()?;
        match token {
            'Y' => fields.year = Some(cur.number(4)? as i32),
            'y' => fields.year = Some(two_digit_year(cur.number(2)?)),
            'm' | 'c' => fields.month = Some(cur.number(2)?),
            'b' => fields.month = Some(cur.keyword(&MONTH_ABBREVS)?),
            'M' => fields.month = Some(cur.keyword(&MONTH_NAMES)?),
            'd' | 'e' => fields.day = Some(cur.number(2)?),
            'j' => fields.day_of_year = Some(cur.number(3)?),
            'H' | 'k' => fields.hour24 = Some(cur.number(2)?),
            'h' | 'I' | 'l' => fields.hour12 = Some(cur.number(2)?),
            'i' => fields.minute = Some(cur.number(2)?),
            'S' | 's' => fields.second = Some(cur.number(2)?),
            'f' => {
                let digits = cur.digits(6)?;
                let mut padded = digits.to_string();
                while padded.len() < 6 {
                    padded.push('0');
                }
                fields.micros = Some(padded.parse().ok()?);
            }
            'p' => fields.pm = Some(cur.keyword(&["AM", "PM"])? == 2),
            'T' => {
                fields.hour24 = Some(cur.number(2)?);
                cur.literal(':')?;
                fields.minute = Some(cur.number(2)?);
                cur.literal(':')?;
                fields.second = Some(cur.number(2)?);
            }
            'r' => {
                fields.hour12 = Some(cur.number(2)?);
                cur.literal(':')?;
                fields.minute = Some(cur.number(2)?);
                cur.literal(':')?;
                fields.second = Some(cur.number(2)?);
                cur.literal(' ')?;
                fields.pm = Some(cur.keyword(&["AM", "PM"])? == 2);
            }
            '%' => cur.literal('%')?,
            other => {
                // Unknown tokens round-trip as two literal characters
                cur.literal('%')?;
                cur.literal(other)?;
            }
        }
    }

    if !cur.rest.is_empty() {
        return None;
    }
    assemble(fields)
}

fn assemble(fields: ParsedFields) -> Option<ExprValue> {
    let hour = match (fields.hour24, fields.hour12, fields.pm) {
        (Some(h), _, _) => Some(h),
        (None, Some(h), Some(pm)) => {
            // A meridiem pins the hour to the 12-hour clock
            if !(1..=12).contains(&h) {
                return None;
            }
            Some(h % 12 + if pm { 12 } else { 0 })
        }
        (None, Some(h), None) => Some(h),
        (None, None, _) => None,
    };
    let has_time = hour.is_some() || fields.minute.is_some() || fields.second.is_some();
    let time = NaiveTime::from_hms_micro_opt(
        hour.unwrap_or(0),
        fields.minute.unwrap_or(0),
        fields.second.unwrap_or(0),
        fields.micros.unwrap_or(0),
    )?;

    let has_date =
        fields.year.is_some() || fields.month.is_some() || fields.day.is_some()
            || fields.day_of_year.is_some();
    if has_date {
        // Month and day default to the first; a pattern without a year
        // names no calendar point
        let year = fields.year?;
        let date = if let Some(ordinal) = fields.day_of_year {
            NaiveDate::from_yo_opt(year, ordinal)?
        } else {
            NaiveDate::from_ymd_opt(
                year,
                fields.month.unwrap_or(1),
                fields.day.unwrap_or(1),
            )?
        };
        Some(ExprValue::datetime(date.and_time(time)))
    } else if has_time {
        Some(ExprValue::time(time))
    } else {
        None
    }
}
