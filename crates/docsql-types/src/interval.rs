//! Interval values
//!
//! An interval pairs a declaring unit with a signed magnitude. Internally the
//! magnitude is normalized to a `(months, days, microseconds)` triple so that
//! calendar arithmetic can apply month-granularity and clock-granularity
//! parts separately, with calendar rollover handled by chrono.

use chrono::{Days, Months, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ExprError, ExprResult};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

/// Interval unit, covering simple units and the MySQL-style compound units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalUnit {
    Microsecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    SecondMicrosecond,
    MinuteMicrosecond,
    MinuteSecond,
    HourMicrosecond,
    HourSecond,
    HourMinute,
    DayMicrosecond,
    DaySecond,
    DayMinute,
    DayHour,
    YearMonth,
}

impl IntervalUnit {
    /// Parse a unit keyword, case-insensitively
    pub fn parse(s: &str) -> ExprResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MICROSECOND" => Ok(Self::Microsecond),
            "SECOND" => Ok(Self::Second),
            "MINUTE" => Ok(Self::Minute),
            "HOUR" => Ok(Self::Hour),
            "DAY" => Ok(Self::Day),
            "WEEK" => Ok(Self::Week),
            "MONTH" => Ok(Self::Month),
            "QUARTER" => Ok(Self::Quarter),
            "YEAR" => Ok(Self::Year),
            "SECOND_MICROSECOND" => Ok(Self::SecondMicrosecond),
            "MINUTE_MICROSECOND" => Ok(Self::MinuteMicrosecond),
            "MINUTE_SECOND" => Ok(Self::MinuteSecond),
            "HOUR_MICROSECOND" => Ok(Self::HourMicrosecond),
            "HOUR_SECOND" => Ok(Self::HourSecond),
            "HOUR_MINUTE" => Ok(Self::HourMinute),
            "DAY_MICROSECOND" => Ok(Self::DayMicrosecond),
            "DAY_SECOND" => Ok(Self::DaySecond),
            "DAY_MINUTE" => Ok(Self::DayMinute),
            "DAY_HOUR" => Ok(Self::DayHour),
            "YEAR_MONTH" => Ok(Self::YearMonth),
            _ => Err(ExprError::semantic_check(format!(
                "interval unit `{s}` is not supported"
            ))),
        }
    }

    /// Unit keyword as it appears in query text
    pub fn name(&self) -> &'static str {
        match self {
            Self::Microsecond => "MICROSECOND",
            Self::Second => "SECOND",
            Self::Minute => "MINUTE",
            Self::Hour => "HOUR",
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::Year => "YEAR",
            Self::SecondMicrosecond => "SECOND_MICROSECOND",
            Self::MinuteMicrosecond => "MINUTE_MICROSECOND",
            Self::MinuteSecond => "MINUTE_SECOND",
            Self::HourMicrosecond => "HOUR_MICROSECOND",
            Self::HourSecond => "HOUR_SECOND",
            Self::HourMinute => "HOUR_MINUTE",
            Self::DayMicrosecond => "DAY_MICROSECOND",
            Self::DaySecond => "DAY_SECOND",
            Self::DayMinute => "DAY_MINUTE",
            Self::DayHour => "DAY_HOUR",
            Self::YearMonth => "YEAR_MONTH",
        }
    }

    /// Compound units are constructed from a quoted literal, not a magnitude
    pub fn is_compound(&self) -> bool {
        !matches!(
            self,
            Self::Microsecond
                | Self::Second
                | Self::Minute
                | Self::Hour
                | Self::Day
                | Self::Week
                | Self::Month
                | Self::Quarter
                | Self::Year
        )
    }

    /// Field layout of a compound literal, outermost first.
    /// The bool marks whether the last field is a microsecond fraction.
    fn compound_fields(&self) -> Option<(&'static [IntervalUnit], bool)> {
        use IntervalUnit::{Day, Hour, Minute, Month, Second, Year};
        match self {
            Self::SecondMicrosecond => Some((&[Second], true)),
            Self::MinuteMicrosecond => Some((&[Minute, Second], true)),
            Self::MinuteSecond => Some((&[Minute, Second], false)),
            Self::HourMicrosecond => Some((&[Hour, Minute, Second], true)),
            Self::HourSecond => Some((&[Hour, Minute, Second], false)),
            Self::HourMinute => Some((&[Hour, Minute], false)),
            Self::DayMicrosecond => Some((&[Day, Hour, Minute, Second], true)),
            Self::DaySecond => Some((&[Day, Hour, Minute, Second], false)),
            Self::DayMinute => Some((&[Day, Hour, Minute], false)),
            Self::DayHour => Some((&[Day, Hour], false)),
            Self::YearMonth => Some((&[Year, Month], false)),
            _ => None,
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A typed interval value: declaring unit plus normalized magnitude
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalValue {
    months: i64,
    days: i64,
    micros: i64,
    unit: IntervalUnit,
}

impl IntervalValue {
    /// Construct from a simple unit and a signed magnitude
    pub fn from_unit(unit: IntervalUnit, magnitude: i64) -> ExprResult<Self> {
        let mut value = Self {
            months: 0,
            days: 0,
            micros: 0,
            unit,
        };
        match unit {
            IntervalUnit::Microsecond => value.micros = magnitude,
            IntervalUnit::Second => value.micros = magnitude * MICROS_PER_SECOND,
            IntervalUnit::Minute => value.micros = magnitude * MICROS_PER_MINUTE,
            IntervalUnit::Hour => value.micros = magnitude * MICROS_PER_HOUR,
            IntervalUnit::Day => value.days = magnitude,
            IntervalUnit::Week => value.days = magnitude * 7,
            IntervalUnit::Month => value.months = magnitude,
            IntervalUnit::Quarter => value.months = magnitude * 3,
            IntervalUnit::Year => value.months = magnitude * 12,
            compound => {
                return Err(ExprError::semantic_check(format!(
                    "interval unit {} requires a quoted literal, not a magnitude",
                    compound.name()
                )));
            }
        }
        Ok(value)
    }

    /// Parse a compound interval literal, e.g. `"1 10:20:30"` for DAY_SECOND
    /// or `"2-6"` for YEAR_MONTH. A leading `-` negates the whole interval.
    pub fn parse(unit: IntervalUnit, text: &str) -> ExprResult<Self> {
        let Some((fields, has_fraction)) = unit.compound_fields() else {
            // Simple units also accept a plain numeric literal
            let magnitude: i64 = text.trim().parse().map_err(|_| {
                ExprError::semantic_check(format!(
                    "interval literal `{text}` is not a valid {} magnitude",
                    unit.name()
                ))
            })?;
            return Self::from_unit(unit, magnitude);
        };

        let trimmed = text.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let parts: Vec<&str> = body
            .split(|c: char| c == ' ' || c == ':' || c == '-' || c == '.')
            .filter(|p| !p.is_empty())
            .collect();
        let expected = fields.len() + usize::from(has_fraction);
        if parts.len() != expected {
            return Err(ExprError::semantic_check(format!(
                "interval literal `{text}` does not match the {} shape",
                unit.name()
            )));
        }

        let mut value = Self {
            months: 0,
            days: 0,
            micros: 0,
            unit,
        };
        for (field, part) in fields.iter().zip(&parts) {
            let magnitude: i64 = part.parse().map_err(|_| {
                ExprError::semantic_check(format!(
                    "interval literal `{text}` has a non-numeric {} field",
                    field.name()
                ))
            })?;
            let piece = Self::from_unit(*field, magnitude)?;
            value.months += piece.months;
            value.days += piece.days;
            value.micros += piece.micros;
        }
        if has_fraction {
            let frac = parts[fields.len()];
            if frac.len() > 6 || frac.bytes().any(|b| !b.is_ascii_digit()) {
                return Err(ExprError::semantic_check(format!(
                    "interval literal `{text}` has an invalid microsecond fraction"
                )));
            }
            let mut padded = frac.to_string();
            while padded.len() < 6 {
                padded.push('0');
            }
            value.micros += padded.parse::<i64>().expect("digits only");
        }

        if negative {
            value = value.negated();
        }
        Ok(value)
    }

    /// Month-granularity component
    pub fn months(&self) -> i64 {
        self.months
    }

    /// Day-granularity component
    pub fn days(&self) -> i64 {
        self.days
    }

    /// Sub-day component in microseconds
    pub fn micros(&self) -> i64 {
        self.micros
    }

    /// The unit this interval was declared with
    pub fn unit(&self) -> IntervalUnit {
        self.unit
    }

    /// True when the interval carries no sub-day component; adding such an
    /// interval to a pure date yields a date rather than a datetime
    pub fn is_date_granularity(&self) -> bool {
        self.micros == 0
    }

    /// The same interval with every component negated
    pub fn negated(&self) -> Self {
        Self {
            months: -self.months,
            days: -self.days,
            micros: -self.micros,
            unit: self.unit,
        }
    }

    /// Add this interval to a civil datetime.
    ///
    /// Month arithmetic uses calendar rollover with end-of-month clamping
    /// (Jan 31 + 1 month = Feb 28/29), then days, then the clock part.
    pub fn apply_to(&self, dt: NaiveDateTime) -> ExprResult<NaiveDateTime> {
        let overflow = || ExprError::overflow("interval addition");

        let with_months = if self.months >= 0 {
            dt.checked_add_months(Months::new(u32::try_from(self.months).map_err(|_| overflow())?))
        } else {
            dt.checked_sub_months(Months::new(u32::try_from(-self.months).map_err(|_| overflow())?))
        }
        .ok_or_else(overflow)?;

        let with_days = if self.days >= 0 {
            with_months.checked_add_days(Days::new(u64::try_from(self.days).map_err(|_| overflow())?))
        } else {
            with_months.checked_sub_days(Days::new(u64::try_from(-self.days).map_err(|_| overflow())?))
        }
        .ok_or_else(overflow)?;

        with_days
            .checked_add_signed(TimeDelta::microseconds(self.micros))
            .ok_or_else(overflow)
    }
}

impl PartialEq for IntervalValue {
    fn eq(&self, other: &Self) -> bool {
        self.months == other.months && self.days == other.days && self.micros == other.micros
    }
}

impl Eq for IntervalValue {}

impl fmt::Display for IntervalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            IntervalUnit::Microsecond => write!(f, "INTERVAL {} MICROSECOND", self.micros),
            IntervalUnit::Second => {
                write!(f, "INTERVAL {} SECOND", self.micros / MICROS_PER_SECOND)
            }
            IntervalUnit::Minute => {
                write!(f, "INTERVAL {} MINUTE", self.micros / MICROS_PER_MINUTE)
            }
            IntervalUnit::Hour => write!(f, "INTERVAL {} HOUR", self.micros / MICROS_PER_HOUR),
            IntervalUnit::Day => write!(f, "INTERVAL {} DAY", self.days),
            IntervalUnit::Week => write!(f, "INTERVAL {} WEEK", self.days / 7),
            IntervalUnit::Month => write!(f, "INTERVAL {} MONTH", self.months),
            IntervalUnit::Quarter => write!(f, "INTERVAL {} QUARTER", self.months / 3),
            IntervalUnit::Year => write!(f, "INTERVAL {} YEAR", self.months / 12),
            unit => {
                let sign = if self.months < 0 || self.days < 0 || self.micros < 0 {
                    "-"
                } else {
                    ""
                };
                let months = self.months.abs();
                let days = self.days.abs();
                let micros = self.micros.abs();
                let (hours, rem) = (micros / MICROS_PER_HOUR, micros % MICROS_PER_HOUR);
                let (minutes, rem) = (rem / MICROS_PER_MINUTE, rem % MICROS_PER_MINUTE);
                let (seconds, frac) = (rem / MICROS_PER_SECOND, rem % MICROS_PER_SECOND);
                let body = match unit {
                    IntervalUnit::YearMonth => format!("{}-{}", months / 12, months % 12),
                    IntervalUnit::DayHour => format!("{days} {hours}"),
                    IntervalUnit::DayMinute => format!("{days} {hours}:{minutes}"),
                    IntervalUnit::DaySecond => format!("{days} {hours}:{minutes}:{seconds}"),
                    IntervalUnit::DayMicrosecond => {
                        format!("{days} {hours}:{minutes}:{seconds}.{frac:06}")
                    }
                    IntervalUnit::HourMinute => format!("{hours}:{minutes}"),
                    IntervalUnit::HourSecond => format!("{hours}:{minutes}:{seconds}"),
                    IntervalUnit::HourMicrosecond => {
                        format!("{hours}:{minutes}:{seconds}.{frac:06}")
                    }
                    IntervalUnit::MinuteSecond => format!("{minutes}:{seconds}"),
                    IntervalUnit::MinuteMicrosecond => {
                        format!("{minutes}:{seconds}.{frac:06}")
                    }
                    IntervalUnit::SecondMicrosecond => format!("{seconds}.{frac:06}"),
                    _ => unreachable!("simple units handled above"),
                };
                write!(f, "INTERVAL '{sign}{body}' {}", unit.name())
            }
        }
    }
}
