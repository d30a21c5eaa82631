//! Expression values - runtime representation of all DocSQL values
//!
//! `ExprValue` is the tagged, immutable union flowing through every
//! expression. `Missing` models a field absent from the source document,
//! `Null` a field that is present but empty; both are excluded from
//! comparison and must be gated by the evaluation dispatcher.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ExprError, ExprResult};
use crate::interval::IntervalValue;
use crate::ip::IpValue;
use crate::temporal;
use crate::type_system::ExprCoreType;

/// The primary runtime value of the expression engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ExprValue {
    /// Field absent in the source document
    Missing,
    /// Field present but empty/unknown
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Civil calendar date
    Date(NaiveDate),
    /// Civil time of day, microsecond precision
    Time(NaiveTime),
    /// Civil date and time
    DateTime(NaiveDateTime),
    /// Instant on the UTC timeline
    Timestamp(DateTime<Utc>),
    Interval(IntervalValue),
    Ip(IpValue),
    /// Ordered mapping of field name to value
    Tuple(IndexMap<String, ExprValue>),
    /// Ordered sequence of values
    Array(Vec<ExprValue>),
}

impl ExprValue {
    /// Check if this value is the Missing marker
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Check if this value is the Null marker
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value carries a payload (neither Missing nor Null)
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing | Self::Null)
    }

    /// Get the core type tag of this value
    pub fn core_type(&self) -> ExprCoreType {
        match self {
            Self::Missing | Self::Null => ExprCoreType::Unknown,
            Self::Boolean(_) => ExprCoreType::Boolean,
            Self::Byte(_) => ExprCoreType::Byte,
            Self::Short(_) => ExprCoreType::Short,
            Self::Integer(_) => ExprCoreType::Integer,
            Self::Long(_) => ExprCoreType::Long,
            Self::Float(_) => ExprCoreType::Float,
            Self::Double(_) => ExprCoreType::Double,
            Self::String(_) => ExprCoreType::String,
            Self::Date(_) => ExprCoreType::Date,
            Self::Time(_) => ExprCoreType::Time,
            Self::DateTime(_) => ExprCoreType::DateTime,
            Self::Timestamp(_) => ExprCoreType::Timestamp,
            Self::Interval(_) => ExprCoreType::Interval,
            Self::Ip(_) => ExprCoreType::Ip,
            Self::Tuple(_) => ExprCoreType::Struct,
            Self::Array(_) => ExprCoreType::Array,
        }
    }

    fn mismatch(&self, expected: &str) -> ExprError {
        ExprError::type_mismatch(expected, self.core_type().name())
    }

    /// Get as Boolean
    pub fn boolean_value(&self) -> ExprResult<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            _ => Err(self.mismatch("BOOLEAN")),
        }
    }

    /// Get as Byte
    pub fn byte_value(&self) -> ExprResult<i8> {
        match self {
            Self::Byte(v) => Ok(*v),
            _ => Err(self.mismatch("BYTE")),
        }
    }

    /// Get as Short, widening from narrower integral types
    pub fn short_value(&self) -> ExprResult<i16> {
        match self {
            Self::Byte(v) => Ok(i16::from(*v)),
            Self::Short(v) => Ok(*v),
            _ => Err(self.mismatch("SHORT")),
        }
    }

    /// Get as Integer, widening from narrower integral types
    pub fn integer_value(&self) -> ExprResult<i32> {
        match self {
            Self::Byte(v) => Ok(i32::from(*v)),
            Self::Short(v) => Ok(i32::from(*v)),
            Self::Integer(v) => Ok(*v),
            _ => Err(self.mismatch("INTEGER")),
        }
    }

    /// Get as Long, widening from narrower integral types
    pub fn long_value(&self) -> ExprResult<i64> {
        match self {
            Self::Byte(v) => Ok(i64::from(*v)),
            Self::Short(v) => Ok(i64::from(*v)),
            Self::Integer(v) => Ok(i64::from(*v)),
            Self::Long(v) => Ok(*v),
            _ => Err(self.mismatch("LONG")),
        }
    }

    /// Get as Float, widening from narrower numeric types
    pub fn float_value(&self) -> ExprResult<f32> {
        match self {
            Self::Byte(v) => Ok(f32::from(*v)),
            Self::Short(v) => Ok(f32::from(*v)),
            Self::Integer(v) => Ok(*v as f32),
            Self::Long(v) => Ok(*v as f32),
            Self::Float(v) => Ok(*v),
            _ => Err(self.mismatch("FLOAT")),
        }
    }

    /// Get as Double, widening from any numeric type
    pub fn double_value(&self) -> ExprResult<f64> {
        match self {
            Self::Byte(v) => Ok(f64::from(*v)),
            Self::Short(v) => Ok(f64::from(*v)),
            Self::Integer(v) => Ok(f64::from(*v)),
            Self::Long(v) => Ok(*v as f64),
            Self::Float(v) => Ok(f64::from(*v)),
            Self::Double(v) => Ok(*v),
            _ => Err(self.mismatch("DOUBLE")),
        }
    }

    /// Get as String
    pub fn string_value(&self) -> ExprResult<&str> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(self.mismatch("STRING")),
        }
    }

    /// Get the date component of a Date, DateTime or Timestamp
    pub fn date_value(&self) -> ExprResult<NaiveDate> {
        match self {
            Self::Date(d) => Ok(*d),
            Self::DateTime(dt) => Ok(dt.date()),
            Self::Timestamp(ts) => Ok(ts.naive_utc().date()),
            _ => Err(self.mismatch("DATE")),
        }
    }

    /// Get the time component of a Time, DateTime or Timestamp
    pub fn time_value(&self) -> ExprResult<NaiveTime> {
        match self {
            Self::Time(t) => Ok(*t),
            Self::DateTime(dt) => Ok(dt.time()),
            Self::Timestamp(ts) => Ok(ts.naive_utc().time()),
            _ => Err(self.mismatch("TIME")),
        }
    }

    /// Get as a civil datetime; a Timestamp contributes its UTC wall clock
    pub fn datetime_value(&self) -> ExprResult<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Ok(*dt),
            Self::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            Self::Timestamp(ts) => Ok(ts.naive_utc()),
            _ => Err(self.mismatch("DATETIME")),
        }
    }

    /// Get as an instant; civil values are interpreted as UTC wall clock
    pub fn timestamp_value(&self) -> ExprResult<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Ok(*ts),
            Self::DateTime(dt) => Ok(dt.and_utc()),
            Self::Date(d) => Ok(d.and_time(NaiveTime::MIN).and_utc()),
            _ => Err(self.mismatch("TIMESTAMP")),
        }
    }

    /// Get as Interval
    pub fn interval_value(&self) -> ExprResult<&IntervalValue> {
        match self {
            Self::Interval(iv) => Ok(iv),
            _ => Err(self.mismatch("INTERVAL")),
        }
    }

    /// Get as IP address
    pub fn ip_value(&self) -> ExprResult<&IpValue> {
        match self {
            Self::Ip(ip) => Ok(ip),
            _ => Err(self.mismatch("IP")),
        }
    }

    /// Get as Tuple
    pub fn tuple_value(&self) -> ExprResult<&IndexMap<String, ExprValue>> {
        match self {
            Self::Tuple(t) => Ok(t),
            _ => Err(self.mismatch("STRUCT")),
        }
    }

    /// Get as Array
    pub fn array_value(&self) -> ExprResult<&[ExprValue]> {
        match self {
            Self::Array(a) => Ok(a),
            _ => Err(self.mismatch("ARRAY")),
        }
    }

    // === Literal constructors, one per core type tag ===

    /// The Missing singleton
    pub fn missing() -> Self {
        Self::Missing
    }

    /// The Null singleton
    pub fn null() -> Self {
        Self::Null
    }

    pub fn boolean(v: bool) -> Self {
        Self::Boolean(v)
    }

    pub fn byte(v: i8) -> Self {
        Self::Byte(v)
    }

    pub fn short(v: i16) -> Self {
        Self::Short(v)
    }

    pub fn integer(v: i32) -> Self {
        Self::Integer(v)
    }

    pub fn long(v: i64) -> Self {
        Self::Long(v)
    }

    pub fn float(v: f32) -> Self {
        Self::Float(v)
    }

    pub fn double(v: f64) -> Self {
        Self::Double(v)
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::String(v.into())
    }

    pub fn date(v: NaiveDate) -> Self {
        Self::Date(v)
    }

    pub fn time(v: NaiveTime) -> Self {
        Self::Time(v)
    }

    pub fn datetime(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }

    pub fn timestamp(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }

    pub fn interval(v: IntervalValue) -> Self {
        Self::Interval(v)
    }

    pub fn ip(v: IpValue) -> Self {
        Self::Ip(v)
    }

    pub fn tuple(fields: impl IntoIterator<Item = (impl Into<String>, ExprValue)>) -> Self {
        Self::Tuple(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array(elements: impl IntoIterator<Item = ExprValue>) -> Self {
        Self::Array(elements.into_iter().collect())
    }

    /// Materialize a raw document field under a schema type tag.
    ///
    /// The schema type disambiguates raw encodings: a JSON string becomes a
    /// `Timestamp` when the schema says so, a plain `String` otherwise.
    /// JSON `null` becomes `Null`; an absent field is the caller's `Missing`.
    pub fn from_json(raw: &serde_json::Value, schema_type: ExprCoreType) -> ExprResult<Self> {
        use serde_json::Value as Json;

        if raw.is_null() {
            return Ok(Self::Null);
        }

        let mismatch = || {
            ExprError::semantic_check(format!(
                "raw value {raw} cannot be materialized as {}",
                schema_type.name()
            ))
        };

        match schema_type {
            ExprCoreType::Boolean => raw.as_bool().map(Self::Boolean).ok_or_else(mismatch),
            ExprCoreType::Byte => raw
                .as_i64()
                .and_then(|v| i8::try_from(v).ok())
                .map(Self::Byte)
                .ok_or_else(mismatch),
            ExprCoreType::Short => raw
                .as_i64()
                .and_then(|v| i16::try_from(v).ok())
                .map(Self::Short)
                .ok_or_else(mismatch),
            ExprCoreType::Integer => raw
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Integer)
                .ok_or_else(mismatch),
            ExprCoreType::Long => raw.as_i64().map(Self::Long).ok_or_else(mismatch),
            ExprCoreType::Float => raw
                .as_f64()
                .map(|v| Self::Float(v as f32))
                .ok_or_else(mismatch),
            ExprCoreType::Double => raw.as_f64().map(Self::Double).ok_or_else(mismatch),
            ExprCoreType::String => raw
                .as_str()
                .map(Self::string)
                .ok_or_else(mismatch),
            ExprCoreType::Date => {
                temporal::parse_date(raw.as_str().ok_or_else(mismatch)?).map(Self::Date)
            }
            ExprCoreType::Time => {
                temporal::parse_time(raw.as_str().ok_or_else(mismatch)?).map(Self::Time)
            }
            ExprCoreType::DateTime => {
                temporal::parse_datetime(raw.as_str().ok_or_else(mismatch)?).map(Self::DateTime)
            }
            ExprCoreType::Timestamp => {
                temporal::parse_timestamp(raw.as_str().ok_or_else(mismatch)?).map(Self::Timestamp)
            }
            ExprCoreType::Ip => IpValue::parse(raw.as_str().ok_or_else(mismatch)?).map(Self::Ip),
            ExprCoreType::Struct => match raw {
                Json::Object(fields) => Ok(Self::Tuple(
                    fields
                        .iter()
                        .map(|(k, v)| Ok((k.clone(), Self::from_json_inferred(v)?)))
                        .collect::<ExprResult<_>>()?,
                )),
                _ => Err(mismatch()),
            },
            ExprCoreType::Array => match raw {
                Json::Array(elements) => Ok(Self::Array(
                    elements
                        .iter()
                        .map(Self::from_json_inferred)
                        .collect::<ExprResult<_>>()?,
                )),
                _ => Err(mismatch()),
            },
            ExprCoreType::Undefined | ExprCoreType::Unknown => Self::from_json_inferred(raw),
            ExprCoreType::Interval => Err(mismatch()),
        }
    }

    /// Materialize a raw value with no schema guidance: numbers become
    /// Long/Double, strings stay strings, containers recurse
    pub fn from_json_inferred(raw: &serde_json::Value) -> ExprResult<Self> {
        use serde_json::Value as Json;
        match raw {
            Json::Null => Ok(Self::Null),
            Json::Bool(b) => Ok(Self::Boolean(*b)),
            Json::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(Self::Long(v))
                } else {
                    n.as_f64().map(Self::Double).ok_or_else(|| {
                        ExprError::semantic_check(format!("numeric value {n} is out of range"))
                    })
                }
            }
            Json::String(s) => Ok(Self::string(s)),
            Json::Array(elements) => Ok(Self::Array(
                elements
                    .iter()
                    .map(Self::from_json_inferred)
                    .collect::<ExprResult<_>>()?,
            )),
            Json::Object(fields) => Ok(Self::Tuple(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), Self::from_json_inferred(v)?)))
                    .collect::<ExprResult<_>>()?,
            )),
        }
    }
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "MISSING"),
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{}", temporal::format_time(*t)),
            Self::DateTime(dt) => write!(f, "{}", temporal::format_datetime(*dt)),
            Self::Timestamp(ts) => write!(f, "{}", temporal::format_datetime(ts.naive_utc())),
            Self::Interval(iv) => write!(f, "{iv}"),
            Self::Ip(ip) => write!(f, "{ip}"),
            Self::Tuple(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Array(elements) => {
                write!(f, "[")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, "]")
            }
        }
    }
}
