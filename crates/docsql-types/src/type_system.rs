//! Core type tags for expression values
//!
//! `ExprCoreType` is the schema-level tag the planner works with: it drives
//! literal construction from raw document fields, function signature
//! matching, and the numeric widening lattice.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ExprError, ExprResult};

/// Core type tag for an expression value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExprCoreType {
    /// No statically known type (e.g. the result of `str_to_date`)
    Undefined,
    /// Null or Missing
    Unknown,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Date,
    Time,
    DateTime,
    Timestamp,
    Interval,
    Ip,
    Struct,
    Array,
}

impl ExprCoreType {
    /// Human-readable type name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Undefined => "UNDEFINED",
            Self::Unknown => "UNKNOWN",
            Self::Boolean => "BOOLEAN",
            Self::Byte => "BYTE",
            Self::Short => "SHORT",
            Self::Integer => "INTEGER",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::String => "STRING",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Interval => "INTERVAL",
            Self::Ip => "IP",
            Self::Struct => "STRUCT",
            Self::Array => "ARRAY",
        }
    }

    /// Position in the numeric widening lattice, None for non-numeric types
    fn numeric_rank(&self) -> Option<u8> {
        match self {
            Self::Byte => Some(0),
            Self::Short => Some(1),
            Self::Integer => Some(2),
            Self::Long => Some(3),
            Self::Float => Some(4),
            Self::Double => Some(5),
            _ => None,
        }
    }

    /// Check if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Check if this is an integral numeric type
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Integer | Self::Long)
    }

    /// Check if this is a temporal type
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::DateTime | Self::Timestamp)
    }

    /// Least common ancestor of two types in the numeric widening lattice
    /// `BYTE < SHORT < INTEGER < LONG < FLOAT < DOUBLE`
    pub fn widest_numeric(a: ExprCoreType, b: ExprCoreType) -> ExprResult<ExprCoreType> {
        match (a.numeric_rank(), b.numeric_rank()) {
            (Some(ra), Some(rb)) => Ok(if ra >= rb { a } else { b }),
            _ => Err(ExprError::semantic_check(format!(
                "numeric widening is undefined for [{}, {}]",
                a.name(),
                b.name()
            ))),
        }
    }

    /// Check whether an argument of type `actual` is acceptable where this
    /// type is declared in a function signature.
    ///
    /// Numeric parameters accept any narrower numeric argument; temporal
    /// parameters accept every temporal kind plus `STRING` (the function
    /// body parses literal strings); `UNDEFINED` declared means any;
    /// `UNKNOWN` actual (a null/missing literal) matches everything since
    /// propagation short-circuits before the body runs.
    pub fn accepts(&self, actual: ExprCoreType) -> bool {
        if *self == actual || matches!(actual, ExprCoreType::Unknown) {
            return true;
        }
        match self {
            Self::Undefined => true,
            _ if self.is_numeric() => match (self.numeric_rank(), actual.numeric_rank()) {
                (Some(declared), Some(given)) => given <= declared,
                _ => false,
            },
            _ if self.is_temporal() => actual.is_temporal() || actual == ExprCoreType::String,
            _ => false,
        }
    }
}

impl fmt::Display for ExprCoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
