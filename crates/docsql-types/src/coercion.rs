//! Cross-type comparison and numeric coercion
//!
//! Comparison is total within a compatibility class: numeric values widen
//! through the lattice, temporal kinds map onto a common civil instant, and
//! IPv4 addresses promote to their IPv4-mapped IPv6 form. `Missing` and
//! `Null` are excluded; the evaluation dispatcher gates them before any
//! comparison runs.

use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

use crate::error::{ExprError, ExprResult};
use crate::type_system::ExprCoreType;
use crate::value::ExprValue;

/// Map a temporal value onto a civil datetime for cross-kind comparison.
///
/// A `Date` contributes midnight, a `Timestamp` its UTC wall clock, and a
/// bare `Time` anchors to `anchor` - the current query date, so that all
/// time-dependent comparisons within one query observe the same day.
pub fn temporal_as_civil(value: &ExprValue, anchor: NaiveDate) -> ExprResult<NaiveDateTime> {
    match value {
        ExprValue::Time(t) => Ok(anchor.and_time(*t)),
        other => other.datetime_value(),
    }
}

/// Three-way comparison of two present values.
///
/// Fails with `TypeMismatch` when either side is Missing/Null (a dispatcher
/// contract violation) and with `SemanticCheck` when the operands belong to
/// incompatible classes.
pub fn compare(left: &ExprValue, right: &ExprValue, anchor: NaiveDate) -> ExprResult<Ordering> {
    if !left.is_present() || !right.is_present() {
        return Err(ExprError::type_mismatch(
            "a present value",
            "MISSING/NULL (callers must gate absent values before comparing)",
        ));
    }

    let lt = left.core_type();
    let rt = right.core_type();

    if lt.is_numeric() && rt.is_numeric() {
        let widest = ExprCoreType::widest_numeric(lt, rt)?;
        return Ok(match widest {
            ExprCoreType::Float | ExprCoreType::Double => {
                left.double_value()?.total_cmp(&right.double_value()?)
            }
            _ => left.long_value()?.cmp(&right.long_value()?),
        });
    }

    if lt.is_temporal() && rt.is_temporal() {
        return Ok(temporal_as_civil(left, anchor)?.cmp(&temporal_as_civil(right, anchor)?));
    }

    match (left, right) {
        (ExprValue::Boolean(a), ExprValue::Boolean(b)) => Ok(a.cmp(b)),
        (ExprValue::String(a), ExprValue::String(b)) => Ok(a.cmp(b)),
        (ExprValue::Ip(a), ExprValue::Ip(b)) => Ok(a.cmp(b)),
        (ExprValue::Interval(a), ExprValue::Interval(b)) => Ok((a.months(), a.days(), a.micros())
            .cmp(&(b.months(), b.days(), b.micros()))),
        (ExprValue::Array(a), ExprValue::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match compare(x, y, anchor)? {
                    Ordering::Equal => continue,
                    other => return Ok(other),
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        (ExprValue::Tuple(a), ExprValue::Tuple(b)) => {
            for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                match ka.cmp(kb) {
                    Ordering::Equal => {}
                    other => return Ok(other),
                }
                match compare(va, vb, anchor)? {
                    Ordering::Equal => {}
                    other => return Ok(other),
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => Err(ExprError::semantic_check(format!(
            "compare is undefined between {} and {}",
            lt.name(),
            rt.name()
        ))),
    }
}

/// Equality as `compare == Equal`
pub fn equal(left: &ExprValue, right: &ExprValue, anchor: NaiveDate) -> ExprResult<bool> {
    Ok(compare(left, right, anchor)? == Ordering::Equal)
}
