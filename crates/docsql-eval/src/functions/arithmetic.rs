//! Numeric arithmetic operators
//!
//! Operands widen to their least common ancestor in the numeric lattice and
//! the result carries that type: integral pairs compute in `i64` with
//! overflow checked on both the operation and the narrowing back to the
//! result width, `FLOAT` pairs compute in `f32`, anything touching `DOUBLE`
//! computes in `f64`. Division and modulus by zero produce `NULL` rather
//! than an error.

use docsql_types::{ExprCoreType, ExprError, ExprResult, ExprValue};

use crate::context::FunctionProperties;
use crate::registry::{FunctionRegistry, ReturnType};

use super::binary;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    let numeric_pair = || vec![ExprCoreType::Double, ExprCoreType::Double];
    for name in ["add", "+"] {
        registry.register(name, numeric_pair(), ReturnType::WidestNumeric, binary(add));
    }
    for name in ["subtract", "-"] {
        registry.register(
            name,
            numeric_pair(),
            ReturnType::WidestNumeric,
            binary(subtract),
        );
    }
    for name in ["multiply", "*"] {
        registry.register(
            name,
            numeric_pair(),
            ReturnType::WidestNumeric,
            binary(multiply),
        );
    }
    for name in ["divide", "/"] {
        registry.register(
            name,
            numeric_pair(),
            ReturnType::WidestNumeric,
            binary(divide),
        );
    }
    for name in ["modulus", "mod", "%"] {
        registry.register(
            name,
            numeric_pair(),
            ReturnType::WidestNumeric,
            binary(modulus),
        );
    }
}

/// Narrow an `i64` result back to the width of the result type
fn narrow(widest: ExprCoreType, value: i64, operation: &str) -> ExprResult<ExprValue> {
    let overflow = || ExprError::overflow(operation);
    match widest {
        ExprCoreType::Byte => i8::try_from(value)
            .map(ExprValue::byte)
            .map_err(|_| overflow()),
        ExprCoreType::Short => i16::try_from(value)
            .map(ExprValue::short)
            .map_err(|_| overflow()),
        ExprCoreType::Integer => i32::try_from(value)
            .map(ExprValue::integer)
            .map_err(|_| overflow()),
        _ => Ok(ExprValue::long(value)),
    }
}

fn dispatch(
    left: &ExprValue,
    right: &ExprValue,
    operation: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    f32_op: fn(f32, f32) -> f32,
    f64_op: fn(f64, f64) -> f64,
) -> ExprResult<ExprValue> {
    let widest = ExprCoreType::widest_numeric(left.core_type(), right.core_type())?;
    match widest {
        ExprCoreType::Double => Ok(ExprValue::double(f64_op(
            left.double_value()?,
            right.double_value()?,
        ))),
        ExprCoreType::Float => Ok(ExprValue::float(f32_op(
            left.float_value()?,
            right.float_value()?,
        ))),
        _ => {
            let result = int_op(left.long_value()?, right.long_value()?)
                .ok_or_else(|| ExprError::overflow(operation))?;
            narrow(widest, result, operation)
        }
    }
}

fn add(_props: &FunctionProperties, left: &ExprValue, right: &ExprValue) -> ExprResult<ExprValue> {
    dispatch(
        left,
        right,
        "addition",
        i64::checked_add,
        |a, b| a + b,
        |a, b| a + b,
    )
}

fn subtract(
    _props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    dispatch(
        left,
        right,
        "subtraction",
        i64::checked_sub,
        |a, b| a - b,
        |a, b| a - b,
    )
}

fn multiply(
    _props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    dispatch(
        left,
        right,
        "multiplication",
        i64::checked_mul,
        |a, b| a * b,
        |a, b| a * b,
    )
}

fn divisor_is_zero(right: &ExprValue) -> ExprResult<bool> {
    if right.core_type().is_integral() {
        Ok(right.long_value()? == 0)
    } else {
        Ok(right.double_value()? == 0.0)
    }
}

fn divide(
    _props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    if divisor_is_zero(right)? {
        return Ok(ExprValue::null());
    }
    dispatch(
        left,
        right,
        "division",
        i64::checked_div,
        |a, b| a / b,
        |a, b| a / b,
    )
}

fn modulus(
    _props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    if divisor_is_zero(right)? {
        return Ok(ExprValue::null());
    }
    dispatch(
        left,
        right,
        "modulus",
        i64::checked_rem,
        |a, b| a % b,
        |a, b| a % b,
    )
}
