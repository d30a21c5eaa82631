//! Standard function library
//!
//! Each submodule registers one family of functions into the
//! `FunctionRegistry`. Implementations receive present values only; the
//! Missing/Null propagation gate lives in `ResolvedFunction::apply`.

use std::sync::Arc;

use docsql_types::{ExprResult, ExprValue};

use crate::context::FunctionProperties;
use crate::registry::{FunctionImpl, FunctionRegistry};

pub mod arithmetic;
pub(crate) mod calendar;
pub mod comparison;
pub mod datetime;
pub mod format;

/// Register every standard function
pub fn register_all(registry: &mut FunctionRegistry) {
    arithmetic::register(registry);
    comparison::register(registry);
    datetime::register(registry);
    format::register(registry);
}

// Arity adapters. `ResolvedFunction::apply` checks the argument count
// against the matched signature before invoking, so indexing is safe.

pub(crate) fn nullary(
    f: impl Fn(&FunctionProperties) -> ExprResult<ExprValue> + Send + Sync + 'static,
) -> FunctionImpl {
    Arc::new(move |props, _args| f(props))
}

pub(crate) fn unary(
    f: impl Fn(&FunctionProperties, &ExprValue) -> ExprResult<ExprValue> + Send + Sync + 'static,
) -> FunctionImpl {
    Arc::new(move |props, args| f(props, &args[0]))
}

pub(crate) fn binary(
    f: impl Fn(&FunctionProperties, &ExprValue, &ExprValue) -> ExprResult<ExprValue>
        + Send
        + Sync
        + 'static,
) -> FunctionImpl {
    Arc::new(move |props, args| f(props, &args[0], &args[1]))
}

pub(crate) fn ternary(
    f: impl Fn(&FunctionProperties, &ExprValue, &ExprValue, &ExprValue) -> ExprResult<ExprValue>
        + Send
        + Sync
        + 'static,
) -> FunctionImpl {
    Arc::new(move |props, args| f(props, &args[0], &args[1], &args[2]))
}
