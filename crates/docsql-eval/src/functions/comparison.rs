//! Comparison operators
//!
//! All six operators delegate to the cross-type comparison in the types
//! crate, passing the query date so that bare `Time` operands anchor
//! consistently within one query execution.

use std::cmp::Ordering;

use docsql_types::{coercion, ExprCoreType, ExprResult, ExprValue};

use crate::context::FunctionProperties;
use crate::registry::{FunctionRegistry, ReturnType};

use super::binary;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    let any_pair = || vec![ExprCoreType::Undefined, ExprCoreType::Undefined];
    let boolean = ReturnType::Fixed(ExprCoreType::Boolean);

    for name in ["equal", "="] {
        registry.register(name, any_pair(), boolean, binary(equal));
    }
    for name in ["notequal", "!="] {
        registry.register(name, any_pair(), boolean, binary(not_equal));
    }
    for name in ["less", "<"] {
        registry.register(name, any_pair(), boolean, binary(less));
    }
    for name in ["lte", "<="] {
        registry.register(name, any_pair(), boolean, binary(less_or_equal));
    }
    for name in ["greater", ">"] {
        registry.register(name, any_pair(), boolean, binary(greater));
    }
    for name in ["gte", ">="] {
        registry.register(name, any_pair(), boolean, binary(greater_or_equal));
    }
}

fn ordered(
    props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<Ordering> {
    coercion::compare(left, right, props.current_date())
}

fn equal(props: &FunctionProperties, left: &ExprValue, right: &ExprValue) -> ExprResult<ExprValue> {
    Ok(ExprValue::boolean(ordered(props, left, right)? == Ordering::Equal))
}

fn not_equal(
    props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    Ok(ExprValue::boolean(ordered(props, left, right)? != Ordering::Equal))
}

fn less(props: &FunctionProperties, left: &ExprValue, right: &ExprValue) -> ExprResult<ExprValue> {
    Ok(ExprValue::boolean(ordered(props, left, right)? == Ordering::Less))
}

fn less_or_equal(
    props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    Ok(ExprValue::boolean(ordered(props, left, right)? != Ordering::Greater))
}

fn greater(
    props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    Ok(ExprValue::boolean(ordered(props, left, right)? == Ordering::Greater))
}

fn greater_or_equal(
    props: &FunctionProperties,
    left: &ExprValue,
    right: &ExprValue,
) -> ExprResult<ExprValue> {
    Ok(ExprValue::boolean(ordered(props, left, right)? != Ordering::Less))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use docsql_types::temporal;
    use pretty_assertions::assert_eq;

    fn props() -> FunctionProperties {
        let start = "2020-09-16T17:30:00Z".parse::<DateTime<Utc>>().unwrap();
        FunctionProperties::new(start)
    }

    #[test]
    fn test_numeric_comparison_widens() {
        let out = less(&props(), &ExprValue::byte(2), &ExprValue::double(2.5)).unwrap();
        assert_eq!(out, ExprValue::boolean(true));
        let out = equal(&props(), &ExprValue::integer(2), &ExprValue::long(2)).unwrap();
        assert_eq!(out, ExprValue::boolean(true));
    }

    #[test]
    fn test_cross_kind_temporal_equality() {
        let ts = ExprValue::timestamp(temporal::parse_timestamp("2020-09-16 00:00:00").unwrap());
        let d = ExprValue::date(temporal::parse_date("2020-09-16").unwrap());
        assert_eq!(equal(&props(), &ts, &d).unwrap(), ExprValue::boolean(true));
    }

    #[test]
    fn test_time_compares_on_query_date() {
        let t = ExprValue::time(temporal::parse_time("10:20:30").unwrap());
        let dt = ExprValue::datetime(temporal::parse_datetime("2020-09-16 11:00:00").unwrap());
        assert_eq!(less(&props(), &t, &dt).unwrap(), ExprValue::boolean(true));
    }

    #[test]
    fn test_through_registry_with_propagation() {
        let registry = FunctionRegistry::with_standard_functions();
        let resolved = registry
            .resolve("=", &[ExprCoreType::Integer, ExprCoreType::Unknown])
            .unwrap();
        assert_eq!(resolved.return_type(), ExprCoreType::Boolean);
        let out = resolved
            .apply(&props(), &[ExprValue::integer(1), ExprValue::null()])
            .unwrap();
        assert!(out.is_null());
    }
}
