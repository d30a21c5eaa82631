//! End-to-end tests of the temporal function library through plan-time
//! resolution: every call goes name + argument types -> ResolvedFunction ->
//! apply, the same path the query planner takes.

use chrono::{DateTime, Utc};
use docsql_eval::{FunctionProperties, FunctionRegistry};
use docsql_types::{temporal, ExprCoreType, ExprError, ExprResult, ExprValue, IntervalUnit, IntervalValue};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn props() -> FunctionProperties {
    let start = "2020-09-16T17:30:00Z".parse::<DateTime<Utc>>().unwrap();
    FunctionProperties::new(start)
}

fn eval(name: &str, args: &[ExprValue]) -> ExprResult<ExprValue> {
    let registry = FunctionRegistry::with_standard_functions();
    let arg_types: Vec<ExprCoreType> = args.iter().map(ExprValue::core_type).collect();
    let resolved = registry.resolve(name, &arg_types)?;
    resolved.apply(&props(), args)
}

fn date_of(s: &str) -> ExprValue {
    ExprValue::date(temporal::parse_date(s).unwrap())
}

fn datetime_of(s: &str) -> ExprValue {
    ExprValue::datetime(temporal::parse_datetime(s).unwrap())
}

#[test]
fn clock_functions_pin_to_query_start() {
    assert_eq!(eval("now", &[]).unwrap(), datetime_of("2020-09-16 17:30:00"));
    assert_eq!(eval("curdate", &[]).unwrap(), date_of("2020-09-16"));
    assert_eq!(
        eval("unix_timestamp", &[]).unwrap(),
        ExprValue::long(1_600_277_400)
    );
}

#[test]
fn date_add_month_clamps_and_keeps_date() {
    let interval = ExprValue::interval(IntervalValue::from_unit(IntervalUnit::Month, 1).unwrap());
    assert_eq!(
        eval("date_add", &[date_of("2020-01-31"), interval]).unwrap(),
        date_of("2020-02-29")
    );
}

#[test]
fn date_add_clock_interval_promotes_to_datetime() {
    let interval = ExprValue::interval(IntervalValue::from_unit(IntervalUnit::Minute, 90).unwrap());
    assert_eq!(
        eval("date_add", &[date_of("2020-09-16"), interval]).unwrap(),
        datetime_of("2020-09-16 01:30:00")
    );
}

#[test]
fn adddate_day_count_form_keeps_date() {
    assert_eq!(
        eval("adddate", &[date_of("2020-09-16"), ExprValue::long(20)]).unwrap(),
        date_of("2020-10-06")
    );
    assert_eq!(
        eval("subdate", &[date_of("2020-09-16"), ExprValue::long(20)]).unwrap(),
        date_of("2020-08-27")
    );
}

#[test]
fn datediff_is_first_minus_second() {
    assert_eq!(
        eval("datediff", &[date_of("2020-09-21"), date_of("2020-09-16")]).unwrap(),
        ExprValue::long(5)
    );
    assert_eq!(
        eval("datediff", &[date_of("2020-09-16"), date_of("2020-09-21")]).unwrap(),
        ExprValue::long(-5)
    );
}

#[test]
fn datediff_anchors_bare_time_to_query_date() {
    let time = ExprValue::time(temporal::parse_time("23:59:59").unwrap());
    assert_eq!(
        eval("datediff", &[time, date_of("2020-09-16")]).unwrap(),
        ExprValue::long(0)
    );
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(2, 52)]
#[case(3, 1)]
#[case(4, 1)]
#[case(5, 0)]
#[case(6, 1)]
#[case(7, 53)]
fn week_honors_all_eight_modes(#[case] mode: i32, #[case] expected: i32) {
    assert_eq!(
        eval(
            "week",
            &[ExprValue::string("2019-01-05"), ExprValue::integer(mode)]
        )
        .unwrap(),
        ExprValue::integer(expected)
    );
}

#[test]
fn week_rejects_mode_out_of_range() {
    let err = eval(
        "week",
        &[ExprValue::string("2019-01-05"), ExprValue::integer(8)],
    )
    .unwrap_err();
    assert!(matches!(err, ExprError::SemanticCheck { .. }));
    assert!(err.to_string().contains("mode:8"));
}

#[test]
fn yearweek_attributes_boundary_weeks() {
    assert_eq!(
        eval("yearweek", &[ExprValue::string("2019-01-05")]).unwrap(),
        ExprValue::integer(201_852)
    );
}

#[test]
fn makedate_rolls_and_defaults() {
    assert_eq!(
        eval(
            "makedate",
            &[ExprValue::double(2001.0), ExprValue::double(366.0)]
        )
        .unwrap(),
        date_of("2002-01-01")
    );
    assert_eq!(
        eval(
            "makedate",
            &[ExprValue::double(0.0), ExprValue::double(42.0)]
        )
        .unwrap(),
        date_of("2000-02-11")
    );
    assert!(
        eval(
            "makedate",
            &[ExprValue::double(-1.0), ExprValue::double(42.0)]
        )
        .unwrap()
        .is_null()
    );
}

#[test]
fn maketime_distinguishes_null_from_range_failure() {
    assert_eq!(
        eval(
            "maketime",
            &[
                ExprValue::double(23.0),
                ExprValue::double(59.0),
                ExprValue::double(59.0)
            ]
        )
        .unwrap(),
        ExprValue::time(temporal::parse_time("23:59:59").unwrap())
    );
    assert!(
        eval(
            "maketime",
            &[
                ExprValue::double(-1.0),
                ExprValue::double(0.0),
                ExprValue::double(0.0)
            ]
        )
        .unwrap()
        .is_null()
    );
    let err = eval(
        "maketime",
        &[
            ExprValue::double(24.0),
            ExprValue::double(0.0),
            ExprValue::double(0.0),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, ExprError::SemanticCheck { .. }));
}

#[test]
fn unix_time_round_trips() {
    let ts = datetime_of("2020-09-16 17:30:00");
    let seconds = eval("unix_timestamp", &[ts.clone()]).unwrap();
    assert_eq!(seconds, ExprValue::double(1_600_277_400.0));
    assert_eq!(eval("from_unixtime", &[seconds]).unwrap(), ts);
}

#[test]
fn unix_timestamp_clamps_instants_outside_the_epoch_range() {
    assert_eq!(
        eval("unix_timestamp", &[datetime_of("1960-01-01 00:00:00")]).unwrap(),
        ExprValue::double(0.0)
    );
    assert_eq!(
        eval("unix_timestamp", &[datetime_of("3001-01-20 00:00:00")]).unwrap(),
        ExprValue::double(0.0)
    );
}

#[test]
fn unix_timestamp_packed_rejects_phantom_dates() {
    assert!(
        eval("unix_timestamp", &[ExprValue::double(19_990_231.0)])
            .unwrap()
            .is_null()
    );
}

#[test]
fn from_unixtime_out_of_range_is_null() {
    assert!(
        eval("from_unixtime", &[ExprValue::double(-1.0)])
            .unwrap()
            .is_null()
    );
    assert!(
        eval("from_unixtime", &[ExprValue::double(32_536_771_200.0)])
            .unwrap()
            .is_null()
    );
}

#[test]
fn from_unixtime_with_format_renders_string() {
    assert_eq!(
        eval(
            "from_unixtime",
            &[
                ExprValue::double(1_600_277_400.0),
                ExprValue::string("%Y-%m-%d %T")
            ]
        )
        .unwrap(),
        ExprValue::string("2020-09-16 17:30:00")
    );
}

#[test]
fn cross_kind_temporal_equality() {
    let ts = ExprValue::timestamp(temporal::parse_timestamp("2020-09-16 00:00:00").unwrap());
    assert_eq!(
        eval("=", &[ts, date_of("2020-09-16")]).unwrap(),
        ExprValue::boolean(true)
    );

    let time = ExprValue::time(temporal::parse_time("10:20:30").unwrap());
    assert_eq!(
        eval("=", &[time, datetime_of("2020-09-16 10:20:30")]).unwrap(),
        ExprValue::boolean(true)
    );
}

#[test]
fn string_literals_parse_inside_function_bodies() {
    assert_eq!(
        eval("to_days", &[ExprValue::string("2008-10-07")]).unwrap(),
        ExprValue::long(733_687)
    );
    let err = eval("to_days", &[ExprValue::string("last tuesday")]).unwrap_err();
    assert!(matches!(err, ExprError::SemanticCheck { .. }));
    assert!(err.to_string().contains("last tuesday"));
}

#[test]
fn str_to_date_mismatch_is_null_not_error() {
    assert!(
        eval(
            "str_to_date",
            &[
                ExprValue::string("2013-02-30"),
                ExprValue::string("%Y-%m-%d")
            ]
        )
        .unwrap()
        .is_null()
    );
}

#[test]
fn divide_by_zero_is_null_through_registry() {
    assert!(
        eval("/", &[ExprValue::integer(1), ExprValue::integer(0)])
            .unwrap()
            .is_null()
    );
}
