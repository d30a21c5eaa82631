//! Per-query evaluation context
//!
//! `FunctionProperties` fixes "now" once per query execution so that every
//! time-dependent function observes a single consistent instant, and so that
//! a bare `Time` value anchors to one query date everywhere it is compared
//! or extended. It is read-only after construction and safe to share across
//! concurrently evaluated expressions.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Per-query-execution context holding the fixed query start instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionProperties {
    query_start: DateTime<Utc>,
}

impl FunctionProperties {
    /// Create a context anchored at the given query start instant
    pub fn new(query_start: DateTime<Utc>) -> Self {
        Self { query_start }
    }

    /// The query start instant
    pub fn now(&self) -> DateTime<Utc> {
        self.query_start
    }

    /// The query start as a civil datetime (UTC wall clock)
    pub fn current_datetime(&self) -> NaiveDateTime {
        self.query_start.naive_utc()
    }

    /// The query date; bare `Time` values anchor to this
    pub fn current_date(&self) -> NaiveDate {
        self.query_start.naive_utc().date()
    }

    /// The query start time of day
    pub fn current_time(&self) -> NaiveTime {
        self.query_start.naive_utc().time()
    }

    /// Seconds since the Unix epoch at query start
    pub fn epoch_seconds(&self) -> i64 {
        self.query_start.timestamp()
    }
}

impl Default for FunctionProperties {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}
