use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single calendar month, the unit of time every projection is indexed by.
///
/// `MonthKey` replaces loose `(year, month)` tuples throughout the engine so
/// that month arithmetic (grace periods, depreciation windows, horizon
/// iteration) lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl MonthKey {
    /// Creates a new `MonthKey`, rejecting out-of-range months.
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Absolute month index since year 0, used for distance arithmetic.
    pub fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    /// The month `n` months after this one.
    pub fn plus_months(&self, n: u32) -> Self {
        let idx = self.index() + n as i64;
        Self {
            year: (idx.div_euclid(12)) as i32,
            month: (idx.rem_euclid(12)) as u32 + 1,
        }
    }

    /// Signed number of months from `other` to `self`.
    pub fn months_since(&self, other: &MonthKey) -> i64 {
        self.index() - other.index()
    }

    /// Iterates over `horizon_years * 12` consecutive months starting here.
    pub fn horizon(&self, horizon_years: u32) -> impl Iterator<Item = MonthKey> + use<> {
        let start = *self;
        (0..horizon_years * 12).map(move |i| start.plus_months(i))
    }
}
