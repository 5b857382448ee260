// Vendor fiscal calendar.
//
// A fiscal year has twelve periods grouped into four quarters. Each quarter
// opens with a 5-week period followed by two 4-week periods, and period 3
// gains a leap week in some years. All dates are UTC calendar days with no
// time-of-day component, so daylight-saving changes never move a boundary.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use std::fmt;

use crate::error::CalendarError;

/// Number of periods in every fiscal year.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Periods per fiscal quarter.
const PERIODS_PER_QUARTER: u32 = 3;

/// Period that absorbs the leap week.
const LEAP_WEEK_PERIOD: u32 = 3;

/// One fiscal month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiscalPeriod {
    /// Fiscal year this period belongs to.
    pub year: i32,
    /// Position within the fiscal year, 1-12.
    pub period: u32,
    /// Number of 7-day weeks, 4 or 5.
    pub week_count: u32,
    /// First day, inclusive.
    pub begin_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
}

impl FiscalPeriod {
    /// Returns true if `date` falls within this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.begin_date && date <= self.end_date
    }

    /// Length of the period in days.
    pub fn days(&self) -> i64 {
        (self.end_date - self.begin_date).num_days() + 1
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "FY {} Period-{} weeks: {}",
            self.year, self.period, self.week_count
        )?;
        writeln!(f, "=======")?;
        writeln!(f, "StartDate:\t{}", self.begin_date.format("%Y-%m-%d"))?;
        write!(f, "EndDate:\t{}", self.end_date.format("%Y-%m-%d"))
    }
}

/// The twelve periods of one fiscal year, in order. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiscalYear {
    year: i32,
    periods: Vec<FiscalPeriod>,
}

impl FiscalYear {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn periods(&self) -> &[FiscalPeriod] {
        &self.periods
    }

    /// Returns period `index` (1-based).
    pub fn period(&self, index: u32) -> Result<&FiscalPeriod, CalendarError> {
        check_period(index)?;
        self.periods
            .get((index - 1) as usize)
            .ok_or(CalendarError::PeriodOutOfRange { period: index })
    }

    pub fn begin_date(&self) -> NaiveDate {
        self.periods[0].begin_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.periods[self.periods.len() - 1].end_date
    }

    /// Sum of week counts; 52 or 53.
    pub fn total_weeks(&self) -> u32 {
        self.periods.iter().map(|p| p.week_count).sum()
    }
}

/// Gregorian leap-year test.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in a Gregorian month, or `None` when `month` is not 1-12.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        _ => None,
    }
}

/// First day of fiscal year `year`: the Sunday on or before October 1 of
/// `year - 1`.
pub fn fiscal_year_start(year: i32) -> Result<NaiveDate, CalendarError> {
    check_year(year)?;
    let october_first = NaiveDate::from_ymd_opt(year - 1, 10, 1)
        .ok_or(CalendarError::DateOutOfRange { year })?;
    let back = i64::from(october_first.weekday().num_days_from_sunday());
    Ok(october_first - Duration::days(back))
}

/// Builds the twelve periods of fiscal year `year`.
pub fn generate_fiscal_year(year: i32) -> Result<FiscalYear, CalendarError> {
    let leap_week = has_leap_week(year)?;
    let mut cursor = fiscal_year_start(year)?;
    let mut periods = Vec::with_capacity(PERIODS_PER_YEAR as usize);

    for period in 1..=PERIODS_PER_YEAR {
        let mut week_count = if period % PERIODS_PER_QUARTER == 1 { 5 } else { 4 };
        if period == LEAP_WEEK_PERIOD && leap_week {
            week_count = 5;
        }

        let next = cursor
            .checked_add_signed(Duration::weeks(i64::from(week_count)))
            .ok_or(CalendarError::DateOutOfRange { year })?;
        periods.push(FiscalPeriod {
            year,
            period,
            week_count,
            begin_date: cursor,
            end_date: next - Duration::days(1),
        });
        cursor = next;
    }

    Ok(FiscalYear { year, periods })
}

/// Period 3 runs five weeks when the fiscal year is a leap year whose
/// January 1 is a Sunday, or when `year - 2` is a multiple of five.
fn has_leap_week(year: i32) -> Result<bool, CalendarError> {
    check_year(year)?;
    let new_year =
        NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CalendarError::DateOutOfRange { year })?;
    Ok((is_leap_year(year) && new_year.weekday() == Weekday::Sun) || (year - 2) % 5 == 0)
}

pub(crate) fn check_year(year: i32) -> Result<(), CalendarError> {
    if (1..=9999).contains(&year) {
        Ok(())
    } else {
        Err(CalendarError::YearOutOfRange { year })
    }
}

pub(crate) fn check_period(period: u32) -> Result<(), CalendarError> {
    if (1..=PERIODS_PER_YEAR).contains(&period) {
        Ok(())
    } else {
        Err(CalendarError::PeriodOutOfRange { period })
    }
}
