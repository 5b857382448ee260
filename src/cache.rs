// Memoised fiscal years.
//
// The cache is owned by its caller and shared by reference. The
// check-and-populate step runs under one lock, so concurrent lookups for
// the same year never generate or insert twice.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::calendar::{check_period, fiscal_year_start, generate_fiscal_year, FiscalPeriod, FiscalYear};
use crate::error::CalendarError;

/// Fiscal year number to generated calendar, filled on first request and
/// never evicted.
#[derive(Debug, Default)]
pub struct PeriodCache {
    years: Mutex<HashMap<i32, Arc<FiscalYear>>>,
}

impl PeriodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns fiscal year `year`, generating it on first access.
    pub fn fiscal_year(&self, year: i32) -> Result<Arc<FiscalYear>, CalendarError> {
        let mut years = self.lock();
        if let Some(fy) = years.get(&year) {
            return Ok(Arc::clone(fy));
        }
        let fy = Arc::new(generate_fiscal_year(year)?);
        debug!(year, weeks = fy.total_weeks(), "cached fiscal year");
        years.insert(year, Arc::clone(&fy));
        Ok(fy)
    }

    /// Returns period `period` (1-12) of fiscal year `year`.
    pub fn lookup_period(&self, year: i32, period: u32) -> Result<FiscalPeriod, CalendarError> {
        check_period(period)?;
        let fy = self.fiscal_year(year)?;
        fy.period(period).copied()
    }

    /// Finds the fiscal period whose range contains `date`.
    ///
    /// Fiscal year boundaries are not contiguous. When a year ends after the
    /// next one starts, the overlapping days resolve to the later year.
    /// Returns `Ok(None)` when the date falls in a gap between the end of one
    /// fiscal year and the start of the next.
    pub fn period_containing(&self, date: NaiveDate) -> Result<Option<FiscalPeriod>, CalendarError> {
        let next = date.year() + 1;
        let year = if date >= fiscal_year_start(next)? {
            next
        } else {
            date.year()
        };
        let fy = self.fiscal_year(year)?;
        Ok(fy.periods().iter().find(|p| p.contains(date)).copied())
    }

    /// Number of cached fiscal years.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every cached year.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave a half-written entry, so a
    // poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<i32, Arc<FiscalYear>>> {
        self.years.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn lookup_fills_cache_once() {
        let cache = PeriodCache::new();
        assert!(cache.is_empty());

        let p5 = cache.lookup_period(2019, 5).unwrap();
        assert_eq!(p5.period, 5);
        assert_eq!(p5.week_count, 4);
        assert_eq!(cache.len(), 1);

        let first = cache.fiscal_year(2019).unwrap();
        let again = cache.fiscal_year(2019).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn out_of_range_period_is_an_error() {
        let cache = PeriodCache::new();
        assert_eq!(
            cache.lookup_period(2019, 13),
            Err(CalendarError::PeriodOutOfRange { period: 13 })
        );
        assert_eq!(
            cache.lookup_period(2019, 0),
            Err(CalendarError::PeriodOutOfRange { period: 0 })
        );
    }

    #[test]
    fn clear_resets() {
        let cache = PeriodCache::new();
        cache.lookup_period(2019, 1).unwrap();
        cache.lookup_period(2020, 1).unwrap();
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn finds_period_for_date() {
        let cache = PeriodCache::new();

        let p = cache.period_containing(date(2019, 2, 14)).unwrap().unwrap();
        assert_eq!((p.year, p.period), (2019, 5));

        // first day of fiscal 2019 sits in calendar 2018
        let p = cache.period_containing(date(2018, 9, 30)).unwrap().unwrap();
        assert_eq!((p.year, p.period), (2019, 1));

        let p = cache.period_containing(date(2018, 9, 29)).unwrap().unwrap();
        assert_eq!((p.year, p.period), (2018, 12));
    }

    #[test]
    fn date_between_fiscal_years() {
        // fiscal 2023 ends 2023-09-23, fiscal 2024 starts 2023-10-01
        let cache = PeriodCache::new();
        assert_eq!(cache.period_containing(date(2023, 9, 27)).unwrap(), None);
    }

    #[test]
    fn overlapping_date_resolves_to_later_year() {
        // fiscal 2022 ends 2022-10-01, fiscal 2023 starts 2022-09-25
        let cache = PeriodCache::new();
        let fy2022 = cache.fiscal_year(2022).unwrap();
        assert_eq!(fy2022.end_date(), date(2022, 10, 1));

        let found = cache.period_containing(date(2022, 9, 28)).unwrap().unwrap();
        assert_eq!((found.year, found.period), (2023, 1));
        assert_eq!(found.begin_date, date(2022, 9, 25));
    }

    #[test]
    fn concurrent_lookups_share_one_entry() {
        let cache = Arc::new(PeriodCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.lookup_period(2019 + (i % 2), 1 + i as u32).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 2);
    }
}
