// Fiscal calendar through the public API.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rstest::rstest;

use appstore_report::{
    fiscal_year_start, generate_fiscal_year, plan_period_requests, CalendarError, Frequency,
    PeriodCache,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn fiscal_2019_starts_before_october() {
    let start = fiscal_year_start(2019).unwrap();
    assert_eq!(start, date(2018, 9, 30));
    assert_eq!(start.weekday(), Weekday::Sun);

    let fy = generate_fiscal_year(2019).unwrap();
    let p1 = fy.period(1).unwrap();
    assert_eq!(p1.begin_date, start);
    assert_eq!(p1.week_count, 5);
}

#[test]
fn period_thirteen_is_rejected() {
    let cache = PeriodCache::new();
    assert_eq!(
        cache.lookup_period(2019, 13),
        Err(CalendarError::PeriodOutOfRange { period: 13 })
    );
}

#[rstest]
#[case(2017, 53)]
#[case(2018, 52)]
#[case(2019, 52)]
#[case(2022, 53)]
#[case(2040, 53)]
fn year_lengths(#[case] year: i32, #[case] weeks: u32) {
    let fy = generate_fiscal_year(year).unwrap();
    assert_eq!(fy.total_weeks(), weeks);
    assert_eq!(
        fy.end_date() - fy.begin_date() + Duration::days(1),
        Duration::weeks(i64::from(weeks))
    );
}

#[test]
fn quarter_leaders_have_five_weeks() {
    for year in 2015..2030 {
        let fy = generate_fiscal_year(year).unwrap();
        for p in fy.periods() {
            match p.period {
                1 | 4 | 7 | 10 => assert_eq!(p.week_count, 5, "FY{year} P{}", p.period),
                3 => assert!(p.week_count == 4 || p.week_count == 5),
                _ => assert_eq!(p.week_count, 4, "FY{year} P{}", p.period),
            }
        }
    }
}

#[test]
fn period_five_plan() {
    let cache = PeriodCache::new();
    let p5 = cache.lookup_period(2019, 5).unwrap();
    assert_eq!(p5.week_count, 4);
    assert_eq!(p5.days(), 28);

    let plan = plan_period_requests(p5.begin_date, p5.end_date, p5.week_count);
    let daily = plan.iter().filter(|r| r.frequency == Frequency::Daily).count();
    let weekly = plan.iter().filter(|r| r.frequency == Frequency::Weekly).count();
    // one leading day, three full weeks, six trailing days
    assert_eq!(weekly, 3);
    assert_eq!(daily, 1 + 6);
    assert_eq!(1 + 7 * weekly + (daily - 1), 28);
    assert_eq!(plan.last().unwrap().date, p5.end_date);
}

#[test]
fn five_week_plan_has_four_weekly_requests() {
    let cache = PeriodCache::new();
    let p1 = cache.lookup_period(2019, 1).unwrap();
    let plan = plan_period_requests(p1.begin_date, p1.end_date, p1.week_count);
    assert_eq!(
        plan.iter().filter(|r| r.frequency == Frequency::Weekly).count(),
        4
    );
    assert_eq!(plan.len(), 1 + 4 + 6);
}
