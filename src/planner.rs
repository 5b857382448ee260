// Request plan covering a fiscal period with daily and weekly reports.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::calendar::FiscalPeriod;

/// Report granularity accepted by the sales endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One report to request. Weekly requests are anchored on the last day of
/// the week they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedRequest {
    pub date: NaiveDate,
    pub frequency: Frequency,
}

impl PlannedRequest {
    fn daily(date: NaiveDate) -> Self {
        Self {
            date,
            frequency: Frequency::Daily,
        }
    }

    fn weekly(date: NaiveDate) -> Self {
        Self {
            date,
            frequency: Frequency::Weekly,
        }
    }
}

/// Plans the requests covering `begin..=end`: a daily report for the first
/// day, `week_count - 1` weekly reports, then daily reports for whatever
/// remains up to and including `end`.
///
/// At least one trailing daily request is always issued, matching the
/// vendor calendar where the weekly reports stop one day short of the
/// period end.
pub fn plan_period_requests(
    begin: NaiveDate,
    end: NaiveDate,
    week_count: u32,
) -> Vec<PlannedRequest> {
    let mut plan = vec![PlannedRequest::daily(begin)];

    let mut cursor = begin + Duration::days(1);
    for _ in 1..week_count {
        cursor += Duration::days(6);
        plan.push(PlannedRequest::weekly(cursor));
        cursor += Duration::days(1);
    }

    loop {
        plan.push(PlannedRequest::daily(cursor));
        cursor += Duration::days(1);
        if cursor > end {
            break;
        }
    }
    plan
}

/// [`plan_period_requests`] for a calendar period.
pub fn plan_for_period(period: &FiscalPeriod) -> Vec<PlannedRequest> {
    plan_period_requests(period.begin_date, period.end_date, period.week_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::generate_fiscal_year;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn four_week_period() {
        let fy = generate_fiscal_year(2019).unwrap();
        let p5 = fy.period(5).unwrap();
        let plan = plan_for_period(p5);

        let weekly: Vec<NaiveDate> = plan
            .iter()
            .filter(|r| r.frequency == Frequency::Weekly)
            .map(|r| r.date)
            .collect();
        assert_eq!(
            weekly,
            vec![date(2019, 2, 10), date(2019, 2, 17), date(2019, 2, 24)]
        );

        assert_eq!(plan[0], PlannedRequest::daily(date(2019, 2, 3)));
        let trailing: Vec<NaiveDate> = plan[4..].iter().map(|r| r.date).collect();
        assert_eq!(
            trailing,
            (25..=28)
                .map(|d| date(2019, 2, d))
                .chain((1..=2).map(|d| date(2019, 3, d)))
                .collect::<Vec<_>>()
        );
        assert!(plan[4..].iter().all(|r| r.frequency == Frequency::Daily));
        assert_eq!(plan.len(), 1 + 3 + 6);
    }

    #[test]
    fn plan_covers_every_day_once() {
        let fy = generate_fiscal_year(2017).unwrap();
        for p in fy.periods() {
            let plan = plan_for_period(p);
            let days: i64 = plan
                .iter()
                .map(|r| match r.frequency {
                    Frequency::Weekly => 7,
                    _ => 1,
                })
                .sum();
            assert_eq!(days, p.days(), "period {}", p.period);
            assert_eq!(plan.last().unwrap().date, p.end_date);
        }
    }

    #[test]
    fn replanning_is_identical() {
        let begin = date(2019, 2, 3);
        let end = date(2019, 3, 2);
        assert_eq!(
            plan_period_requests(begin, end, 4),
            plan_period_requests(begin, end, 4)
        );
    }

    #[test]
    fn frequency_names() {
        assert_eq!(Frequency::Daily.to_string(), "DAILY");
        assert_eq!(Frequency::Weekly.as_str(), "WEEKLY");
    }
}
