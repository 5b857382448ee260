// Formatting and date helpers shared by the binary and report assembly.
//
// Report dates are calendar days in the vendor's reporting zone (US Pacific).
// Conversion into that zone happens here, before a date reaches the fiscal
// calendar, which works purely in UTC calendar days.
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::America::Los_Angeles;
use num_format::{Locale, ToFormattedString};

/// Calendar day of `instant` in the vendor reporting zone.
pub fn to_pst_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Los_Angeles).date_naive()
}

/// Today in the vendor reporting zone.
pub fn pst_today() -> NaiveDate {
    to_pst_date(Utc::now())
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pacific_date_lags_utc() {
        // 05:00 UTC is still the previous evening in Los Angeles
        let instant = Utc.with_ymd_and_hms(2019, 6, 23, 5, 0, 0).unwrap();
        assert_eq!(
            to_pst_date(instant),
            NaiveDate::from_ymd_opt(2019, 6, 22).unwrap()
        );
        let instant = Utc.with_ymd_and_hms(2019, 6, 23, 8, 0, 0).unwrap();
        assert_eq!(
            to_pst_date(instant),
            NaiveDate::from_ymd_opt(2019, 6, 23).unwrap()
        );
    }

    #[test]
    fn dates() {
        assert_eq!(
            parse_date_safe(Some(" 2019-06-22 ")),
            NaiveDate::from_ymd_opt(2019, 6, 22)
        );
        assert_eq!(parse_date_safe(Some("20190622")), None);
        assert_eq!(parse_date_safe(None), None);
        assert_eq!(
            format_date(NaiveDate::from_ymd_opt(2019, 2, 3).unwrap()),
            "2019-02-03"
        );
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_int(1234567i64), "1,234,567");
        assert_eq!(format_int(-1200i64), "-1,200");
    }
}
