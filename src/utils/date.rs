use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Half-open local-time window `[midnight, next midnight)` for a calendar day.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    (start, start + Duration::days(1))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Monday-to-Sunday week containing `anchor`.
pub fn week_dates(anchor: NaiveDate) -> Vec<NaiveDate> {
    let monday = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
    (0..7).map(|i| monday + Duration::days(i)).collect()
}

pub fn all_days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return out,
    };

    while d.month() == month {
        out.push(d);
        d = match d.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    out
}

pub fn all_days_of_year(year: i32) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = match NaiveDate::from_ymd_opt(year, 1, 1) {
        Some(d) => d,
        None => return out,
    };

    while d.year() == year {
        out.push(d);
        d = match d.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn day_bounds_cover_exactly_one_day() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let (start, end) = day_bounds(day);
        assert_eq!(start.to_string(), "2026-01-05 00:00:00");
        assert_eq!(end.to_string(), "2026-01-06 00:00:00");
    }

    #[test]
    fn week_dates_start_on_monday() {
        // 2026-01-07 is a Wednesday
        let dates = week_dates(NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(dates[6], NaiveDate::from_ymd_opt(2026, 1, 11).unwrap());
        assert_eq!(dates[0].weekday(), Weekday::Mon);
    }

    #[test]
    fn month_days_handle_leap_february() {
        assert_eq!(all_days_of_month(2024, 2).len(), 29);
        assert_eq!(all_days_of_month(2026, 2).len(), 28);
        assert_eq!(all_days_of_month(2026, 4).len(), 30);
    }

    #[test]
    fn year_days_count() {
        assert_eq!(all_days_of_year(2026).len(), 365);
        assert_eq!(all_days_of_year(2024).len(), 366);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2026-01-05").is_some());
        assert!(parse_date("05/01/2026").is_none());
        assert!(parse_date("not-a-date").is_none());
    }
}
