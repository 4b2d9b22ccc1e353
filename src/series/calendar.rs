//! Business-day calendar for report columns.
//!
//! Weekdays only; public holidays are not modelled. A holiday column simply
//! shows the previous value as filled.

use chrono::{Datelike, Days, FixedOffset, NaiveDate, Utc, Weekday};

/// Mexico City has been on fixed UTC-6 since DST was abolished in 2022.
const MEXICO_CITY_OFFSET_SECS: i32 = -6 * 3600;

/// Upper bound on business-day columns accepted from the command line.
pub const MAX_BUSINESS_DAYS: usize = 366;

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The last `n` business days ending at `asof` (inclusive when `asof` is a
/// business day), ascending. Stops early at the start of the calendar.
pub fn business_days_ending(asof: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n.min(MAX_BUSINESS_DAYS));
    let mut cursor = asof;
    while out.len() < n {
        if is_business_day(cursor) {
            out.push(cursor);
        }
        match cursor.checked_sub_days(Days::new(1)) {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    out.reverse();
    out
}

/// Current date in Mexico City.
pub fn today_mexico_city() -> NaiveDate {
    let now = Utc::now();
    match FixedOffset::east_opt(MEXICO_CITY_OFFSET_SECS) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn skips_weekends() {
        // 2024-01-08 is a Monday.
        let days = business_days_ending(d(2024, 1, 8), 6);
        assert_eq!(
            days,
            vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 5), d(2024, 1, 8)]
        );
    }

    #[test]
    fn weekend_asof_ends_on_friday() {
        let days = business_days_ending(d(2024, 1, 7), 3);
        assert_eq!(days, vec![d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 5)]);
    }

    #[test]
    fn zero_columns() {
        assert!(business_days_ending(d(2024, 1, 8), 0).is_empty());
    }

    #[test]
    fn huge_counts_stop_at_the_earliest_date() {
        let asof = NaiveDate::MIN.checked_add_days(Days::new(9)).unwrap();
        let days = business_days_ending(asof, usize::MAX);
        // Ten calendar days hold between six and eight weekdays.
        assert!((6..=8).contains(&days.len()), "{days:?}");
        assert!(days.iter().all(|d| is_business_day(*d) && *d <= asof));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn weekday_check() {
        assert!(is_business_day(d(2024, 1, 5)));
        assert!(!is_business_day(d(2024, 1, 6)));
        assert!(!is_business_day(d(2024, 1, 7)));
    }
}
