//! Day-first date parsing and the calendar bucket keys built on it.
//!
//! Source dates are ambiguous strings such as `03/04/2024` (3 April). A value
//! either parses to the date it names or to `None`; years below 1000 are
//! never produced, and two-digit years land within 50 years of today.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};

// ── DayFirstParser ────────────────────────────────────────────────────────────

/// Parses the day-first date strings found in the user-records source.
pub struct DayFirstParser;

/// Smallest year accepted from a four-digit year field. chrono's `%Y` reads
/// `24` as year 24, which must fall through to the two-digit forms instead.
const MIN_FULL_YEAR: i32 = 1000;

/// Date-time patterns with a full year, tried in order. Day-first forms come
/// before ISO so that `03/04/2024` reads as 3 April.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d-%m-%Y %I:%M:%S %p",
    "%d-%m-%Y %I:%M %p",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y %I:%M:%S %p",
    "%d.%m.%Y %I:%M %p",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"];

/// Two-digit-year forms, only tried once the full-year forms have failed.
const SHORT_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%y %I:%M:%S %p",
    "%d/%m/%y %I:%M %p",
    "%d-%m-%y %H:%M:%S",
    "%d-%m-%y %H:%M",
    "%d-%m-%y %I:%M:%S %p",
    "%d-%m-%y %I:%M %p",
    "%d.%m.%y %H:%M:%S",
    "%d.%m.%y %H:%M",
    "%d.%m.%y %I:%M:%S %p",
    "%d.%m.%y %I:%M %p",
];

const SHORT_DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];

impl DayFirstParser {
    /// Parse `s` into a naive date-time, or `None` when no pattern matches.
    ///
    /// Date-only values land at midnight. Two-digit years are resolved
    /// against the current year.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use dashboard_core::dates::DayFirstParser;
    ///
    /// let dt = DayFirstParser::parse("03/04/2024 10:30").unwrap();
    /// assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
    /// assert!(DayFirstParser::parse("not a date").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        Self::parse_with_reference(s, Local::now().year())
    }

    /// Like [`DayFirstParser::parse`], resolving a two-digit year to the
    /// year within 50 years of `reference_year`.
    pub fn parse_with_reference(s: &str, reference_year: i32) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Some(dt) = candidates(s, DATETIME_FORMATS, DATE_FORMATS)
            .find(|dt| dt.year() >= MIN_FULL_YEAR)
        {
            return Some(dt);
        }

        candidates(s, SHORT_DATETIME_FORMATS, SHORT_DATE_FORMATS)
            .find_map(|dt| resolve_century(dt, reference_year))
    }
}

/// Every successful parse of `s`, date-time patterns first.
fn candidates<'a>(
    s: &'a str,
    datetime_formats: &'a [&'a str],
    date_formats: &'a [&'a str],
) -> impl Iterator<Item = NaiveDateTime> + 'a {
    let datetimes = datetime_formats
        .iter()
        .filter_map(move |fmt| NaiveDateTime::parse_from_str(s, fmt).ok());
    let dates = date_formats.iter().filter_map(move |fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN))
    });
    datetimes.chain(dates)
}

/// Move a two-digit year into the century that puts it closest to
/// `reference_year`: `[reference - 50, reference + 50)`.
fn resolve_century(dt: NaiveDateTime, reference_year: i32) -> Option<NaiveDateTime> {
    let mut year = reference_year - reference_year.rem_euclid(100) + dt.year().rem_euclid(100);
    if year >= reference_year + 50 {
        year -= 100;
    } else if year < reference_year - 50 {
        year += 100;
    }
    dt.with_year(year)
}

// ── Calendar buckets ──────────────────────────────────────────────────────────

/// Year-week key with Sunday-first week numbers (`%Y-%U`, weeks `00`–`53`).
pub fn week_key(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%U").to_string()
}

/// Year-month key (`%Y-%m`).
pub fn month_key(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m").to_string()
}

/// Whole days from `then` to `now`, rounded towards negative infinity so a
/// login later today still counts as day 0 and one in the future as -1.
pub fn days_between(then: &NaiveDateTime, now: &NaiveDateTime) -> i64 {
    (*now - *then).num_seconds().div_euclid(86_400)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_day_first_slash() {
        assert_eq!(DayFirstParser::parse("03/04/2024"), Some(dt(2024, 4, 3, 0, 0)));
        assert_eq!(DayFirstParser::parse("25/12/2023"), Some(dt(2023, 12, 25, 0, 0)));
    }

    #[test]
    fn test_parse_day_first_with_time() {
        assert_eq!(
            DayFirstParser::parse("03/04/2024 14:05"),
            Some(dt(2024, 4, 3, 14, 5))
        );
        assert_eq!(
            DayFirstParser::parse("03-04-2024 14:05:00"),
            Some(dt(2024, 4, 3, 14, 5))
        );
    }

    #[test]
    fn test_parse_dotted_and_iso() {
        assert_eq!(DayFirstParser::parse("01.02.2024"), Some(dt(2024, 2, 1, 0, 0)));
        assert_eq!(DayFirstParser::parse("2024-02-01"), Some(dt(2024, 2, 1, 0, 0)));
        assert_eq!(
            DayFirstParser::parse("2024-02-01T08:30:00"),
            Some(dt(2024, 2, 1, 8, 30))
        );
    }

    #[test]
    fn test_parse_invalid_returns_none() {
        assert!(DayFirstParser::parse("").is_none());
        assert!(DayFirstParser::parse("   ").is_none());
        assert!(DayFirstParser::parse("32/01/2024").is_none());
        assert!(DayFirstParser::parse("not-a-date").is_none());
        // Month 13 is never valid in day-first order.
        assert!(DayFirstParser::parse("01/13/2024").is_none());
    }

    #[test]
    fn test_parse_two_digit_year_uses_nearest_century() {
        assert_eq!(
            DayFirstParser::parse_with_reference("05/01/24", 2026),
            Some(dt(2024, 1, 5, 0, 0))
        );
        assert_eq!(
            DayFirstParser::parse_with_reference("05-01-99", 2026),
            Some(dt(1999, 1, 5, 0, 0))
        );
        assert_eq!(
            DayFirstParser::parse_with_reference("05.01.75 18:30", 2026),
            Some(dt(2075, 1, 5, 18, 30))
        );
        assert_eq!(
            DayFirstParser::parse_with_reference("05/01/24 10:30 PM", 2026),
            Some(dt(2024, 1, 5, 22, 30))
        );
    }

    #[test]
    fn test_parse_never_yields_short_years() {
        let parsed = DayFirstParser::parse_with_reference("05/01/24", 2026).unwrap();
        assert_eq!(week_key(&parsed), "2024-00");
        assert_eq!(month_key(&parsed), "2024-01");
        assert!(DayFirstParser::parse("05/01/24").is_some_and(|dt| dt.year() >= 1000));

        // A zero-padded small year is not a two-digit year either.
        assert!(DayFirstParser::parse("05/01/0024").is_none());
        assert!(DayFirstParser::parse("0024-01-05").is_none());
    }

    #[test]
    fn test_parse_year_first_slash_with_time() {
        assert_eq!(
            DayFirstParser::parse("2024/01/05 10:00"),
            Some(dt(2024, 1, 5, 10, 0))
        );
        assert_eq!(
            DayFirstParser::parse("2024/01/05 10:00:00"),
            Some(dt(2024, 1, 5, 10, 0))
        );
        assert_eq!(DayFirstParser::parse("2024/01/05"), Some(dt(2024, 1, 5, 0, 0)));
    }

    #[test]
    fn test_parse_twelve_hour_clock() {
        assert_eq!(
            DayFirstParser::parse("05/01/2024 10:30 AM"),
            Some(dt(2024, 1, 5, 10, 30))
        );
        assert_eq!(
            DayFirstParser::parse("05-01-2024 10:30 pm"),
            Some(dt(2024, 1, 5, 22, 30))
        );
        assert_eq!(
            DayFirstParser::parse("05.01.2024 12:15:00 AM"),
            Some(dt(2024, 1, 5, 0, 15))
        );
        assert!(DayFirstParser::parse("05/01/2024 13:30 PM").is_none());
    }

    #[test]
    fn test_week_key_sunday_first() {
        // 2024-01-01 is a Monday, before the first Sunday → week 00.
        assert_eq!(week_key(&dt(2024, 1, 1, 0, 0)), "2024-00");
        // 2024-01-07 is the first Sunday → week 01.
        assert_eq!(week_key(&dt(2024, 1, 7, 0, 0)), "2024-01");
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(&dt(2024, 3, 15, 12, 0)), "2024-03");
    }

    #[test]
    fn test_days_between_floors() {
        let now = dt(2024, 1, 10, 12, 0);
        assert_eq!(days_between(&dt(2024, 1, 1, 12, 0), &now), 9);
        assert_eq!(days_between(&dt(2024, 1, 10, 8, 0), &now), 0);
        assert_eq!(days_between(&dt(2024, 1, 10, 18, 0), &now), -1);
    }
}
