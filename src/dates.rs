use chrono::NaiveDate;

const FORMATS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// Parses the date portion of a roster or submission timestamp.
///
/// Accepts `DD/MM/YYYY` and `YYYY-MM-DD` (plus their other-separator
/// variants) with an optional trailing time, e.g. `2026-03-01 14:22`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;
    if date_part.is_empty() {
        return None;
    }

    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// Days from `date` to `as_of`, or `None` when the date cannot be read.
pub fn elapsed_days(raw: &str, as_of: NaiveDate) -> Option<i64> {
    parse_date(raw).map(|date| (as_of - date).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_day_first_and_iso_dates() {
        assert_eq!(parse_date("03/02/2026"), Some(day(2026, 2, 3)));
        assert_eq!(parse_date("3/2/2026"), Some(day(2026, 2, 3)));
        assert_eq!(parse_date("2026-02-03"), Some(day(2026, 2, 3)));
    }

    #[test]
    fn ignores_time_of_day() {
        assert_eq!(parse_date("2026-02-03 17:45:10"), Some(day(2026, 2, 3)));
        assert_eq!(parse_date("2026-02-03T17:45:10"), Some(day(2026, 2, 3)));
        assert_eq!(parse_date(" 03/02/2026 9:05 "), Some(day(2026, 2, 3)));
    }

    #[test]
    fn rejects_blank_and_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("31/02/2026"), None);
    }

    #[test]
    fn elapsed_days_counts_from_as_of() {
        let as_of = day(2026, 3, 1);
        assert_eq!(elapsed_days("2026-02-27", as_of), Some(2));
        assert_eq!(elapsed_days("01/03/2026", as_of), Some(0));
        assert_eq!(elapsed_days("2026-03-05", as_of), Some(-4));
        assert_eq!(elapsed_days("", as_of), None);
    }
}
