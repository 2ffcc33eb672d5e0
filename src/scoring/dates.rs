use chrono::NaiveDate;

/// Accepted date layouts, tried in order: ISO first, then US.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

const DAYS_PER_YEAR: f64 = 365.25;

/// Parse a registry date in either `YYYY-MM-DD` or `MM/DD/YYYY` form.
///
/// Returns `None` for empty or unparseable input.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Whole days from `start` to `end`, expressed in 365.25-day years.
/// Negative when `end` precedes `start`.
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}
