use chrono::{Datelike, NaiveDate};

/// Completed calendar years from `birth` to `today`.
///
/// The year difference is reduced by one when `today` falls before the
/// anniversary of `birth` in the current year (month, then day).
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

/// Whole years covered by a span, never negative.
pub fn whole_years_between(start: NaiveDate, end: NaiveDate) -> i32 {
    age_on(start, end).max(0)
}

/// `MM/YYYY`
pub fn month_year(date: NaiveDate) -> String {
    date.format("%m/%Y").to_string()
}

/// `DD/MM/YYYY`
pub fn day_month_year(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats a phone number by digit count: 10 digits as `(dd) dddd-dddd`,
/// 9 digits as `dd ddd dddd`. Anything else is returned unchanged.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        9 => format!("{} {} {}", &digits[..2], &digits[2..5], &digits[5..]),
        _ => raw.to_string(),
    }
}
