use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::DayEntry;

/// Number of days in `month` of `year`, leap years included.
/// Returns 0 for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(start), Some(end)) => u32::try_from((end - start).num_days()).unwrap_or(0),
        _ => 0,
    }
}

/// `DD/MM/YYYY`, the format entries are displayed and stored with.
pub fn format_entry_date(year: i32, month: u32, day: u32) -> String {
    format!("{day:02}/{month:02}/{year}")
}

/// One unoperated placeholder per calendar day of the month.
pub fn initialize_month(year: i32, month: u32, capital: Decimal) -> Vec<DayEntry> {
    (1..=days_in_month(year, month))
        .map(|day| DayEntry::placeholder(year, month, day, capital))
        .collect()
}
