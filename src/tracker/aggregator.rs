use rust_decimal::Decimal;

use crate::models::{DayEntry, DayResult, MonthlySummary};

/// Derive a month's statistics from its entries and the baseline capital.
///
/// Only operated days (both values present) contribute. Zero-profit days
/// count as neither profit nor loss days. When several days share the best
/// (or worst) profit, the first one in input order is reported. Divisions
/// by a zero capital or a zero operation count yield zero.
pub fn summarize(days: &[DayEntry], capital: Decimal) -> MonthlySummary {
    let operated: Vec<&DayEntry> = days.iter().filter(|d| d.is_operated()).collect();

    let Some(first) = operated.first() else {
        return MonthlySummary::default();
    };

    let profit_days = operated
        .iter()
        .filter(|d| d.profit_amount > Decimal::ZERO)
        .count();
    let loss_days = operated
        .iter()
        .filter(|d| d.profit_amount < Decimal::ZERO)
        .count();
    let total_profit = operated
        .iter()
        .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d.profit_amount));

    let mut best_day = DayResult {
        day: first.day,
        profit: first.profit_amount,
    };
    let mut worst_day = best_day;

    for entry in &operated[1..] {
        if entry.profit_amount > best_day.profit {
            best_day = DayResult {
                day: entry.day,
                profit: entry.profit_amount,
            };
        }
        if entry.profit_amount < worst_day.profit {
            worst_day = DayResult {
                day: entry.day,
                profit: entry.profit_amount,
            };
        }
    }

    let total_operations = operated.len();

    MonthlySummary {
        total_operations: total_operations as u32,
        profit_days: profit_days as u32,
        loss_days: loss_days as u32,
        total_profit,
        profit_percent: percent_of(total_profit, capital),
        average_daily_profit: ratio(total_profit, Decimal::from(total_operations)),
        best_day,
        worst_day,
    }
}

/// `amount / base * 100`, or zero when `base` is zero.
pub(crate) fn percent_of(amount: Decimal, base: Decimal) -> Decimal {
    ratio(amount, base)
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}
