use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::DayEntry;

use super::aggregator::percent_of;

/// Header figures for a month: profit so far and where the capital stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTotals {
    pub total_profit: Decimal,
    pub profit_percent: Decimal,
    pub accumulated_capital: Decimal,
}

pub fn month_totals(days: &[DayEntry], capital: Decimal) -> MonthTotals {
    let total_profit = days
        .iter()
        .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d.profit_amount));

    MonthTotals {
        total_profit,
        profit_percent: percent_of(total_profit, capital),
        accumulated_capital: capital.saturating_add(total_profit),
    }
}
