use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::tracker::month::format_entry_date;

/// Database row for the trade_days table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeDayRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub date: String,
    pub capital: Decimal,
    pub initial_value: Option<Decimal>,
    pub final_value: Option<Decimal>,
    pub profit_amount: Option<Decimal>,
    pub profit_percent: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One calendar day of trading: the opening and closing value plus the
/// profit derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    pub day: u32,
    pub date: String,
    pub capital: Decimal,
    pub opening_value: Option<Decimal>,
    pub closing_value: Option<Decimal>,
    pub profit_amount: Decimal,
    pub profit_percent: Decimal,
}

impl DayEntry {
    /// An unoperated day: no values, zero profit.
    pub fn placeholder(year: i32, month: u32, day: u32, capital: Decimal) -> Self {
        Self {
            day,
            date: format_entry_date(year, month, day),
            capital,
            opening_value: None,
            closing_value: None,
            profit_amount: Decimal::ZERO,
            profit_percent: Decimal::ZERO,
        }
    }

    /// A day counts as operated only when both values were entered.
    pub fn is_operated(&self) -> bool {
        self.opening_value.is_some() && self.closing_value.is_some()
    }

    /// Replace both values and re-derive the profit fields.
    pub fn set_values(&mut self, opening: Option<Decimal>, closing: Option<Decimal>) {
        self.opening_value = opening;
        self.closing_value = closing;

        let (amount, percent) = match (opening, closing) {
            (Some(open), Some(close)) => derive_profit(open, close),
            _ => (Decimal::ZERO, Decimal::ZERO),
        };
        self.profit_amount = amount;
        self.profit_percent = percent;
    }

    /// Rebuild an entry from its stored row. Profit fields are re-derived
    /// from the stored values rather than trusted.
    pub fn from_row(row: &TradeDayRow) -> Self {
        let mut entry = Self {
            day: u32::try_from(row.day).unwrap_or(0),
            date: row.date.clone(),
            capital: row.capital,
            opening_value: None,
            closing_value: None,
            profit_amount: Decimal::ZERO,
            profit_percent: Decimal::ZERO,
        };
        entry.set_values(row.initial_value, row.final_value);
        entry
    }
}

/// `(closing - opening, profit / opening * 100)`, or `None` when either
/// figure does not fit in a `Decimal`. The percentage is zero when the
/// opening value is zero.
pub fn checked_profit(opening: Decimal, closing: Decimal) -> Option<(Decimal, Decimal)> {
    let amount = closing.checked_sub(opening)?;
    let percent = if opening.is_zero() {
        Decimal::ZERO
    } else {
        amount.checked_div(opening)?.checked_mul(Decimal::ONE_HUNDRED)?
    };
    Some((amount, percent))
}

/// [`checked_profit`], with zero profit for values out of range.
pub fn derive_profit(opening: Decimal, closing: Decimal) -> (Decimal, Decimal) {
    checked_profit(opening, closing).unwrap_or_default()
}
