use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Day number and profit of the best or worst day of a month.
/// `{ day: 0, profit: 0 }` means no day was operated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayResult {
    pub day: u32,
    pub profit: Decimal,
}

/// Statistics for one month, derived from its operated days and the
/// baseline capital.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub total_operations: u32,
    pub profit_days: u32,
    pub loss_days: u32,
    pub total_profit: Decimal,
    pub profit_percent: Decimal,
    pub average_daily_profit: Decimal,
    pub best_day: DayResult,
    pub worst_day: DayResult,
}

impl MonthlySummary {
    pub fn has_operations(&self) -> bool {
        self.total_operations > 0
    }

    pub fn from_row(row: &MonthlySummaryRow) -> Self {
        let count = |v: i32| u32::try_from(v).unwrap_or(0);
        Self {
            total_operations: count(row.total_operations),
            profit_days: count(row.profit_days),
            loss_days: count(row.loss_days),
            total_profit: row.total_profit,
            profit_percent: row.profit_percent,
            average_daily_profit: row.average_daily_profit,
            best_day: DayResult {
                day: row.best_day_number.map(count).unwrap_or(0),
                profit: row.best_day_profit.unwrap_or(Decimal::ZERO),
            },
            worst_day: DayResult {
                day: row.worst_day_number.map(count).unwrap_or(0),
                profit: row.worst_day_profit.unwrap_or(Decimal::ZERO),
            },
        }
    }
}

/// Database row for the monthly_summaries table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlySummaryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub total_operations: i32,
    pub profit_days: i32,
    pub loss_days: i32,
    pub total_profit: Decimal,
    pub profit_percent: Decimal,
    pub average_daily_profit: Decimal,
    pub best_day_number: Option<i32>,
    pub best_day_profit: Option<Decimal>,
    pub worst_day_number: Option<i32>,
    pub worst_day_profit: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
