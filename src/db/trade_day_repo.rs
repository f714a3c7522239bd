use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{DayEntry, TradeDayRow, YearMonth};

/// All stored days of a month, ordered by day.
pub async fn get_trade_days(
    pool: &PgPool,
    user_id: Uuid,
    period: YearMonth,
) -> sqlx::Result<Vec<TradeDayRow>> {
    sqlx::query_as::<_, TradeDayRow>(
        r#"
        SELECT * FROM trade_days
        WHERE user_id = $1 AND year = $2 AND month = $3
        ORDER BY day ASC
        "#,
    )
    .bind(user_id)
    .bind(period.year)
    .bind(period.month as i32)
    .fetch_all(pool)
    .await
}

/// Insert or update the row for `(user, year, month, day)`.
/// Profit columns are NULL for an unoperated day.
pub async fn upsert_trade_day(
    pool: &PgPool,
    user_id: Uuid,
    period: YearMonth,
    entry: &DayEntry,
) -> sqlx::Result<TradeDayRow> {
    let (profit_amount, profit_percent) = if entry.is_operated() {
        (Some(entry.profit_amount), Some(entry.profit_percent))
    } else {
        (None, None)
    };

    sqlx::query_as::<_, TradeDayRow>(
        r#"
        INSERT INTO trade_days
            (user_id, year, month, day, date, capital, initial_value, final_value, profit_amount, profit_percent)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id, year, month, day) DO UPDATE
            SET capital = $6,
                initial_value = $7,
                final_value = $8,
                profit_amount = $9,
                profit_percent = $10,
                updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(period.year)
    .bind(period.month as i32)
    .bind(entry.day as i32)
    .bind(&entry.date)
    .bind(entry.capital)
    .bind(entry.opening_value)
    .bind(entry.closing_value)
    .bind(profit_amount)
    .bind(profit_percent)
    .fetch_one(pool)
    .await
}
