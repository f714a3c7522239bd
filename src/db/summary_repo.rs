use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{MonthlySummary, MonthlySummaryRow, YearMonth};

pub async fn get_summary(
    pool: &PgPool,
    user_id: Uuid,
    period: YearMonth,
) -> sqlx::Result<Option<MonthlySummaryRow>> {
    sqlx::query_as::<_, MonthlySummaryRow>(
        "SELECT * FROM monthly_summaries WHERE user_id = $1 AND year = $2 AND month = $3",
    )
    .bind(user_id)
    .bind(period.year)
    .bind(period.month as i32)
    .fetch_optional(pool)
    .await
}

pub async fn upsert_summary(
    pool: &PgPool,
    user_id: Uuid,
    period: YearMonth,
    summary: &MonthlySummary,
) -> sqlx::Result<MonthlySummaryRow> {
    sqlx::query_as::<_, MonthlySummaryRow>(
        r#"
        INSERT INTO monthly_summaries
            (user_id, year, month, total_operations, profit_days, loss_days, total_profit,
             profit_percent, average_daily_profit, best_day_number, best_day_profit,
             worst_day_number, worst_day_profit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (user_id, year, month) DO UPDATE
            SET total_operations = $4,
                profit_days = $5,
                loss_days = $6,
                total_profit = $7,
                profit_percent = $8,
                average_daily_profit = $9,
                best_day_number = $10,
                best_day_profit = $11,
                worst_day_number = $12,
                worst_day_profit = $13,
                updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(period.year)
    .bind(period.month as i32)
    .bind(summary.total_operations as i32)
    .bind(summary.profit_days as i32)
    .bind(summary.loss_days as i32)
    .bind(summary.total_profit)
    .bind(summary.profit_percent)
    .bind(summary.average_daily_profit)
    .bind(summary.best_day.day as i32)
    .bind(summary.best_day.profit)
    .bind(summary.worst_day.day as i32)
    .bind(summary.worst_day.profit)
    .fetch_one(pool)
    .await
}

/// Remove the month's summary. Returns true if a row existed.
pub async fn delete_summary(pool: &PgPool, user_id: Uuid, period: YearMonth) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "DELETE FROM monthly_summaries WHERE user_id = $1 AND year = $2 AND month = $3",
    )
    .bind(user_id)
    .bind(period.year)
    .bind(period.month as i32)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
