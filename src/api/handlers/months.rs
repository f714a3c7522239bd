use axum::extract::{Path, State};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{MonthlySummary, YearMonth};
use crate::tracker::{LedgerUpdate, MonthView};
use crate::AppState;

use super::ApiResponse;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Both values of a day. An absent or null value leaves the day unoperated.
#[derive(Deserialize)]
pub struct DayValuesRequest {
    #[serde(default)]
    pub opening_value: Option<Decimal>,
    #[serde(default)]
    pub closing_value: Option<Decimal>,
}

fn period(year: i32, month: u32) -> Result<YearMonth, AppError> {
    YearMonth::new(year, month)
        .ok_or_else(|| AppError::BadRequest(format!("invalid month {year}-{month}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/months/{year}/{month}: all days of the month with statistics
pub async fn get_month(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<ApiResponse<MonthView>>, AppError> {
    let view = state
        .ledger
        .load_month(current.user.id, period(year, month)?)
        .await?;

    Ok(ApiResponse::ok(view))
}

/// GET /api/months/{year}/{month}/summary: the stored summary row
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<ApiResponse<MonthlySummary>>, AppError> {
    let summary = state
        .ledger
        .stored_summary(current.user.id, period(year, month)?)
        .await?
        .ok_or_else(|| AppError::NotFound("no summary stored for this month".into()))?;

    Ok(ApiResponse::ok(summary))
}

/// PUT /api/months/{year}/{month}/days/{day}: set a day's opening and closing values
pub async fn update_day(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
    Json(body): Json<DayValuesRequest>,
) -> Result<Json<ApiResponse<LedgerUpdate>>, AppError> {
    let update = state
        .ledger
        .update_day(
            current.user.id,
            period(year, month)?,
            day,
            body.opening_value,
            body.closing_value,
        )
        .await?;

    Ok(ApiResponse::ok(update))
}

/// POST /api/months/{year}/{month}/reset: clear every day of the month
pub async fn reset_month(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<ApiResponse<LedgerUpdate>>, AppError> {
    let update = state
        .ledger
        .reset_month(current.user.id, period(year, month)?)
        .await?;

    Ok(ApiResponse::ok(update))
}
