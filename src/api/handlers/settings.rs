use axum::extract::State;
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::UserSettings;
use crate::tracker::SettingsChange;
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub capital: Decimal,
    #[serde(default)]
    pub entry: Option<Decimal>,
    #[serde(default)]
    pub target: Option<Decimal>,
}

/// GET /api/settings: the caller's settings, bootstrapped with defaults
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Json<ApiResponse<UserSettings>> {
    ApiResponse::ok(state.ledger.load_settings(current.user.id).await)
}

/// PUT /api/settings: change baseline capital and risk parameters
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<UserSettings>>, AppError> {
    let change = SettingsChange {
        capital: body.capital,
        entry: body.entry,
        target: body.target,
    };
    let settings = state.ledger.update_settings(current.user.id, change).await?;

    Ok(ApiResponse::ok(settings))
}
