use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::auth::CurrentUser;
use crate::auth::{AuthUser, Session, UserMetadata};
use crate::errors::AppError;
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// POST /api/session/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let session = state.auth.sign_in(req.email.trim(), &req.password).await?;
    tracing::info!(user_id = %session.user.id, "Signed in");

    Ok(ApiResponse::ok(session))
}

/// POST /api/session/sign-up: self-service registration; the identity may
/// need email confirmation before it can sign in.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthUser>>), AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".into()));
    }

    let metadata = UserMetadata {
        name: req.name,
        phone: req.phone,
    };
    let user = state
        .auth
        .sign_up(req.email.trim(), &req.password, &metadata)
        .await?;
    tracing::info!(user_id = %user.id, "User signed up");

    Ok((StatusCode::CREATED, ApiResponse::ok(user)))
}

/// GET /api/session
pub async fn current(Extension(current): Extension<CurrentUser>) -> Json<ApiResponse<AuthUser>> {
    ApiResponse::ok(current.user)
}

/// POST /api/session/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    state.auth.sign_out(&current.access_token).await?;
    tracing::info!(user_id = %current.user.id, "Signed out");

    Ok(StatusCode::NO_CONTENT)
}
