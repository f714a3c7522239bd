use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::auth::CurrentUser;
use crate::auth::{AuthError, AuthUser, UserMetadata, UserUpdate};
use crate::errors::AppError;
use crate::models::{format_phone, UserSettings};
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct ProfileRequest {
    pub name: String,
    pub phone: String,
}

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// PUT /api/profile: name and phone, kept on both the identity and the
/// settings row.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<UserSettings>>, AppError> {
    let update = UserUpdate {
        metadata: Some(UserMetadata {
            name: Some(req.name.trim().to_string()),
            phone: Some(format_phone(&req.phone)),
        }),
        ..Default::default()
    };
    state.auth.update_user(&current.access_token, &update).await?;

    let settings = state
        .ledger
        .update_profile(current.user.id, &req.name, &req.phone)
        .await?;
    tracing::info!(user_id = %current.user.id, "Profile updated");

    Ok(ApiResponse::ok(settings))
}

/// PUT /api/profile/email
pub async fn update_email(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<ApiResponse<AuthUser>>, AppError> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("email is required".into()));
    }

    let update = UserUpdate {
        email: Some(email.to_string()),
        ..Default::default()
    };
    let user = state.auth.update_user(&current.access_token, &update).await?;

    Ok(ApiResponse::ok(user))
}

/// PUT /api/profile/password: the current password is checked by signing
/// in with it before the change is applied.
pub async fn update_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<ApiResponse<AuthUser>>, AppError> {
    if req.new_password.is_empty() {
        return Err(AppError::BadRequest("new password is required".into()));
    }
    if req.new_password != req.confirm_password {
        return Err(AppError::BadRequest("passwords do not match".into()));
    }

    let email = current
        .user
        .email
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("account has no email address".into()))?;

    match state.auth.sign_in(email, &req.current_password).await {
        Ok(_) => {}
        Err(AuthError::InvalidCredentials) => {
            return Err(AppError::BadRequest("current password is incorrect".into()));
        }
        Err(e) => return Err(e.into()),
    }

    let update = UserUpdate {
        password: Some(req.new_password),
        ..Default::default()
    };
    let user = state.auth.update_user(&current.access_token, &update).await?;
    tracing::info!(user_id = %current.user.id, "Password changed");

    Ok(ApiResponse::ok(user))
}
