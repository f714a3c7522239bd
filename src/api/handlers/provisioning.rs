//! Endpoints that act with the elevated service-role credential: user
//! registration and settings bootstrap. They are public; the caller has no
//! session yet.

use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::State;
use axum::Json;
use metrics::counter;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{AdminAuth, AuthError, AuthUser, UserMetadata};
use crate::errors::AppError;
use crate::models::UserSettings;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthActionRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSettingsRequest {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

fn admin(state: &AppState) -> Result<&Arc<dyn AdminAuth>, AppError> {
    state
        .admin
        .as_ref()
        .ok_or_else(|| AppError::Internal(anyhow!("service-role credential is not configured")))
}

fn credentials(req: &AuthActionRequest) -> Result<(&str, &str), AppError> {
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".into()));
    }
    Ok((email, password))
}

fn metadata(req: &AuthActionRequest) -> UserMetadata {
    UserMetadata {
        name: Some(req.name.clone().unwrap_or_default()),
        phone: Some(req.phone.clone().unwrap_or_default()),
    }
}

fn provisioning_failure(e: AuthError) -> AppError {
    match e {
        AuthError::UserAlreadyExists => e.into(),
        other => {
            tracing::error!(error = %other, "User provisioning failed");
            AppError::Internal(other.into())
        }
    }
}

/// POST /api/auth: `action` is `login` or `register`.
///
/// Login is only acknowledged here; the client signs in with its own
/// credential afterwards. Registration creates a confirmed identity and its
/// default settings. A failure to store the settings does not fail the
/// registration; they are bootstrapped again on first read.
pub async fn auth_action(
    State(state): State<AppState>,
    Json(req): Json<AuthActionRequest>,
) -> Result<Json<Value>, AppError> {
    let (email, password) = credentials(&req)?;

    match req.action.as_deref() {
        Some("login") => Ok(Json(json!({ "success": true, "action": "login" }))),
        Some("register") => {
            let user = admin(&state)?
                .create_user(email, password, &metadata(&req))
                .await
                .map_err(provisioning_failure)?;

            counter!("registrations_total").increment(1);
            tracing::info!(user_id = %user.id, "User registered");

            let settings = UserSettings::for_new_user(
                user.id,
                state.ledger.defaults(),
                req.name.clone(),
                req.phone.clone(),
            );
            if let Err(e) = state.store.insert_settings_if_absent(&settings).await {
                tracing::error!(error = %e, user_id = %user.id, "Failed to create initial settings");
            }

            Ok(Json(json!({
                "success": true,
                "userId": user.id,
                "action": "register_success",
            })))
        }
        _ => Err(AppError::BadRequest("invalid action".into())),
    }
}

/// POST /api/register: registration that also repairs an existing
/// identity: confirms it, refreshes its profile and makes sure it has
/// settings.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<AuthActionRequest>,
) -> Result<Json<Value>, AppError> {
    let (email, password) = credentials(&req)?;
    let admin = admin(&state)?;

    match admin.create_user(email, password, &metadata(&req)).await {
        Ok(user) => {
            counter!("registrations_total").increment(1);
            tracing::info!(user_id = %user.id, "User registered");

            let settings = UserSettings::for_new_user(
                user.id,
                state.ledger.defaults(),
                req.name.clone(),
                req.phone.clone(),
            );
            state.store.insert_settings_if_absent(&settings).await?;

            Ok(Json(json!({ "success": true, "userId": user.id })))
        }
        Err(AuthError::UserAlreadyExists) => {
            let existing = admin
                .find_user_by_email(email)
                .await
                .map_err(provisioning_failure)?
                .ok_or_else(|| AppError::Internal(AuthError::UserAlreadyExists.into()))?;

            refresh_existing(&state, &**admin, &existing, &req).await?;

            Ok(Json(json!({
                "success": true,
                "message": "existing user updated",
                "userId": existing.id,
            })))
        }
        Err(e) => Err(provisioning_failure(e)),
    }
}

async fn refresh_existing(
    state: &AppState,
    admin: &dyn AdminAuth,
    existing: &AuthUser,
    req: &AuthActionRequest,
) -> Result<(), AppError> {
    let name = non_empty(&req.name).or(existing.user_metadata.name.clone());
    let phone = non_empty(&req.phone).or(existing.user_metadata.phone.clone());
    let merged = UserMetadata {
        name: Some(name.unwrap_or_default()),
        phone: Some(phone.unwrap_or_default()),
    };
    admin
        .update_user_by_id(existing.id, &merged, true)
        .await
        .map_err(provisioning_failure)?;

    let settings = match state.store.get_settings(existing.id).await? {
        Some(mut settings) => {
            settings.name = req.name.clone().or(Some(String::new()));
            settings.phone = req.phone.clone().or(Some(String::new()));
            settings
        }
        None => UserSettings::for_new_user(
            existing.id,
            state.ledger.defaults(),
            req.name.clone(),
            req.phone.clone(),
        ),
    };
    state.store.upsert_settings(&settings).await?;

    tracing::info!(user_id = %existing.id, "Existing user confirmed and refreshed");
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

/// POST /api/create-user-settings: idempotent settings bootstrap.
pub async fn create_user_settings(
    State(state): State<AppState>,
    Json(req): Json<CreateSettingsRequest>,
) -> Result<Json<Value>, AppError> {
    let raw = req
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".into()))?;
    let user_id = Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("invalid userId: {raw}")))?;

    let (_, created) = state.ledger.ensure_default_settings(user_id).await?;

    if created {
        Ok(Json(json!({ "success": true })))
    } else {
        Ok(Json(json!({ "success": true, "message": "settings already exist" })))
    }
}
