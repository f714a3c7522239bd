use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::tracker::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {message}")]
    Conflict { code: &'static str, message: String },

    #[error("Backend write failed: {0}")]
    BadGateway(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Conflict { code, message } => (StatusCode::CONFLICT, message.clone(), Some(*code)),
            AppError::BadGateway(msg) => {
                tracing::warn!("Backend write failed: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into(), None)
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InvalidDay { .. }
            | LedgerError::InvalidCapital
            | LedgerError::ValueOutOfRange { .. } => {
                AppError::BadRequest(e.to_string())
            }
            LedgerError::Persistence { .. } => AppError::BadGateway(e.to_string()),
            LedgerError::Store(e) => e.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::UserAlreadyExists => AppError::Conflict {
                code: "email_exists",
                message: e.to_string(),
            },
            AuthError::UserNotFound => AppError::NotFound(e.to_string()),
            AuthError::Rejected { status, ref message } if status < 500 => {
                AppError::BadRequest(message.clone())
            }
            AuthError::Rejected { .. } | AuthError::Http(_) => AppError::Internal(e.into()),
        }
    }
}
