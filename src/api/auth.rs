use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{AuthError, AuthUser};
use crate::errors::AppError;
use crate::AppState;

/// Identity of the caller, resolved once per request by [`require_session`]
/// and handed to handlers as an extension.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: AuthUser,
    pub access_token: String,
}

/// Bearer-token session middleware.
///
/// Every request must carry `Authorization: Bearer <access token>` issued by
/// the auth backend. The token is resolved to a user through
/// [`AuthProvider::get_user`](crate::auth::AuthProvider::get_user).
pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return AppError::Unauthorized("Missing or invalid Authorization header".into()).into_response();
    };

    match state.auth.get_user(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(CurrentUser {
                user,
                access_token: token,
            });
            next.run(req).await
        }
        Err(AuthError::InvalidToken | AuthError::UserNotFound) => {
            AppError::Unauthorized("Invalid or expired session".into()).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed");
            AppError::from(e).into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
