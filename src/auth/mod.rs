pub mod gotrue;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use gotrue::{GoTrueAdmin, GoTrueClient};
pub use memory::MemoryAuth;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("a user with this email address has already been registered")]
    UserAlreadyExists,

    #[error("invalid or expired session")]
    InvalidToken,

    #[error("user not found")]
    UserNotFound,

    #[error("auth backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("auth backend request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Profile data kept on the auth identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

/// Changes a signed-in user may make to their own identity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<UserMetadata>,
}

/// Password authentication on behalf of the end user.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Resolve the user an access token belongs to.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<AuthUser, AuthError>;
}

/// User provisioning with the elevated service-role credential.
#[async_trait]
pub trait AdminAuth: Send + Sync {
    /// Create an already-confirmed user.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, AuthError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;

    async fn update_user_by_id(
        &self,
        id: Uuid,
        metadata: &UserMetadata,
        confirm_email: bool,
    ) -> Result<AuthUser, AuthError>;
}
