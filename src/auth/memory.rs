use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AdminAuth, AuthError, AuthProvider, AuthUser, Session, UserMetadata, UserUpdate};

/// In-process identity provider for preview mode and tests.
/// Serves both the end-user and the admin side.
#[derive(Default)]
pub struct MemoryAuth {
    inner: Mutex<MemoryAuthInner>,
}

#[derive(Default)]
struct MemoryAuthInner {
    users: HashMap<Uuid, StoredUser>,
    tokens: HashMap<String, Uuid>,
}

struct StoredUser {
    user: AuthUser,
    password: String,
    confirmed: bool,
}

impl MemoryAuthInner {
    fn find_by_email(&self, email: &str) -> Option<&StoredUser> {
        self.users.values().find(|u| {
            u.user
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
    }

    fn insert_user(
        &mut self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        confirmed: bool,
    ) -> Result<AuthUser, AuthError> {
        if self.find_by_email(email).is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: metadata.clone(),
        };
        self.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password: password.to_string(),
                confirmed,
            },
        );
        Ok(user)
    }

    fn user_for_token(&self, access_token: &str) -> Result<Uuid, AuthError> {
        self.tokens
            .get(access_token)
            .copied()
            .ok_or(AuthError::InvalidToken)
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_confirmed(&self, id: Uuid) -> bool {
        let inner = self.inner.lock().await;
        inner.users.get(&id).is_some_and(|u| u.confirmed)
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut inner = self.inner.lock().await;
        let user = match inner.find_by_email(email) {
            Some(stored) if stored.password == password => stored.user.clone(),
            _ => return Err(AuthError::InvalidCredentials),
        };

        let access_token = Uuid::new_v4().to_string();
        inner.tokens.insert(access_token.clone(), user.id);

        Ok(Session {
            access_token,
            refresh_token: None,
            expires_in: None,
            user,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, AuthError> {
        let mut inner = self.inner.lock().await;
        inner.insert_user(email, password, metadata, false)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut inner = self.inner.lock().await;
        inner
            .tokens
            .remove(access_token)
            .map(|_| ())
            .ok_or(AuthError::InvalidToken)
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let inner = self.inner.lock().await;
        let id = inner.user_for_token(access_token)?;
        inner
            .users
            .get(&id)
            .map(|u| u.user.clone())
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<AuthUser, AuthError> {
        let mut inner = self.inner.lock().await;
        let id = inner.user_for_token(access_token)?;

        if let Some(email) = &update.email {
            if inner.find_by_email(email).is_some_and(|u| u.user.id != id) {
                return Err(AuthError::UserAlreadyExists);
            }
        }

        let stored = inner.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        if let Some(email) = &update.email {
            stored.user.email = Some(email.clone());
        }
        if let Some(password) = &update.password {
            stored.password = password.clone();
        }
        if let Some(metadata) = &update.metadata {
            stored.user.user_metadata = metadata.clone();
        }
        Ok(stored.user.clone())
    }
}

#[async_trait]
impl AdminAuth for MemoryAuth {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, AuthError> {
        let mut inner = self.inner.lock().await;
        inner.insert_user(email, password, metadata, true)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let inner = self.inner.lock().await;
        Ok(inner.find_by_email(email).map(|u| u.user.clone()))
    }

    async fn update_user_by_id(
        &self,
        id: Uuid,
        metadata: &UserMetadata,
        confirm_email: bool,
    ) -> Result<AuthUser, AuthError> {
        let mut inner = self.inner.lock().await;
        let stored = inner.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        stored.user.user_metadata = metadata.clone();
        stored.confirmed |= confirm_email;
        Ok(stored.user.clone())
    }
}
