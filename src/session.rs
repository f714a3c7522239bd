use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::{AuthError, AuthProvider, AuthUser, Session, UserMetadata};

/// The signed-in state of one client, passed explicitly to whatever needs
/// the current identity. Changes are observable through [`subscribe`].
///
/// [`subscribe`]: SessionManager::subscribe
pub struct SessionManager {
    auth: Arc<dyn AuthProvider>,
    state: watch::Sender<Option<Session>>,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(None);
        Self { auth, state }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Receiver notified on every sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.auth.sign_in(email, password).await?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.state.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Register a new identity. Does not sign in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, AuthError> {
        self.auth.sign_up(email, password, metadata).await
    }

    /// Revoke the session with the backend and clear the local state. The
    /// local state is cleared even when the backend call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.state.send_replace(None) else {
            return Ok(());
        };

        let result = self.auth.sign_out(&session.access_token).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, user_id = %session.user.id, "Sign-out failed at the auth backend");
        }
        result
    }

    /// Adopt an access token obtained elsewhere, validating it first.
    pub async fn restore(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let user = self.auth.get_user(access_token).await?;
        self.state.send_replace(Some(Session {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_in: None,
            user: user.clone(),
        }));
        Ok(user)
    }
}
