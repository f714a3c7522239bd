use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AdminAuth, AuthError, AuthProvider, AuthUser, Session, UserMetadata, UserUpdate};

const ADMIN_PAGE_SIZE: u32 = 1000;

/// End-user client for the hosted GoTrue auth API, authenticated with the
/// public (anon) key.
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GoTrueClient {
    pub fn new(http: Client, project_url: &str, anon_key: String) -> Self {
        Self {
            http,
            base_url: auth_base(project_url),
            api_key: anon_key,
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.api_key)
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = format!("{}/token?grant_type=password", self.base_url);
        let resp = self
            .request(self.http.post(&url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let resp = check(resp).await?;
        Ok(resp.json::<Session>().await?)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, AuthError> {
        let url = format!("{}/signup", self.base_url);
        let resp = self
            .request(self.http.post(&url))
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;

        let body: Value = check(resp).await?.json().await?;
        // Auto-confirmed projects answer with a session, others with the bare user.
        let user = body.get("user").cloned().unwrap_or(body);
        serde_json::from_value(user).map_err(|e| AuthError::Rejected {
            status: 200,
            message: format!("unexpected signup response: {e}"),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = format!("{}/logout", self.base_url);
        let resp = self
            .request(self.http.post(&url))
            .bearer_auth(access_token)
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let url = format!("{}/user", self.base_url);
        let resp = self
            .request(self.http.get(&url))
            .bearer_auth(access_token)
            .send()
            .await?;

        let resp = check(resp).await?;
        Ok(resp.json::<AuthUser>().await?)
    }

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<AuthUser, AuthError> {
        let url = format!("{}/user", self.base_url);
        let resp = self
            .request(self.http.put(&url))
            .bearer_auth(access_token)
            .json(update)
            .send()
            .await?;

        let resp = check(resp).await?;
        Ok(resp.json::<AuthUser>().await?)
    }
}

/// Admin client for the GoTrue API, authenticated with the service-role key.
/// Bypasses row-level security; never expose it to end users.
#[derive(Debug, Clone)]
pub struct GoTrueAdmin {
    http: Client,
    base_url: String,
    service_key: String,
}

#[derive(Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<AuthUser>,
}

impl GoTrueAdmin {
    pub fn new(http: Client, project_url: &str, service_key: String) -> Self {
        Self {
            http,
            base_url: auth_base(project_url),
            service_key,
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[async_trait]
impl AdminAuth for GoTrueAdmin {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<AuthUser, AuthError> {
        let url = format!("{}/admin/users", self.base_url);
        let resp = self
            .request(self.http.post(&url))
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
                "user_metadata": metadata,
            }))
            .send()
            .await?;

        let resp = check(resp).await?;
        Ok(resp.json::<AuthUser>().await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let url = format!(
            "{}/admin/users?page=1&per_page={}",
            self.base_url, ADMIN_PAGE_SIZE
        );
        let resp = self.request(self.http.get(&url)).send().await?;

        let page: UserPage = check(resp).await?.json().await?;
        Ok(page
            .users
            .into_iter()
            .find(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email))))
    }

    async fn update_user_by_id(
        &self,
        id: Uuid,
        metadata: &UserMetadata,
        confirm_email: bool,
    ) -> Result<AuthUser, AuthError> {
        let url = format!("{}/admin/users/{}", self.base_url, id);
        let resp = self
            .request(self.http.put(&url))
            .json(&json!({
                "email_confirm": confirm_email,
                "user_metadata": metadata,
            }))
            .send()
            .await?;

        let resp = check(resp).await?;
        Ok(resp.json::<AuthUser>().await?)
    }
}

fn auth_base(project_url: &str) -> String {
    format!("{}/auth/v1", project_url.trim_end_matches('/'))
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

async fn check(resp: Response) -> Result<Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body: ErrorBody = resp.json().await.unwrap_or_default();
    let message = body
        .msg
        .or(body.message)
        .or(body.error_description)
        .or(body.error)
        .unwrap_or_else(|| status.to_string());

    tracing::debug!(status = %status, message = %message, "Auth backend returned an error");
    Err(classify(status.as_u16(), body.error_code.as_deref(), &message))
}

/// Map a GoTrue error response onto [`AuthError`].
fn classify(status: u16, error_code: Option<&str>, message: &str) -> AuthError {
    let lower = message.to_lowercase();

    match error_code {
        Some("email_exists" | "user_already_exists") => return AuthError::UserAlreadyExists,
        Some("invalid_credentials") => return AuthError::InvalidCredentials,
        Some("user_not_found") => return AuthError::UserNotFound,
        Some("bad_jwt" | "session_not_found" | "no_authorization") => return AuthError::InvalidToken,
        _ => {}
    }

    if lower.contains("already been registered")
        || lower.contains("already registered")
        || lower.contains("already exists")
    {
        AuthError::UserAlreadyExists
    } else if lower.contains("invalid login credentials") {
        AuthError::InvalidCredentials
    } else if status == 401 || status == 403 {
        AuthError::InvalidToken
    } else if status == 404 {
        AuthError::UserNotFound
    } else {
        AuthError::Rejected {
            status,
            message: message.to_string(),
        }
    }
}
