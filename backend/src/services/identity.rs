use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::time::Duration;
use uuid::Uuid;

use crate::constants::UPSTREAM_TIMEOUT_SECS;
use crate::error::{MatchError, MatchResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: Identity,
}

/// The external identity provider. It owns passwords, email verification and
/// session validity; this service only ever sees opaque access tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns a session when the provider signs the user in immediately, or
    /// None when a verification email was sent instead.
    async fn sign_up(&self, email: &str, password: &str, redirect_to: &str) -> MatchResult<Option<Session>>;

    async fn sign_in(&self, email: &str, password: &str) -> MatchResult<Session>;

    async fn identify(&self, access_token: &str) -> MatchResult<Identity>;

    async fn sign_out(&self, access_token: &str) -> MatchResult<()>;

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> MatchResult<Session>;
}

/// Client for a Supabase (GoTrue) auth endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(supabase_url: &str, anon_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            anon_key,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
    }

    /// Creates an already-confirmed user with the service role key.
    pub async fn create_confirmed_user(
        &self,
        service_role_key: &str,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> MatchResult<Identity> {
        let response = self
            .client
            .post(format!("{}/admin/users", self.base_url))
            .header("apikey", service_role_key)
            .bearer_auth(service_role_key)
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
                "user_metadata": metadata,
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Identity>().await?);
        }

        let message = provider_message(response).await;
        if message.contains("already") {
            return Err(MatchError::Conflict("User already exists"));
        }
        Err(rejection(status, message, MatchError::Validation))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_up(&self, email: &str, password: &str, redirect_to: &str) -> MatchResult<Option<Session>> {
        let response = self
            .post("/signup")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = provider_message(response).await;
            return Err(rejection(status, message, MatchError::Validation));
        }

        let body: Value = response.json().await?;
        if body.get("access_token").is_some() {
            let session = serde_json::from_value(body).map_err(MatchError::upstream)?;
            Ok(Some(session))
        } else {
            tracing::info!("Verification email sent to {}", email);
            Ok(None)
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> MatchResult<Session> {
        let response = self
            .post("/token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        session_from(response).await
    }

    async fn identify(&self, access_token: &str) -> MatchResult<Identity> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Identity>().await?);
        }
        let message = provider_message(response).await;
        Err(rejection(status, message, |_| MatchError::Unauthenticated))
    }

    async fn sign_out(&self, access_token: &str) -> MatchResult<()> {
        let response = self.post("/logout").bearer_auth(access_token).send().await?;

        let status = response.status();
        // An already-expired token has nothing left to invalidate.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        let message = provider_message(response).await;
        Err(rejection(status, message, |_| MatchError::Unauthenticated))
    }

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> MatchResult<Session> {
        let response = self
            .post("/token")
            .query(&[("grant_type", "pkce")])
            .json(&json!({ "auth_code": code, "code_verifier": code_verifier }))
            .send()
            .await?;

        session_from(response).await
    }
}

async fn session_from(response: reqwest::Response) -> MatchResult<Session> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<Session>().await?);
    }
    let message = provider_message(response).await;
    Err(rejection(status, message, |_| MatchError::Unauthenticated))
}

/// Client errors become `on_client_error(message)`; anything else is an upstream failure.
fn rejection(status: StatusCode, message: String, on_client_error: impl FnOnce(String) -> MatchError) -> MatchError {
    if status.is_client_error() {
        tracing::debug!("Identity provider rejected request ({}): {}", status, message);
        on_client_error(message)
    } else {
        MatchError::UpstreamUnavailable(format!("identity provider returned {}: {}", status, message))
    }
}

async fn provider_message(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap_or(Value::Null);
    extract_message(&body)
}

fn extract_message(body: &Value) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .unwrap_or("request rejected")
        .to_string()
}
