use axum::{
    Json,
    extract::{FromRequestParts, Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::constants::{ACCESS_TOKEN_COOKIE, AUTH_CALLBACK_PATH, DEFAULT_CALLBACK_NEXT, LOGIN_PATH};
use crate::error::{MatchError, MatchResult};
use crate::services::Session;
use crate::state::AppState;
use crate::utils::validation::is_valid_email;

use super::json_body;

const MIN_PASSWORD_LENGTH: usize = 6;
const DEFAULT_SESSION_SECS: i64 = 3600;

/// The signed-in member making the request, resolved through the identity
/// provider from a bearer token or the access-token cookie.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: Uuid,
    pub access_token: String,
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = MatchError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let access_token = access_token(&parts.headers).ok_or(MatchError::Unauthenticated)?;
        let identity = state.identity.identify(&access_token).await?;

        Ok(Viewer {
            id: identity.id,
            access_token,
        })
    }
}

fn access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == ACCESS_TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn session_cookie(token: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ACCESS_TOKEN_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn with_session_cookie(mut response: Response, session: &Session, secure: bool) -> Response {
    let cookie = session_cookie(
        &session.access_token,
        session.expires_in.unwrap_or(DEFAULT_SESSION_SECS),
        secure,
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Only same-site absolute paths are honoured as redirect targets.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => DEFAULT_CALLBACK_NEXT,
    }
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    fn checked(self) -> MatchResult<Self> {
        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(MatchError::validation("Email address is not valid"));
        }
        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(MatchError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(Self { email, ..self })
    }
}

pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> MatchResult<Response> {
    let credentials = json_body(payload)?.checked()?;
    let redirect_to = format!("{}{}", state.config.site_url, AUTH_CALLBACK_PATH);

    match state
        .identity
        .sign_up(&credentials.email, &credentials.password, &redirect_to)
        .await?
    {
        Some(session) => {
            let response = (StatusCode::CREATED, Json(&session)).into_response();
            Ok(with_session_cookie(response, &session, state.config.site_url.starts_with("https")))
        }
        None => Ok((StatusCode::ACCEPTED, Json(json!({ "verification_sent": true }))).into_response()),
    }
}

pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> MatchResult<Response> {
    let credentials = json_body(payload)?;
    let session = state
        .identity
        .sign_in(credentials.email.trim(), &credentials.password)
        .await?;
    tracing::info!("Signed in {}", session.user.id);

    let response = Json(&session).into_response();
    Ok(with_session_cookie(response, &session, state.config.site_url.starts_with("https")))
}

pub async fn sign_out(viewer: Viewer, State(state): State<AppState>) -> MatchResult<Response> {
    state.identity.sign_out(&viewer.access_token).await?;
    tracing::info!("Signed out {}", viewer.id);

    let mut response = StatusCode::NO_CONTENT.into_response();
    let expired = session_cookie("", 0, state.config.site_url.starts_with("https"));
    if let Ok(value) = HeaderValue::from_str(&expired) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
    pub code_verifier: Option<String>,
}

/// Landing point for email verification links.
pub async fn auth_callback(State(state): State<AppState>, Query(params): Query<CallbackQuery>) -> Response {
    let next = safe_next(params.next.as_deref()).to_string();

    let Some(code) = params.code.as_deref() else {
        return Redirect::to(&next).into_response();
    };

    match state
        .identity
        .exchange_code(code, params.code_verifier.as_deref())
        .await
    {
        Ok(session) => {
            tracing::info!("Verified {}", session.user.id);
            with_session_cookie(
                Redirect::to(&next).into_response(),
                &session,
                state.config.site_url.starts_with("https"),
            )
        }
        Err(e) => {
            tracing::error!("Auth callback error: {}", e);
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; sb-access-token=cookie-token"));
        assert_eq!(access_token(&headers).as_deref(), Some("cookie-token"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        assert_eq!(access_token(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_access_token_missing() {
        let mut headers = HeaderMap::new();
        assert_eq!(access_token(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("sb-access-token="));
        assert_eq!(access_token(&headers), None);
    }

    #[test]
    fn test_safe_next_blocks_offsite_redirects() {
        assert_eq!(safe_next(Some("/matches")), "/matches");
        assert_eq!(safe_next(Some("//evil.example")), "/profile");
        assert_eq!(safe_next(Some("https://evil.example")), "/profile");
        assert_eq!(safe_next(None), "/profile");
    }

    #[test]
    fn test_credentials_checked() {
        let ok = Credentials {
            email: " Test@Test.com ".to_string(),
            password: "ASdasd123".to_string(),
        }
        .checked()
        .unwrap();
        assert_eq!(ok.email, "test@test.com");

        let short = Credentials {
            email: "test@test.com".to_string(),
            password: "abc".to_string(),
        };
        assert!(matches!(short.checked(), Err(MatchError::Validation(_))));
    }
}
