use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::constants::{LOGIN_PATH, PROFILE_COMPLETION_PATH};

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Admin access required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

pub type MatchResult<T> = Result<T, MatchError>;

impl MatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        MatchError::Validation(message.into())
    }

    pub fn upstream(err: impl std::fmt::Display) -> Self {
        MatchError::UpstreamUnavailable(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MatchError::Unauthenticated => StatusCode::UNAUTHORIZED,
            MatchError::Forbidden => StatusCode::FORBIDDEN,
            MatchError::NotFound(_) => StatusCode::NOT_FOUND,
            MatchError::Validation(_) => StatusCode::BAD_REQUEST,
            MatchError::Conflict(_) => StatusCode::CONFLICT,
            MatchError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Page the client should navigate to, when the error calls for one.
    fn redirect(&self) -> Option<&'static str> {
        match self {
            MatchError::Unauthenticated => Some(LOGIN_PATH),
            MatchError::NotFound("Profile") => Some(PROFILE_COMPLETION_PATH),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for MatchError {
    fn from(err: sqlx::Error) -> Self {
        let unique_violation = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);

        if unique_violation {
            MatchError::Conflict("Record already exists")
        } else {
            MatchError::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<reqwest::Error> for MatchError {
    fn from(err: reqwest::Error) -> Self {
        MatchError::UpstreamUnavailable(err.to_string())
    }
}

impl IntoResponse for MatchError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let MatchError::UpstreamUnavailable(detail) = &self {
            tracing::error!("Upstream failure: {}", detail);
        }

        let body = match self.redirect() {
            Some(redirect) => json!({ "error": self.to_string(), "redirect": redirect }),
            None => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(MatchError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(MatchError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(MatchError::NotFound("Profile").status(), StatusCode::NOT_FOUND);
        assert_eq!(MatchError::validation("bad age").status(), StatusCode::BAD_REQUEST);
        assert_eq!(MatchError::Conflict("Connection already requested").status(), StatusCode::CONFLICT);
        assert_eq!(MatchError::upstream("timeout").status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_redirects() {
        assert_eq!(MatchError::Unauthenticated.redirect(), Some("/login"));
        assert_eq!(MatchError::NotFound("Profile").redirect(), Some("/profile"));
        assert_eq!(MatchError::NotFound("Connection").redirect(), None);
        assert_eq!(MatchError::Conflict("Already connected").redirect(), None);
    }

    #[test]
    fn test_non_database_sqlx_error_is_upstream() {
        let err: MatchError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, MatchError::UpstreamUnavailable(_)));
    }
}
