pub mod auth;
pub mod connections;
pub mod profiles;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, rejection::JsonRejection},
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::constants::MAX_PICTURE_BYTES;
use crate::error::{MatchError, MatchResult};
use crate::state::AppState;

pub use auth::Viewer;

/// Malformed or mistyped JSON (unknown gender, missing field) is a
/// validation failure, not an extractor error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> MatchResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| MatchError::validation(rejection.body_text()))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Session endpoints
        .route("/api/auth/signup", post(auth::sign_up))
        .route("/api/auth/login", post(auth::sign_in))
        .route("/api/auth/logout", post(auth::sign_out))
        .route("/auth/callback", get(auth::auth_callback))
        // Profile endpoints
        .route("/api/profile", get(profiles::get_profile).put(profiles::save_profile))
        .route("/api/profile/phone", put(profiles::update_phone))
        .route(
            "/api/profile/picture",
            post(profiles::upload_picture).layer(DefaultBodyLimit::max(MAX_PICTURE_BYTES)),
        )
        .route("/api/profiles", post(profiles::admin_create_profile))
        // Matching endpoints
        .route("/api/candidates", get(connections::list_candidates))
        .route("/api/candidates/{member_id}/pass", post(connections::pass))
        .route("/api/connections", get(connections::inbox).post(connections::propose))
        .route("/api/connections/{member_id}/respond", post(connections::respond))
        .route("/api/connections/{member_id}", delete(connections::cancel))
        .route("/api/matches", get(connections::matches))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
