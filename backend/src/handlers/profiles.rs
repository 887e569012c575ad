use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::MAX_PICTURE_BYTES;
use crate::error::{MatchError, MatchResult};
use crate::models::{Profile, ProfileDraft};
use crate::services::picture_path;
use crate::state::AppState;
use crate::utils::validation::picture_extension;

use super::{auth::Viewer, json_body};

pub async fn get_profile(viewer: Viewer, State(state): State<AppState>) -> MatchResult<Json<Profile>> {
    Ok(Json(state.engine.profile(viewer.id).await?))
}

pub async fn save_profile(
    viewer: Viewer,
    State(state): State<AppState>,
    payload: Result<Json<ProfileDraft>, JsonRejection>,
) -> MatchResult<Json<Profile>> {
    let draft = json_body(payload)?;
    Ok(Json(state.engine.save_profile(viewer.id, draft).await?))
}

#[derive(Debug, Deserialize)]
pub struct PhoneUpdate {
    pub phone: Option<String>,
}

pub async fn update_phone(
    viewer: Viewer,
    State(state): State<AppState>,
    payload: Result<Json<PhoneUpdate>, JsonRejection>,
) -> MatchResult<Json<Profile>> {
    let update = json_body(payload)?;
    Ok(Json(state.engine.update_phone(viewer.id, update.phone.as_deref()).await?))
}

/// Raw image body; the Content-Type header picks the file extension.
pub async fn upload_picture(
    viewer: Viewer,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> MatchResult<Json<Profile>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let extension = picture_extension(&content_type)
        .ok_or_else(|| MatchError::validation("Pictures must be JPEG, PNG, WebP or GIF"))?;
    if body.is_empty() {
        return Err(MatchError::validation("Picture is empty"));
    }
    if body.len() > MAX_PICTURE_BYTES {
        return Err(MatchError::validation("Picture is too large"));
    }

    // No profile, no upload: avoids orphaned objects.
    state.engine.profile(viewer.id).await?;

    let path = picture_path(viewer.id, extension);
    let url = state
        .media
        .store(&path, body.to_vec(), &content_type, &viewer.access_token)
        .await?;

    Ok(Json(state.engine.set_picture(viewer.id, &url).await?))
}

#[derive(Debug, Deserialize)]
pub struct AdminProfileRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub draft: ProfileDraft,
}

pub async fn admin_create_profile(
    viewer: Viewer,
    State(state): State<AppState>,
    payload: Result<Json<AdminProfileRequest>, JsonRejection>,
) -> MatchResult<(StatusCode, Json<Profile>)> {
    let request = json_body(payload)?;
    let profile = state
        .engine
        .admin_create_profile(viewer.id, request.user_id, request.draft)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}
