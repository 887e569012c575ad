use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::PROFILE_COMPLETION_PATH;
use crate::error::MatchResult;
use crate::models::{Connection, ContactCard, Decision, Inbox, PublicProfile, TransitionOutcome};
use crate::state::AppState;

use super::{auth::Viewer, json_body};

#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<PublicProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

pub async fn list_candidates(viewer: Viewer, State(state): State<AppState>) -> MatchResult<Json<CandidatesResponse>> {
    let feed = state.engine.list_candidates(viewer.id).await?;
    Ok(Json(CandidatesResponse {
        candidates: feed.candidates,
        redirect: feed.needs_profile.then_some(PROFILE_COMPLETION_PATH),
    }))
}

pub async fn pass(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
) -> MatchResult<(StatusCode, Json<Connection>)> {
    let connection = state.engine.pass(viewer.id, target_id).await?;
    Ok((StatusCode::CREATED, Json(connection)))
}

#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    pub target_id: Uuid,
}

pub async fn propose(
    viewer: Viewer,
    State(state): State<AppState>,
    payload: Result<Json<ProposeRequest>, JsonRejection>,
) -> MatchResult<(StatusCode, Json<TransitionOutcome>)> {
    let request = json_body(payload)?;
    let outcome = state.engine.propose(viewer.id, request.target_id).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub decision: Decision,
}

pub async fn respond(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(requester_id): Path<Uuid>,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> MatchResult<Json<TransitionOutcome>> {
    let request = json_body(payload)?;
    let outcome = state.engine.respond(viewer.id, requester_id, request.decision).await?;
    Ok(Json(outcome))
}

pub async fn cancel(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
) -> MatchResult<StatusCode> {
    state.engine.cancel(viewer.id, target_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn inbox(viewer: Viewer, State(state): State<AppState>) -> MatchResult<Json<Inbox>> {
    Ok(Json(state.engine.inbox(viewer.id).await?))
}

pub async fn matches(viewer: Viewer, State(state): State<AppState>) -> MatchResult<Json<Vec<ContactCard>>> {
    Ok(Json(state.engine.matches(viewer.id).await?))
}
