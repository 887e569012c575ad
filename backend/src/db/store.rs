use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{connections, profiles};
use crate::error::{MatchError, MatchResult};
use crate::models::{Connection, ConnectionStatus, Profile, ProfileDraft};

/// Persistence used by the match engine. Implementations must provide the
/// two guarantees the engine relies on: `create_connection` rejects a second
/// pending row for the same pair, in either direction, with
/// `MatchError::Conflict`, and
/// `transition_connection` only changes a row still in the `from` status.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn profile_by_user(&self, user_id: Uuid) -> MatchResult<Option<Profile>>;

    async fn profiles_by_users(&self, user_ids: &[Uuid]) -> MatchResult<Vec<Profile>>;

    /// All profiles except `user_id`'s, oldest first.
    async fn other_profiles(&self, user_id: Uuid) -> MatchResult<Vec<Profile>>;

    async fn upsert_profile(&self, user_id: Uuid, draft: &ProfileDraft) -> MatchResult<Profile>;

    async fn create_profile(&self, user_id: Uuid, draft: &ProfileDraft) -> MatchResult<Profile>;

    async fn update_phone(&self, user_id: Uuid, phone: Option<&str>) -> MatchResult<Option<Profile>>;

    async fn update_picture(&self, user_id: Uuid, url: &str) -> MatchResult<Option<Profile>>;

    async fn connections_for(&self, user_id: Uuid) -> MatchResult<Vec<Connection>>;

    async fn latest_connection(&self, requester_id: Uuid, target_id: Uuid) -> MatchResult<Option<Connection>>;

    async fn create_connection(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        status: ConnectionStatus,
    ) -> MatchResult<Connection>;

    async fn transition_connection(
        &self,
        connection_id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
    ) -> MatchResult<Option<Connection>>;
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MatchStore for PgStore {
    async fn profile_by_user(&self, user_id: Uuid) -> MatchResult<Option<Profile>> {
        Ok(profiles::get_profile_by_user_id(&self.pool, user_id).await?)
    }

    async fn profiles_by_users(&self, user_ids: &[Uuid]) -> MatchResult<Vec<Profile>> {
        Ok(profiles::get_profiles_by_user_ids(&self.pool, user_ids).await?)
    }

    async fn other_profiles(&self, user_id: Uuid) -> MatchResult<Vec<Profile>> {
        Ok(profiles::get_other_profiles(&self.pool, user_id).await?)
    }

    async fn upsert_profile(&self, user_id: Uuid, draft: &ProfileDraft) -> MatchResult<Profile> {
        Ok(profiles::upsert_profile(&self.pool, user_id, draft).await?)
    }

    async fn create_profile(&self, user_id: Uuid, draft: &ProfileDraft) -> MatchResult<Profile> {
        profiles::create_profile(&self.pool, user_id, draft)
            .await
            .map_err(|e| match MatchError::from(e) {
                MatchError::Conflict(_) => MatchError::Conflict("Profile already exists"),
                other => other,
            })
    }

    async fn update_phone(&self, user_id: Uuid, phone: Option<&str>) -> MatchResult<Option<Profile>> {
        Ok(profiles::update_phone(&self.pool, user_id, phone).await?)
    }

    async fn update_picture(&self, user_id: Uuid, url: &str) -> MatchResult<Option<Profile>> {
        Ok(profiles::update_picture(&self.pool, user_id, url).await?)
    }

    async fn connections_for(&self, user_id: Uuid) -> MatchResult<Vec<Connection>> {
        Ok(connections::get_connections_for_user(&self.pool, user_id).await?)
    }

    async fn latest_connection(&self, requester_id: Uuid, target_id: Uuid) -> MatchResult<Option<Connection>> {
        Ok(connections::get_latest_connection(&self.pool, requester_id, target_id).await?)
    }

    async fn create_connection(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        status: ConnectionStatus,
    ) -> MatchResult<Connection> {
        connections::create_connection(&self.pool, requester_id, target_id, status)
            .await
            .map_err(|e| match MatchError::from(e) {
                MatchError::Conflict(_) => MatchError::Conflict("Connection already requested"),
                other => other,
            })
    }

    async fn transition_connection(
        &self,
        connection_id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
    ) -> MatchResult<Option<Connection>> {
        Ok(connections::transition_connection(&self.pool, connection_id, from, to).await?)
    }
}
