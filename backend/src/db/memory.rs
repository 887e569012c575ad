use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::store::MatchStore;
use crate::error::{MatchError, MatchResult};
use crate::models::{Connection, ConnectionStatus, Profile, ProfileDraft};

#[derive(Debug, Default)]
struct Tables {
    profiles: Vec<Profile>,
    connections: Vec<Connection>,
}

/// In-process store with the same uniqueness and conditional-write rules as
/// the Postgres schema. Rows keep insertion order, which stands in for
/// `created_at` ordering.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_admin(&self, user_id: Uuid, is_admin: bool) -> bool {
        let mut tables = self.tables.lock().await;
        match tables.profiles.iter_mut().find(|p| p.user_id == user_id) {
            Some(profile) => {
                profile.is_admin = is_admin;
                true
            }
            None => false,
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.tables.lock().await.connections.len()
    }
}

fn profile_from_draft(user_id: Uuid, draft: &ProfileDraft) -> Profile {
    let now = Utc::now();
    Profile {
        id: Uuid::new_v4(),
        user_id,
        name: draft.name.clone(),
        age: draft.age,
        gender: Some(draft.gender),
        preferred_genders: Some(draft.preferred_genders),
        bio: draft.bio.clone(),
        profile_pic_url: draft.profile_pic_url.clone(),
        phone: None,
        is_admin: false,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn profile_by_user(&self, user_id: Uuid) -> MatchResult<Option<Profile>> {
        let tables = self.tables.lock().await;
        Ok(tables.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn profiles_by_users(&self, user_ids: &[Uuid]) -> MatchResult<Vec<Profile>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn other_profiles(&self, user_id: Uuid) -> MatchResult<Vec<Profile>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| p.user_id != user_id)
            .cloned()
            .collect())
    }

    async fn upsert_profile(&self, user_id: Uuid, draft: &ProfileDraft) -> MatchResult<Profile> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.profiles.iter_mut().find(|p| p.user_id == user_id) {
            existing.name = draft.name.clone();
            existing.age = draft.age;
            existing.gender = Some(draft.gender);
            existing.preferred_genders = Some(draft.preferred_genders);
            existing.bio = draft.bio.clone();
            if draft.profile_pic_url.is_some() {
                existing.profile_pic_url = draft.profile_pic_url.clone();
            }
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }

        let profile = profile_from_draft(user_id, draft);
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn create_profile(&self, user_id: Uuid, draft: &ProfileDraft) -> MatchResult<Profile> {
        let mut tables = self.tables.lock().await;
        if tables.profiles.iter().any(|p| p.user_id == user_id) {
            return Err(MatchError::Conflict("Profile already exists"));
        }
        let profile = profile_from_draft(user_id, draft);
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_phone(&self, user_id: Uuid, phone: Option<&str>) -> MatchResult<Option<Profile>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.profiles.iter_mut().find(|p| p.user_id == user_id).map(|profile| {
            profile.phone = phone.map(str::to_string);
            profile.updated_at = Utc::now();
            profile.clone()
        }))
    }

    async fn update_picture(&self, user_id: Uuid, url: &str) -> MatchResult<Option<Profile>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.profiles.iter_mut().find(|p| p.user_id == user_id).map(|profile| {
            profile.profile_pic_url = Some(url.to_string());
            profile.updated_at = Utc::now();
            profile.clone()
        }))
    }

    async fn connections_for(&self, user_id: Uuid) -> MatchResult<Vec<Connection>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .connections
            .iter()
            .filter(|c| c.requester_id == user_id || c.target_id == user_id)
            .cloned()
            .collect())
    }

    async fn latest_connection(&self, requester_id: Uuid, target_id: Uuid) -> MatchResult<Option<Connection>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .connections
            .iter()
            .rev()
            .find(|c| c.is_between(requester_id, target_id))
            .cloned())
    }

    async fn create_connection(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        status: ConnectionStatus,
    ) -> MatchResult<Connection> {
        let mut tables = self.tables.lock().await;
        let duplicate_pending = status == ConnectionStatus::Pending
            && tables
                .connections
                .iter()
                .any(|c| {
                    (c.is_between(requester_id, target_id) || c.is_between(target_id, requester_id))
                        && c.status == ConnectionStatus::Pending
                });
        if duplicate_pending {
            return Err(MatchError::Conflict("Connection already requested"));
        }

        let now = Utc::now();
        let connection = Connection {
            id: Uuid::new_v4(),
            requester_id,
            target_id,
            status,
            created_at: now,
            updated_at: now,
        };
        tables.connections.push(connection.clone());
        Ok(connection)
    }

    async fn transition_connection(
        &self,
        connection_id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
    ) -> MatchResult<Option<Connection>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .connections
            .iter_mut()
            .find(|c| c.id == connection_id && c.status == from)
            .map(|connection| {
                connection.status = to;
                connection.updated_at = Utc::now();
                connection.clone()
            }))
    }
}
